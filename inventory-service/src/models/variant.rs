use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product variant (e.g. a size/color combination). Each active variant is
/// an independently tracked ledger key under its parent product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    #[serde(rename = "_id")]
    pub id: String,
    pub product_id: String,
    pub label: String,
    pub is_active: bool,
    pub is_deleted: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Variant {
    pub fn new(product_id: String, label: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            product_id,
            label,
            is_active: true,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }
}
