//! Stock movement model: one immutable ledger record per inventory transaction.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Movement direction (stock added or removed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Get string representation for database filters and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }

    /// Signed quantity delta this direction applies to a balance.
    pub fn signed(&self, quantity: i64) -> i64 {
        match self {
            Self::In => quantity,
            Self::Out => -quantity,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Business reason for a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    Purchase,
    Sale,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Sale => "sale",
        }
    }
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ledger record. Append-only: the service exposes no update or delete
/// path for this collection, and `balance_after` is the authoritative stock
/// level for the (product, variant) key at the time of the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub reference_type: ReferenceType,
    pub reference_id: Option<String>,
    pub quantity: i64,
    pub direction: Direction,
    pub balance_after: i64,
    pub remarks: String,
    pub created_by: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Input for recording a single movement.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub quantity: i64,
    pub direction: Direction,
    pub reference_type: ReferenceType,
    pub reference_id: Option<String>,
    pub remarks: Option<String>,
    pub created_by: Option<String>,
}

impl StockMovement {
    pub fn new(input: NewMovement, balance_after: i64) -> Self {
        let remarks = input
            .remarks
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| default_remarks(input.direction, input.reference_type));

        Self {
            id: ObjectId::new(),
            product_id: input.product_id,
            variant_id: input.variant_id,
            reference_type: input.reference_type,
            reference_id: input.reference_id,
            quantity: input.quantity,
            direction: input.direction,
            balance_after,
            remarks,
            created_by: input.created_by,
            created_at: Utc::now(),
        }
    }
}

/// System remark used when the caller does not supply one.
pub fn default_remarks(direction: Direction, reference_type: ReferenceType) -> String {
    match direction {
        Direction::In => format!("Stock in ({})", reference_type),
        Direction::Out => format!("Stock out ({})", reference_type),
    }
}
