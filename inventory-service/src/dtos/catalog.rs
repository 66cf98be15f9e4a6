use crate::models::{Product, Variant};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub cached_stock: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            cached_stock: p.cached_stock,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVariantRequest {
    #[validate(length(min = 1, message = "label is required"))]
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VariantResponse {
    pub id: String,
    pub product_id: String,
    pub label: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<Variant> for VariantResponse {
    fn from(v: Variant) -> Self {
        Self {
            id: v.id,
            product_id: v.product_id,
            label: v.label,
            is_active: v.is_active,
            created_at: v.created_at.to_rfc3339(),
        }
    }
}
