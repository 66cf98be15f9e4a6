use crate::models::{Direction, ReferenceType, StockMovement, Variant};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of a stock-in / stock-out request.
#[derive(Debug, Deserialize, Validate)]
pub struct StockMovementRequest {
    #[validate(length(min = 1, message = "product is required"))]
    pub product: String,
    pub variant: Option<String>,
    #[validate(range(min = 1, message = "quantity must be a positive integer"))]
    pub quantity: i64,
    pub remarks: Option<String>,
    pub reference_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MovementResponse {
    pub id: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub reference_type: ReferenceType,
    pub reference_id: Option<String>,
    pub quantity: i64,
    pub direction: Direction,
    pub balance_after: i64,
    pub remarks: String,
    pub created_by: Option<String>,
    pub created_at: String,
}

impl From<StockMovement> for MovementResponse {
    fn from(m: StockMovement) -> Self {
        Self {
            id: m.id.to_hex(),
            product_id: m.product_id,
            variant_id: m.variant_id,
            reference_type: m.reference_type,
            reference_id: m.reference_id,
            quantity: m.quantity,
            direction: m.direction,
            balance_after: m.balance_after,
            remarks: m.remarks,
            created_by: m.created_by,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MovementListParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub product: Option<String>,
    /// A concrete variant id, or `none` for base-product movements.
    pub variant: Option<String>,
    pub direction: Option<Direction>,
}

impl MovementListParams {
    /// `(page, page_size, skip)` with defaults applied and bounds enforced.
    /// Saturating arithmetic, and skip capped to what BSON can represent:
    /// an absurd `page` yields an empty page, not an overflow.
    pub fn pagination(&self) -> (u64, u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self.page_size.unwrap_or(20).clamp(1, 100);
        let skip = page
            .saturating_sub(1)
            .saturating_mul(page_size)
            .min(i64::MAX as u64);
        (page, page_size, skip)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MovementListResponse {
    pub movements: Vec<MovementResponse>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// Per-product purchase/sale totals plus the cached rollup.
#[derive(Debug, Serialize, Deserialize)]
pub struct StockSummaryResponse {
    pub total_purchase: i64,
    pub total_sale: i64,
    pub current_stock: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VariantStockResponse {
    pub id: String,
    pub product_id: String,
    pub label: String,
    pub current_stock: i64,
}

impl From<(Variant, i64)> for VariantStockResponse {
    fn from((variant, current_stock): (Variant, i64)) -> Self {
        Self {
            id: variant.id,
            product_id: variant.product_id,
            label: variant.label,
            current_stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u64>, page_size: Option<u64>) -> MovementListParams {
        MovementListParams {
            page,
            page_size,
            product: None,
            variant: None,
            direction: None,
        }
    }

    #[test]
    fn pagination_defaults_to_first_page_of_twenty() {
        assert_eq!(params(None, None).pagination(), (1, 20, 0));
    }

    #[test]
    fn pagination_clamps_page_and_page_size() {
        assert_eq!(params(Some(0), Some(0)).pagination(), (1, 1, 0));
        assert_eq!(params(Some(3), Some(500)).pagination(), (3, 100, 200));
    }

    #[test]
    fn pagination_saturates_instead_of_overflowing() {
        let (page, page_size, skip) = params(Some(u64::MAX), Some(100)).pagination();
        assert_eq!(page, u64::MAX);
        assert_eq!(page_size, 100);
        assert_eq!(skip, i64::MAX as u64);
    }
}
