pub mod catalog;
pub mod stock;

pub use catalog::{CreateProductRequest, CreateVariantRequest, ProductResponse, VariantResponse};
pub use stock::{
    MovementListParams, MovementListResponse, MovementResponse, StockMovementRequest,
    StockSummaryResponse, VariantStockResponse,
};
