pub mod catalog;
pub mod health;
pub mod stock;

pub use catalog::{create_product, create_variant};
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use stock::{list_movements, product_variants, stock_in, stock_out, stock_summary};
