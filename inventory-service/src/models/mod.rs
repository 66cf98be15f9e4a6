pub mod movement;
pub mod product;
pub mod variant;

pub use movement::{Direction, NewMovement, ReferenceType, StockMovement};
pub use product::Product;
pub use variant::Variant;
