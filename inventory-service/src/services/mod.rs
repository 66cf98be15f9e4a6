pub mod database;
pub mod ledger;
pub mod metrics;

pub use database::MongoDb;
pub use ledger::{LedgerError, LedgerService};
pub use metrics::{get_metrics, init_metrics};
