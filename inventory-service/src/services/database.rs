use crate::models::{Product, StockMovement, Variant};
use mongodb::{
    bson::doc, options::IndexOptions, Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for inventory-service");

        // Compound index on (product_id, variant_id, created_at desc): the
        // balance resolver's latest-record lookup per ledger key.
        let ledger_key_index = IndexModel::builder()
            .keys(doc! { "product_id": 1, "variant_id": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("ledger_key_latest".to_string())
                    .build(),
            )
            .build();

        self.movements()
            .create_index(ledger_key_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create ledger_key_latest index on stock_movements: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on stock_movements.(product_id, variant_id, created_at)");

        // (product_id, direction) serves the purchase/sale summary aggregation
        let direction_index = IndexModel::builder()
            .keys(doc! { "product_id": 1, "direction": 1 })
            .options(
                IndexOptions::builder()
                    .name("product_direction".to_string())
                    .build(),
            )
            .build();

        self.movements()
            .create_index(direction_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create product_direction index on stock_movements: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on stock_movements.(product_id, direction)");

        // Variant lookup for the rollup updater
        let variant_index = IndexModel::builder()
            .keys(doc! { "product_id": 1, "is_active": 1, "is_deleted": 1 })
            .options(
                IndexOptions::builder()
                    .name("product_variants".to_string())
                    .build(),
            )
            .build();

        self.variants()
            .create_index(variant_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create product_variants index on variants: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on variants.(product_id, is_active, is_deleted)");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn movements(&self) -> Collection<StockMovement> {
        self.db.collection("stock_movements")
    }

    pub fn products(&self) -> Collection<Product> {
        self.db.collection("products")
    }

    pub fn variants(&self) -> Collection<Variant> {
        self.db.collection("variants")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
