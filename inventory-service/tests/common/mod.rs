#![allow(dead_code)]

use inventory_service::config::InventoryConfig;
use inventory_service::services::MongoDb;
use inventory_service::startup::Application;
use mongodb::bson::doc;
use serde_json::{json, Value};
use std::sync::Once;
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,inventory_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: MongoDb,
    pub db_name: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        init_tracing();

        let db_name = format!("inventory_test_{}", Uuid::new_v4());

        let mut config = InventoryConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.mongodb.database = db_name.clone();

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
            client,
        }
    }

    pub async fn create_product(&self, name: &str) -> String {
        let response = self
            .client
            .post(format!("{}/inventory/products", self.address))
            .json(&json!({ "name": name }))
            .send()
            .await
            .expect("Failed to create product");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: Value = response.json().await.expect("Failed to parse product JSON");
        body["id"].as_str().expect("Product id missing").to_string()
    }

    pub async fn create_variant(&self, product_id: &str, label: &str) -> String {
        let response = self
            .client
            .post(format!(
                "{}/inventory/products/{}/variants",
                self.address, product_id
            ))
            .json(&json!({ "label": label }))
            .send()
            .await
            .expect("Failed to create variant");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: Value = response.json().await.expect("Failed to parse variant JSON");
        body["id"].as_str().expect("Variant id missing").to_string()
    }

    pub async fn stock_in(
        &self,
        product: &str,
        variant: Option<&str>,
        quantity: i64,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}/inventory/stock-in", self.address))
            .json(&json!({ "product": product, "variant": variant, "quantity": quantity }))
            .send()
            .await
            .expect("Failed to execute stock-in request")
    }

    pub async fn stock_out(
        &self,
        product: &str,
        variant: Option<&str>,
        quantity: i64,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}/inventory/stock-out", self.address))
            .json(&json!({ "product": product, "variant": variant, "quantity": quantity }))
            .send()
            .await
            .expect("Failed to execute stock-out request")
    }

    /// Read the cached rollup value straight from the products collection.
    pub async fn cached_stock(&self, product_id: &str) -> i64 {
        self.db
            .products()
            .find_one(doc! { "_id": product_id }, None)
            .await
            .expect("Failed to query product")
            .expect("Product not found in DB")
            .cached_stock
    }

    pub async fn movement_count(&self, product_id: &str) -> u64 {
        self.db
            .movements()
            .count_documents(doc! { "product_id": product_id }, None)
            .await
            .expect("Failed to count movements")
    }

    pub async fn cleanup(&self) {
        let _ = self.db.client().database(&self.db_name).drop(None).await;
    }
}
