//! Stock ledger engine: balance resolution, movement recording, product rollup.
//!
//! Stock is never a freely-mutable counter. Every inventory transaction is an
//! immutable `StockMovement` carrying the running balance for its
//! (product, variant) key, and a product's aggregate stock is re-derived from
//! the latest balances and cached on the product record after every write.

use crate::models::{Direction, NewMovement, Product, StockMovement, Variant};
use crate::services::MongoDb;
use dashmap::DashMap;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::FindOneOptions;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::instrument;

/// Domain failures of the ledger engine. All are detected before the ledger
/// write; no partial record is ever created for a rejected movement.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Quantity must be a positive integer")]
    InvalidQuantity,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Variant not found")]
    VariantNotFound,

    #[error("Variant does not belong to product")]
    VariantMismatch,

    #[error("Insufficient stock. Available: {available}")]
    InsufficientStock { available: i64 },
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            e @ (LedgerError::ProductNotFound | LedgerError::VariantNotFound) => {
                AppError::NotFound(anyhow::Error::new(e))
            }
            e => AppError::BadRequest(anyhow::Error::new(e)),
        }
    }
}

type LedgerKey = (String, Option<String>);

#[derive(Clone)]
pub struct LedgerService {
    db: MongoDb,
    // One mutex per (product, variant) key. resolve-then-append is a
    // read-modify-write; movement creation must be serialized per key so
    // balance_after values form a consistent chain with no lost updates.
    // Entries are never evicted; both maps grow to at most one entry per
    // catalog key ever moved, a few dozen bytes each.
    locks: Arc<DashMap<LedgerKey, Arc<Mutex<()>>>>,
    // One mutex per product for the rollup. Serializing rollups ensures the
    // last one to run aggregates after every earlier insert, so the persisted
    // total never misses a movement on a sibling variant key. Lock order is
    // always key lock first, then rollup lock.
    rollup_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl LedgerService {
    pub fn new(db: MongoDb) -> Self {
        Self {
            db,
            locks: Arc::new(DashMap::new()),
            rollup_locks: Arc::new(DashMap::new()),
        }
    }

    fn key_lock(&self, product_id: &str, variant_id: Option<&str>) -> Arc<Mutex<()>> {
        self.locks
            .entry((product_id.to_string(), variant_id.map(str::to_string)))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn rollup_lock(&self, product_id: &str) -> Arc<Mutex<()>> {
        self.rollup_locks
            .entry(product_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Filter matching one ledger key. The base-product key matches records
    /// with a null/absent variant_id, never a concrete variant.
    fn key_filter(product_id: &str, variant_id: Option<&str>) -> Document {
        let variant = match variant_id {
            Some(v) => Bson::String(v.to_string()),
            None => Bson::Null,
        };
        doc! { "product_id": product_id, "variant_id": variant }
    }

    /// Current stock for a (product, variant) key: `balance_after` of the most
    /// recently created movement, or 0 when no movement exists. Pure read.
    #[instrument(skip(self))]
    pub async fn resolve_balance(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> Result<i64, AppError> {
        // _id tie-breaks movements created within the same millisecond
        let options = FindOneOptions::builder()
            .sort(doc! { "created_at": -1, "_id": -1 })
            .build();

        let latest = self
            .db
            .movements()
            .find_one(Self::key_filter(product_id, variant_id), options)
            .await
            .map_err(AppError::from)?;

        Ok(latest.map(|m| m.balance_after).unwrap_or(0))
    }

    /// Validate and record a single stock movement, then refresh the parent
    /// product's cached rollup. Returns the created record.
    #[instrument(skip(self, input), fields(product_id = %input.product_id, direction = %input.direction))]
    pub async fn record_movement(&self, input: NewMovement) -> Result<StockMovement, AppError> {
        if input.quantity < 1 {
            return Err(LedgerError::InvalidQuantity.into());
        }

        let product = self.get_product(&input.product_id).await?;

        if let Some(variant_id) = input.variant_id.as_deref() {
            let variant = self
                .db
                .variants()
                .find_one(doc! { "_id": variant_id, "is_deleted": false }, None)
                .await
                .map_err(AppError::from)?
                .ok_or(LedgerError::VariantNotFound)?;

            if variant.product_id != product.id {
                return Err(LedgerError::VariantMismatch.into());
            }
        }

        let lock = self.key_lock(&input.product_id, input.variant_id.as_deref());
        let _guard = lock.lock().await;

        let current = self
            .resolve_balance(&input.product_id, input.variant_id.as_deref())
            .await?;

        if input.direction == Direction::Out && input.quantity > current {
            metrics::counter!("stock_out_rejected_total").increment(1);
            return Err(LedgerError::InsufficientStock { available: current }.into());
        }

        let new_balance = current + input.direction.signed(input.quantity);
        let movement = StockMovement::new(input, new_balance);

        self.db
            .movements()
            .insert_one(&movement, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to insert stock movement for product {}: {}",
                    movement.product_id,
                    e
                );
                AppError::from(e)
            })?;

        metrics::counter!("stock_movements_total", "direction" => movement.direction.as_str())
            .increment(1);

        tracing::info!(
            movement_id = %movement.id,
            product_id = %movement.product_id,
            quantity = movement.quantity,
            balance_after = movement.balance_after,
            "Stock movement recorded"
        );

        // The ledger record is durable at this point. A rollup failure leaves
        // an accurate ledger with a stale cache; the next movement on this
        // product repairs it, so we log the divergence instead of failing the
        // acknowledged write.
        if let Err(e) = self.recompute_product_stock(&movement.product_id).await {
            tracing::error!(
                product_id = %movement.product_id,
                movement_id = %movement.id,
                error = %e,
                "Ledger write committed but stock rollup failed; cached stock is stale"
            );
        }

        Ok(movement)
    }

    /// Recompute a product's aggregate stock from the latest per-variant
    /// balances and persist it onto `products.cached_stock`. Idempotent:
    /// the result is a deterministic function of the ledger.
    #[instrument(skip(self))]
    pub async fn recompute_product_stock(&self, product_id: &str) -> Result<i64, AppError> {
        let lock = self.rollup_lock(product_id);
        let _guard = lock.lock().await;

        let variant_ids = self.active_variant_ids(product_id).await?;

        let total = if variant_ids.is_empty() {
            // Product managed without variants; the base-product key is only
            // meaningful in this case.
            self.resolve_balance(product_id, None).await?
        } else {
            self.sum_latest_variant_balances(product_id, &variant_ids)
                .await?
        };

        self.db
            .products()
            .update_one(
                doc! { "_id": product_id },
                doc! { "$set": {
                    "cached_stock": total,
                    "updated_at": mongodb::bson::DateTime::now(),
                } },
                None,
            )
            .await
            .map_err(AppError::from)?;

        tracing::debug!(product_id = %product_id, cached_stock = total, "Product stock rolled up");

        Ok(total)
    }

    /// Active variants of a product, each with its current ledger balance.
    #[instrument(skip(self))]
    pub async fn variants_with_stock(
        &self,
        product_id: &str,
    ) -> Result<Vec<(Variant, i64)>, AppError> {
        // Ensure the product exists before listing
        self.get_product(product_id).await?;

        let mut cursor = self
            .db
            .variants()
            .find(
                doc! { "product_id": product_id, "is_active": true, "is_deleted": false },
                None,
            )
            .await
            .map_err(AppError::from)?;

        let mut result = Vec::new();
        while let Some(variant) = cursor.try_next().await.map_err(AppError::from)? {
            let balance = self.resolve_balance(product_id, Some(&variant.id)).await?;
            result.push((variant, balance));
        }

        Ok(result)
    }

    pub async fn get_product(&self, product_id: &str) -> Result<Product, AppError> {
        self.db
            .products()
            .find_one(doc! { "_id": product_id, "is_deleted": false }, None)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| LedgerError::ProductNotFound.into())
    }

    async fn active_variant_ids(&self, product_id: &str) -> Result<Vec<String>, AppError> {
        let mut cursor = self
            .db
            .variants()
            .find(
                doc! { "product_id": product_id, "is_active": true, "is_deleted": false },
                None,
            )
            .await
            .map_err(AppError::from)?;

        let mut ids = Vec::new();
        while let Some(variant) = cursor.try_next().await.map_err(AppError::from)? {
            ids.push(variant.id);
        }
        Ok(ids)
    }

    /// Single grouped query instead of one latest-record lookup per variant:
    /// take the newest movement per variant key, then sum the balances. The
    /// observable result matches the per-variant resolver calls.
    async fn sum_latest_variant_balances(
        &self,
        product_id: &str,
        variant_ids: &[String],
    ) -> Result<i64, AppError> {
        let pipeline = vec![
            doc! { "$match": {
                "product_id": product_id,
                "variant_id": { "$in": variant_ids.to_vec() },
            } },
            doc! { "$sort": { "created_at": -1, "_id": -1 } },
            doc! { "$group": {
                "_id": "$variant_id",
                "balance": { "$first": "$balance_after" },
            } },
            doc! { "$group": {
                "_id": Bson::Null,
                "total": { "$sum": "$balance" },
            } },
        ];

        let mut cursor = self
            .db
            .movements()
            .aggregate(pipeline, None)
            .await
            .map_err(AppError::from)?;

        match cursor.try_next().await.map_err(AppError::from)? {
            Some(d) => Ok(read_i64(&d, "total")),
            None => Ok(0),
        }
    }
}

/// Read an integer aggregation result regardless of the BSON numeric width.
pub(crate) fn read_i64(doc: &Document, key: &str) -> i64 {
    match doc.get(key) {
        Some(Bson::Int64(v)) => *v,
        Some(Bson::Int32(v)) => i64::from(*v),
        Some(Bson::Double(v)) => *v as i64,
        _ => 0,
    }
}
