use crate::dtos::{CreateProductRequest, CreateVariantRequest, ProductResponse, VariantResponse};
use crate::models::{Product, Variant};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

/// `POST /inventory/products` — seed a product the ledger can track.
/// `cached_stock` starts at 0 and is only ever written by the rollup updater
/// afterwards.
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = Product::new(payload.name);

    state
        .db
        .products()
        .insert_one(&product, None)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert product {}: {}", product.id, e);
            AppError::from(e)
        })?;

    tracing::info!(product_id = %product.id, name = %product.name, "Product created");

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// `POST /inventory/products/:id/variants` — add an active variant to an
/// existing product.
pub async fn create_variant(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(payload): Json<CreateVariantRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // The variant must hang off an existing, non-deleted product
    let product = state.ledger.get_product(&product_id).await?;

    let variant = Variant::new(product.id, payload.label);

    state
        .db
        .variants()
        .insert_one(&variant, None)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert variant {}: {}", variant.id, e);
            AppError::from(e)
        })?;

    tracing::info!(variant_id = %variant.id, product_id = %variant.product_id, "Variant created");

    Ok((StatusCode::CREATED, Json(VariantResponse::from(variant))))
}
