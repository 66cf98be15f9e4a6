use crate::dtos::{
    MovementListParams, MovementListResponse, MovementResponse, StockMovementRequest,
    StockSummaryResponse, VariantStockResponse,
};
use crate::middleware::UserId;
use crate::models::{Direction, NewMovement, ReferenceType};
use crate::services::ledger::read_i64;
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Bson};
use mongodb::options::FindOptions;
use service_core::error::AppError;
use validator::Validate;

/// `POST /inventory/stock-in` — record an inbound (purchase) movement.
pub async fn stock_in(
    State(state): State<AppState>,
    user_id: Option<UserId>,
    Json(payload): Json<StockMovementRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let movement = state
        .ledger
        .record_movement(NewMovement {
            product_id: payload.product,
            variant_id: payload.variant,
            quantity: payload.quantity,
            direction: Direction::In,
            reference_type: ReferenceType::Purchase,
            reference_id: payload.reference_id,
            remarks: payload.remarks,
            created_by: user_id.map(|u| u.0),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(MovementResponse::from(movement))))
}

/// `POST /inventory/stock-out` — record an outbound (sale) movement.
/// Fails with 400 "Insufficient stock. Available: <n>" on shortfall.
pub async fn stock_out(
    State(state): State<AppState>,
    user_id: Option<UserId>,
    Json(payload): Json<StockMovementRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let movement = state
        .ledger
        .record_movement(NewMovement {
            product_id: payload.product,
            variant_id: payload.variant,
            quantity: payload.quantity,
            direction: Direction::Out,
            reference_type: ReferenceType::Sale,
            reference_id: payload.reference_id,
            remarks: payload.remarks,
            created_by: user_id.map(|u| u.0),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(MovementResponse::from(movement))))
}

/// `GET /inventory/movements` — paginated ledger query, newest first.
/// Passthrough over the movements collection; no business logic.
pub async fn list_movements(
    State(state): State<AppState>,
    Query(params): Query<MovementListParams>,
) -> Result<impl IntoResponse, AppError> {
    let (page, page_size, skip) = params.pagination();

    let mut filter = doc! {};

    if let Some(product) = params.product {
        filter.insert("product_id", product);
    }

    // `variant=none` selects the base ledger key (movements with no variant)
    if let Some(variant) = params.variant {
        if variant == "none" {
            filter.insert("variant_id", Bson::Null);
        } else {
            filter.insert("variant_id", variant);
        }
    }

    if let Some(direction) = params.direction {
        let bson_direction = mongodb::bson::to_bson(&direction).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to serialize direction: {}", e))
        })?;
        filter.insert("direction", bson_direction);
    }

    let total = state
        .db
        .movements()
        .count_documents(filter.clone(), None)
        .await
        .map_err(AppError::from)?;

    let find_options = FindOptions::builder()
        .sort(doc! { "created_at": -1, "_id": -1 })
        .skip(skip)
        .limit(page_size as i64)
        .build();

    let mut cursor = state
        .db
        .movements()
        .find(filter, find_options)
        .await
        .map_err(AppError::from)?;

    let mut movements = Vec::new();
    while let Some(movement) = cursor.try_next().await.map_err(AppError::from)? {
        movements.push(MovementResponse::from(movement));
    }

    let total_pages = (total as f64 / page_size as f64).ceil() as u64;

    Ok(Json(MovementListResponse {
        movements,
        total,
        page,
        page_size,
        total_pages,
    }))
}

/// `GET /inventory/products/:id/summary` — purchase/sale quantity totals plus
/// the cached rollup value.
pub async fn stock_summary(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.ledger.get_product(&product_id).await?;

    let pipeline = vec![
        doc! { "$match": { "product_id": &product_id } },
        doc! { "$group": {
            "_id": "$direction",
            "total_quantity": { "$sum": "$quantity" },
        } },
    ];

    let mut cursor = state
        .db
        .movements()
        .aggregate(pipeline, None)
        .await
        .map_err(AppError::from)?;

    let mut total_purchase = 0;
    let mut total_sale = 0;
    while let Some(group) = cursor.try_next().await.map_err(AppError::from)? {
        match group.get_str("_id") {
            Ok("in") => total_purchase = read_i64(&group, "total_quantity"),
            Ok("out") => total_sale = read_i64(&group, "total_quantity"),
            _ => {}
        }
    }

    Ok(Json(StockSummaryResponse {
        total_purchase,
        total_sale,
        current_stock: product.cached_stock,
    }))
}

/// `GET /inventory/products/:id/variants` — active variants, each with its
/// current ledger balance attached.
pub async fn product_variants(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let variants = state.ledger.variants_with_stock(&product_id).await?;

    let response: Vec<VariantStockResponse> = variants
        .into_iter()
        .map(VariantStockResponse::from)
        .collect();

    Ok(Json(response))
}
