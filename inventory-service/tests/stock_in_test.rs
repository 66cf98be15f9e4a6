//! Stock-in integration tests: movement creation, default remarks, rollup.

mod common;

use common::TestApp;
use mongodb::bson::doc;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn stock_in_records_movement_and_rolls_up() {
    let app = TestApp::spawn().await;
    let product_id = app.create_product("Plain Tee").await;

    let response = app.stock_in(&product_id, None, 50).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["product_id"], product_id.as_str());
    assert_eq!(body["variant_id"], Value::Null);
    assert_eq!(body["direction"], "in");
    assert_eq!(body["reference_type"], "purchase");
    assert_eq!(body["quantity"], 50);
    assert_eq!(body["balance_after"], 50);
    assert_eq!(body["remarks"], "Stock in (purchase)");

    // The ledger record is in the collection and the rollup ran before the
    // response was acknowledged
    assert_eq!(app.movement_count(&product_id).await, 1);
    assert_eq!(app.cached_stock(&product_id).await, 50);

    app.cleanup().await;
}

#[tokio::test]
async fn stock_in_keeps_caller_remarks_and_actor() {
    let app = TestApp::spawn().await;
    let product_id = app.create_product("Mug").await;

    let response = app
        .client
        .post(format!("{}/inventory/stock-in", app.address))
        .header("X-User-ID", "ops_user_7")
        .json(&json!({
            "product": product_id,
            "quantity": 12,
            "remarks": "Initial delivery",
            "reference_id": "po-1001"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["remarks"], "Initial delivery");
    assert_eq!(body["created_by"], "ops_user_7");
    assert_eq!(body["reference_id"], "po-1001");

    app.cleanup().await;
}

#[tokio::test]
async fn stock_in_rejects_non_positive_quantity() {
    let app = TestApp::spawn().await;
    let product_id = app.create_product("Socks").await;

    let response = app.stock_in(&product_id, None, 0).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was written
    assert_eq!(app.movement_count(&product_id).await, 0);
    assert_eq!(app.cached_stock(&product_id).await, 0);

    app.cleanup().await;
}

#[tokio::test]
async fn stock_in_unknown_product_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app.stock_in("no-such-product", None, 5).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.cleanup().await;
}

#[tokio::test]
async fn stock_in_rejects_variant_of_another_product() {
    let app = TestApp::spawn().await;
    let product_a = app.create_product("Jacket").await;
    let product_b = app.create_product("Scarf").await;
    let variant_b = app.create_variant(&product_b, "Red / M").await;

    let response = app.stock_in(&product_a, Some(&variant_b), 5).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Variant does not belong to product");
    assert_eq!(app.movement_count(&product_a).await, 0);

    app.cleanup().await;
}

#[tokio::test]
async fn stock_in_per_variant_keys_are_independent() {
    let app = TestApp::spawn().await;
    let product_id = app.create_product("Hoodie").await;
    let v1 = app.create_variant(&product_id, "Black / S").await;
    let v2 = app.create_variant(&product_id, "Black / L").await;

    let r1 = app.stock_in(&product_id, Some(&v1), 10).await;
    let r2 = app.stock_in(&product_id, Some(&v2), 5).await;
    assert_eq!(r1.status(), StatusCode::CREATED);
    assert_eq!(r2.status(), StatusCode::CREATED);

    let b1: Value = r1.json().await.unwrap();
    let b2: Value = r2.json().await.unwrap();
    assert_eq!(b1["balance_after"], 10);
    assert_eq!(b2["balance_after"], 5);

    // Ledger keys stay separate in the collection
    let stored_v1 = app
        .db
        .movements()
        .find_one(doc! { "product_id": &product_id, "variant_id": &v1 }, None)
        .await
        .unwrap()
        .expect("v1 movement not found");
    assert_eq!(stored_v1.balance_after, 10);

    app.cleanup().await;
}
