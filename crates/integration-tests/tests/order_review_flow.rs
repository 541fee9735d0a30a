//! Checkout through review, end to end.
//!
//! Requires a migrated database and a running API server; see the crate docs.
//!
//! Run with: cargo test -p bazaar-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::{Method, StatusCode};
use serde_json::json;

use bazaar_integration_tests::{TestContext, expect_status, id_of, shipping_info};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_order_then_review_after_delivery() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_token().await;
    let shopper = ctx.customer().await;

    let product = ctx.create_product(&admin, "12.50", 5).await;
    let product_id = id_of(&product);

    // Two lines for the same product are merged into one
    let resp = ctx
        .request(Method::POST, "/api/orders", Some(&shopper.token))
        .json(&json!({
            "items": [
                { "productId": product_id, "quantity": 1 },
                { "productId": product_id, "quantity": 2 },
            ],
            "shippingInfo": shipping_info(),
            "totalAmount": 37.5,
        }))
        .send()
        .await
        .unwrap();
    let order = expect_status(resp, StatusCode::CREATED).await["data"].clone();
    let order_id = id_of(&order);
    assert_eq!(order["status"], "processing");
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(order["items"][0]["quantity"], 3);
    assert_eq!(order["totalAmount"].as_f64().unwrap(), 37.5);

    // Stock was taken
    let resp = ctx
        .request(Method::GET, &format!("/api/products/{product_id}"), None)
        .send()
        .await
        .unwrap();
    let body = expect_status(resp, StatusCode::OK).await;
    assert_eq!(body["data"]["stock"], 2);

    // Not delivered yet
    let resp = ctx
        .request(Method::POST, "/api/reviews", Some(&shopper.token))
        .json(&json!({ "productId": product_id, "orderId": order_id, "rating": 5 }))
        .send()
        .await
        .unwrap();
    let body = expect_status(resp, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"], "Order not found or not delivered yet");

    let resp = ctx
        .request(
            Method::PUT,
            &format!("/api/orders/{order_id}/status"),
            Some(&admin),
        )
        .json(&json!({ "status": "delivered" }))
        .send()
        .await
        .unwrap();
    let body = expect_status(resp, StatusCode::OK).await;
    assert_eq!(body["data"]["status"], "delivered");
    assert!(body["data"]["deliveredAt"].is_string());

    let resp = ctx
        .request(Method::POST, "/api/reviews", Some(&shopper.token))
        .json(&json!({
            "productId": product_id,
            "orderId": order_id,
            "rating": 4,
            "comment": "Solid",
        }))
        .send()
        .await
        .unwrap();
    let body = expect_status(resp, StatusCode::CREATED).await;
    assert_eq!(body["data"]["rating"], 4);

    // Only once per order
    let resp = ctx
        .request(Method::POST, "/api/reviews", Some(&shopper.token))
        .json(&json!({ "productId": product_id, "orderId": order_id, "rating": 2 }))
        .send()
        .await
        .unwrap();
    let body = expect_status(resp, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"], "You have already reviewed this product");

    let resp = ctx
        .request(
            Method::GET,
            &format!("/api/reviews/product/{product_id}/summary"),
            None,
        )
        .send()
        .await
        .unwrap();
    let body = expect_status(resp, StatusCode::OK).await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["average"].as_f64().unwrap(), 4.0);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_insufficient_stock_leaves_stock_untouched() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_token().await;
    let shopper = ctx.customer().await;

    let product = ctx.create_product(&admin, "3.00", 1).await;
    let product_id = id_of(&product);

    let resp = ctx
        .request(Method::POST, "/api/orders", Some(&shopper.token))
        .json(&json!({
            "items": [{ "productId": product_id, "quantity": 2 }],
            "shippingInfo": shipping_info(),
            "totalAmount": 6.0,
        }))
        .send()
        .await
        .unwrap();
    let body = expect_status(resp, StatusCode::BAD_REQUEST).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Insufficient stock")
    );

    let resp = ctx
        .request(Method::GET, &format!("/api/products/{product_id}"), None)
        .send()
        .await
        .unwrap();
    let body = expect_status(resp, StatusCode::OK).await;
    assert_eq!(body["data"]["stock"], 1);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_orders_are_private() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_token().await;
    let owner = ctx.customer().await;
    let stranger = ctx.customer().await;

    let product = ctx.create_product(&admin, "8.00", 3).await;
    let resp = ctx
        .request(Method::POST, "/api/orders", Some(&owner.token))
        .json(&json!({
            "items": [{ "productId": id_of(&product), "quantity": 1 }],
            "shippingInfo": shipping_info(),
            "totalAmount": 8.0,
        }))
        .send()
        .await
        .unwrap();
    let order_id = id_of(&expect_status(resp, StatusCode::CREATED).await["data"]);

    let path = format!("/api/orders/{order_id}");
    let resp = ctx
        .request(Method::GET, &path, Some(&stranger.token))
        .send()
        .await
        .unwrap();
    expect_status(resp, StatusCode::NOT_FOUND).await;

    for token in [&owner.token, &admin] {
        let resp = ctx
            .request(Method::GET, &path, Some(token))
            .send()
            .await
            .unwrap();
        expect_status(resp, StatusCode::OK).await;
    }

    let resp = ctx
        .request(Method::GET, "/api/orders/user", Some(&stranger.token))
        .send()
        .await
        .unwrap();
    let body = expect_status(resp, StatusCode::OK).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}
