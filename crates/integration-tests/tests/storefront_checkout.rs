//! Integration tests for checkout.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use ekocart_integration_tests::TestApp;
use serde_json::{Value, json};

fn valid_form() -> Value {
    json!({
        "firstName": "Asha",
        "lastName": "Rao",
        "email": "asha@example.in",
        "phone": "+91 98765 43210",
        "country": "IND",
        "address": "12 MG Road",
        "city": "Bengaluru",
        "state": "Karnataka",
        "zip": "560001",
        "paymentMethod": "Direct Bank Transfer",
        "acceptTerms": true
    })
}

#[tokio::test]
async fn test_summary_adds_flat_shipping() {
    let app = TestApp::new().await;
    let mut client = app.client();

    client
        .post_json("/cart/add", &json!({ "id": 1, "title": "Fjallraven Backpack", "price": 109.95 }))
        .await;

    let view = client.get("/checkout").await.json();
    assert_eq!(view["summary"]["subtotal_display"], "$109.95");
    assert_eq!(view["summary"]["shipping_display"], "$10.00");
    assert_eq!(view["summary"]["total_display"], "$119.95");
    assert_eq!(view["countries"].as_array().unwrap().len(), 10);
    assert_eq!(view["payment_methods"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_invalid_form_lists_field_errors() {
    let app = TestApp::new().await;
    let mut client = app.client();

    let response = client
        .post_json("/checkout", &json!({ "email": "nope", "acceptTerms": false }))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let body = response.json();
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"firstName"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"acceptTerms"));
}

#[tokio::test]
async fn test_empty_cart_cannot_check_out() {
    let app = TestApp::new().await;
    let mut client = app.client();

    let response = client.post_json("/checkout", &valid_form()).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json()["error"], "Your cart is empty");
}

#[tokio::test]
async fn test_valid_order_is_confirmed() {
    let app = TestApp::new().await;
    let mut client = app.client();

    client
        .post_json("/cart/add", &json!({ "name": "Revolution 6", "price": "$20.50", "website": "A" }))
        .await;
    client
        .post_json("/cart/add", &json!({ "name": "Revolution 6", "price": "$20.50", "website": "A" }))
        .await;

    let response = client.post_json("/checkout", &valid_form()).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let confirmation = response.json();
    assert_eq!(confirmation["item_count"], 2);
    let total: f64 = confirmation["total"]["amount"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((total - 51.0).abs() < f64::EPSILON);
    assert_eq!(confirmation["payment_method"], "Direct Bank Transfer");
    assert!(confirmation["reference"].is_string());

    // The order does not empty the cart
    assert_eq!(client.get("/cart/count").await.json()["count"], 2);
}

#[tokio::test]
async fn test_coupon_is_not_applied() {
    let app = TestApp::new().await;
    let mut client = app.client();

    let outcome = client
        .post_json("/checkout/coupon", &json!({ "code": " SAVE10 " }))
        .await
        .json();
    assert_eq!(outcome["code"], "SAVE10");
    assert_eq!(outcome["applied"], false);
}
