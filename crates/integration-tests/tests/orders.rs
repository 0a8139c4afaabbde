//! Cart and checkout through the client, and order intake on the server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use bosanoga_client::checkout::checkout;
use bosanoga_client::{
    ApiError, CART_STORAGE_KEY, CartSession, CheckoutError, ContactDetails, FileStorage,
    KeyValueStorage, SharedCart,
};
use bosanoga_core::{AddToCart, CartError, Price, ProductId};
use bosanoga_integration_tests::TestServer;
use bosanoga_storefront::config::FaultConfig;
use serde_json::json;

fn contact() -> ContactDetails {
    ContactDetails {
        phone: "8 999 123-45-67".to_string(),
        address: "Санкт-Петербург, Невский пр., д. 28".to_string(),
    }
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_end_to_end() {
    let server = TestServer::start().await;
    let api = server.client();
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::open(dir.path()).unwrap());

    let sandals = api.product(ProductId::new(20)).await.unwrap();
    let clogs = api.product(ProductId::new(73)).await.unwrap();
    {
        let mut session = CartSession::initialize(storage.clone());
        session
            .add(AddToCart::for_product(&sandals, "36", 2).unwrap())
            .unwrap();
        session
            .add(AddToCart::for_product(&clogs, "40", 1).unwrap())
            .unwrap();
    }

    // A fresh session picks up the persisted lines.
    let cart = SharedCart::new(CartSession::initialize(storage.clone()));
    assert_eq!(cart.snapshot().await.line_count(), 2);

    let receipt = checkout(&api, &cart, &contact()).await.unwrap();
    assert_eq!(receipt.items, 3);
    assert_eq!(receipt.total, Price::from_units(2 * 34000 + 3900));

    assert!(cart.snapshot().await.is_empty());
    assert_eq!(storage.get(CART_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_unavailable_size_cannot_be_added() {
    let server = TestServer::start().await;
    let sandals = server.client().product(ProductId::new(20)).await.unwrap();

    let err = AddToCart::for_product(&sandals, "38", 1).unwrap_err();
    assert!(matches!(err, CartError::SizeUnavailable { .. }));
}

#[tokio::test]
async fn test_invalid_contact_blocks_submission() {
    let server = TestServer::start().await;
    let api = server.client();
    let clogs = api.product(ProductId::new(73)).await.unwrap();

    let cart = SharedCart::new(CartSession::in_memory());
    cart.update(|s| s.add(AddToCart::for_product(&clogs, "42", 1).unwrap()).map(|_| ()))
        .await
        .unwrap();

    let err = checkout(
        &api,
        &cart,
        &ContactDetails {
            phone: "+1 555 123 4567".to_string(),
            address: contact().address,
        },
    )
    .await
    .unwrap_err();
    match err {
        CheckoutError::Validation(errors) => assert!(errors.has_field("phone")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(cart.snapshot().await.line_count(), 1);
}

#[tokio::test]
async fn test_failing_server_keeps_cart() {
    let server = TestServer::start_with_faults(FaultConfig {
        error: true,
        error_rate: 1.0,
        delay: None,
    })
    .await;

    let cart = SharedCart::new(CartSession::in_memory());
    cart.update(|s| {
        s.add(AddToCart {
            product_id: ProductId::new(41),
            title: "Слипоны 'Easy'".to_string(),
            size: "40".to_string(),
            price: Price::from_units(4700),
            count: 1,
            image: None,
        })
        .map(|_| ())
    })
    .await
    .unwrap();

    let err = checkout(&server.client(), &cart, &contact()).await.unwrap_err();
    match err {
        CheckoutError::Api(ApiError::Status { status, message }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message, "Internal server error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(cart.snapshot().await.line_count(), 1);
}

// =============================================================================
// Order intake
// =============================================================================

#[tokio::test]
async fn test_server_checks_shape_only() {
    let server = TestServer::start().await;
    let http = reqwest::Client::new();

    let accepted = http
        .post(server.endpoint("/api/order"))
        .json(&json!({"owner": {"phone": "", "address": ""}, "items": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(accepted.status().as_u16(), 204);

    let rejected = http
        .post(server.endpoint("/api/order"))
        .json(&json!({"owner": {"phone": 79991234567_i64, "address": "x"}, "items": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status().as_u16(), 400);
    let body: serde_json::Value = rejected.json().await.unwrap();
    assert_eq!(body, json!({"error": "Invalid owner data"}));

    let rejected = http
        .post(server.endpoint("/api/order"))
        .json(&json!({"owner": {"phone": "1", "address": "x"}, "items": [{"id": 1}]}))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = rejected.json().await.unwrap();
    assert_eq!(body, json!({"error": "Invalid items format"}));
}
