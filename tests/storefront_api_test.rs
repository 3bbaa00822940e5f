mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

/// Decimal fields serialize as JSON strings, possibly carrying scale
/// ("6400.0000"); compare values, not text.
fn as_decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal serialized as string")
        .parse()
        .expect("parseable decimal")
}

#[tokio::test]
async fn products_list_and_detail_round_trip() {
    let app = TestApp::new().await;
    app.seed_product("oxford-heritage-knit", dec!(3499)).await;
    app.seed_product("cambridge-cable-knit", dec!(2999)).await;

    let response = app.request(Method::GET, "/api/v1/products", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let products = response_json(response).await;
    assert_eq!(products.as_array().unwrap().len(), 2);

    let response = app
        .request(Method::GET, "/api/v1/products/oxford-heritage-knit", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let product = response_json(response).await;
    assert_eq!(product["handle"], "oxford-heritage-knit");

    let response = app
        .request(Method::GET, "/api/v1/products/no-such-handle", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cart_flow_over_http() {
    let app = TestApp::new().await;
    let product = app.seed_product("lucas-cotton-sweater", dec!(3200)).await;

    // Add twice with the same size: one merged line.
    for _ in 0..2 {
        let response = app
            .request(
                Method::POST,
                "/api/v1/shop/shopper-1/cart/items",
                Some(json!({ "productId": product.id, "quantity": 1, "size": "M" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.request(Method::GET, "/api/v1/shop/shopper-1", None).await;
    let view = response_json(response).await;
    assert_eq!(view["cart"].as_array().unwrap().len(), 1);
    assert_eq!(view["cartCount"], 2);
    assert_eq!(as_decimal(&view["cartTotal"]), dec!(6400));

    // Another scope sees nothing.
    let response = app.request(Method::GET, "/api/v1/shop/shopper-2", None).await;
    let view = response_json(response).await;
    assert!(view["cart"].as_array().unwrap().is_empty());

    // Quantity update, then removal.
    let response = app
        .request(
            Method::PUT,
            "/api/v1/shop/shopper-1/cart/items",
            Some(json!({ "productId": product.id, "size": "M", "quantity": 5 })),
        )
        .await;
    let view = response_json(response).await;
    assert_eq!(view["cartCount"], 5);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/shop/shopper-1/cart/items/{}/M", product.id),
            None,
        )
        .await;
    let view = response_json(response).await;
    assert!(view["cart"].as_array().unwrap().is_empty());
    assert_eq!(as_decimal(&view["cartTotal"]), dec!(0));
}

#[tokio::test]
async fn adding_an_unknown_product_is_a_404() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/shop/shopper-1/cart/items",
            Some(json!({ "productId": Uuid::new_v4(), "quantity": 1, "size": "M" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wishlist_toggle_over_http() {
    let app = TestApp::new().await;
    let product = app.seed_product("merino-turtle-neck", dec!(4200)).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/shop/shopper-1/wishlist/toggle",
            Some(json!({ "productId": product.id })),
        )
        .await;
    let view = response_json(response).await;
    assert_eq!(view["wishlist"].as_array().unwrap().len(), 1);

    let response = app
        .request(
            Method::POST,
            "/api/v1/shop/shopper-1/wishlist/toggle",
            Some(json!({ "productId": product.id })),
        )
        .await;
    let view = response_json(response).await;
    assert!(view["wishlist"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn coupon_validation_messages() {
    let app = TestApp::new().await;
    app.request_admin(
        Method::POST,
        "/api/v1/admin/coupons",
        Some(json!({
            "code": "WINTER10",
            "discount_percent": 10,
            "min_order_value": "1000"
        })),
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/coupons/validate",
            Some(json!({ "code": "winter10", "cartTotal": "2000" })),
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["message"], "10% discount applied!");
    assert_eq!(as_decimal(&body["discount_amount"]), dec!(200));

    let response = app
        .request(
            Method::POST,
            "/api/v1/coupons/validate",
            Some(json!({ "code": "WINTER10", "cartTotal": "500" })),
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["message"], "Minimum order value of ₹1000 required");

    let response = app
        .request(
            Method::POST,
            "/api/v1/coupons/validate",
            Some(json!({ "code": "NOPE", "cartTotal": "2000" })),
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["message"], "Invalid coupon code");
}

#[tokio::test]
async fn drafts_stay_off_the_public_blog() {
    let app = TestApp::new().await;
    app.request_admin(
        Method::POST,
        "/api/v1/admin/blogs",
        Some(json!({
            "title": "Care guide",
            "slug": "care-guide",
            "is_published": true
        })),
    )
    .await;
    app.request_admin(
        Method::POST,
        "/api/v1/admin/blogs",
        Some(json!({
            "title": "Draft post",
            "slug": "draft-post"
        })),
    )
    .await;

    let response = app.request(Method::GET, "/api/v1/blogs", None).await;
    let posts = response_json(response).await;
    assert_eq!(posts.as_array().unwrap().len(), 1);
    assert_eq!(posts[0]["slug"], "care-guide");

    let response = app.request(Method::GET, "/api/v1/blogs/draft-post", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reviews_require_approval_before_showing() {
    let app = TestApp::new().await;
    let product = app.seed_product("textured-knit-polo", dec!(3100)).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/reviews", product.id),
            Some(json!({
                "name": "Arjun",
                "rating": 5,
                "comment": "Lovely weave."
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let review = response_json(response).await;
    let review_id = review["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/products/{}/reviews", product.id),
            None,
        )
        .await;
    assert!(response_json(response).await.as_array().unwrap().is_empty());

    app.request_admin(
        Method::PUT,
        &format!("/api/v1/admin/reviews/{review_id}/status"),
        Some(json!({ "status": "approved" })),
    )
    .await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/products/{}/reviews", product.id),
            None,
        )
        .await;
    let reviews = response_json(response).await;
    assert_eq!(reviews.as_array().unwrap().len(), 1);
    assert_eq!(reviews[0]["comment"], "Lovely weave.");

    // Approval refreshed the product aggregates.
    let response = app
        .request(Method::GET, "/api/v1/products/textured-knit-polo", None)
        .await;
    let refreshed = response_json(response).await;
    assert_eq!(refreshed["rating"], 5.0);
    assert_eq!(refreshed["review_count"], 1);
}

#[tokio::test]
async fn cms_content_upsert_and_fetch() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/content/hero", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.request_admin(
        Method::PUT,
        "/api/v1/admin/content/hero",
        Some(json!({ "headline": "Winter knits are here" })),
    )
    .await;

    let response = app.request(Method::GET, "/api/v1/content/hero", None).await;
    let content = response_json(response).await;
    assert_eq!(content["value"]["headline"], "Winter knits are here");

    // Second write replaces the first.
    app.request_admin(
        Method::PUT,
        "/api/v1/admin/content/hero",
        Some(json!({ "headline": "The spring edit" })),
    )
    .await;
    let response = app.request(Method::GET, "/api/v1/content/hero", None).await;
    let content = response_json(response).await;
    assert_eq!(content["value"]["headline"], "The spring edit");
}

#[tokio::test]
async fn admin_surface_rejects_ordinary_users() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/admin/orders", None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request_as(
            Method::GET,
            "/api/v1/admin/orders",
            None,
            Uuid::new_v4(),
            "shopper@example.com",
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_reports_up() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/api/v1/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "up");
}
