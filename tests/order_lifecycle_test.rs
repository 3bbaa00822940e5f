mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use doree_api::models::shipping::{OrderItemSnapshot, ShippingAddress};
use doree_api::services::orders::CreateOrderInput;

use common::{assert_status, response_json, TestApp};

fn address() -> ShippingAddress {
    ShippingAddress {
        first_name: "Asha".to_string(),
        last_name: "Verma".to_string(),
        email: "asha@example.com".to_string(),
        phone: "9876543210".to_string(),
        address: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        zip: "560001".to_string(),
    }
}

async fn place_order(app: &TestApp, user_id: Uuid) -> Uuid {
    let order = app
        .state
        .services
        .orders
        .create_order(CreateOrderInput {
            user_id,
            razorpay_order_id: format!("order_{}", Uuid::new_v4().simple()),
            amount: dec!(3499),
            discount_amount: dec!(0),
            coupon_code: None,
            shipping_address: address(),
            items: vec![OrderItemSnapshot {
                id: Uuid::new_v4(),
                title: "Oxford Heritage Knit".to_string(),
                price: dec!(3499),
                quantity: 1,
                image: "/products/IMG_2355.jpg".to_string(),
                selected_size: "M".to_string(),
            }],
        })
        .await
        .expect("order created");
    order.id
}

#[tokio::test]
async fn delivery_updates_append_one_tracking_entry_each() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    let order_id = place_order(&app, user_id).await;

    // The seeded log has the single "order placed" entry.
    for (i, (status, step_index, message)) in [
        ("confirmed", 0, "Your order has been placed successfully"),
        ("processing", 1, "We are preparing your order"),
        ("shipped", 2, "Your order is on the way"),
        ("delivered", 5, "Order has been delivered"),
    ]
    .into_iter()
    .enumerate()
    {
        let response = app
            .request_admin(
                Method::PUT,
                &format!("/api/v1/admin/orders/{order_id}/delivery"),
                Some(json!({ "status": status })),
            )
            .await;
        assert_status(&response, StatusCode::OK);
        let body = response_json(response).await;

        assert_eq!(body["delivery_status"], status);
        assert_eq!(body["deliveryStepIndex"], step_index);
        let log = body["tracking_updates"].as_array().expect("tracking log");
        assert_eq!(log.len(), i + 2);
        let latest = &log[log.len() - 1];
        assert_eq!(latest["status"], status);
        assert_eq!(latest["message"], message);
    }
}

#[tokio::test]
async fn custom_message_and_location_land_in_the_log() {
    let app = TestApp::new().await;
    let order_id = place_order(&app, Uuid::new_v4()).await;

    let response = app
        .request_admin(
            Method::PUT,
            &format!("/api/v1/admin/orders/{order_id}/delivery"),
            Some(json!({
                "status": "in_transit",
                "message": "Departed Bengaluru sorting facility",
                "location": "Bengaluru"
            })),
        )
        .await;
    assert_status(&response, StatusCode::OK);
    let body = response_json(response).await;

    let log = body["tracking_updates"].as_array().expect("tracking log");
    let latest = &log[log.len() - 1];
    assert_eq!(latest["message"], "Departed Bengaluru sorting facility");
    assert_eq!(latest["location"], "Bengaluru");
    assert_eq!(body["deliveryStepIndex"], 3);
}

#[tokio::test]
async fn cancelling_puts_the_order_off_the_progress_bar() {
    let app = TestApp::new().await;
    let order_id = place_order(&app, Uuid::new_v4()).await;

    let response = app
        .request_admin(
            Method::PUT,
            &format!("/api/v1/admin/orders/{order_id}/delivery"),
            Some(json!({ "status": "cancelled", "message": "Cancelled on request" })),
        )
        .await;
    assert_status(&response, StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["delivery_status"], "cancelled");
    assert_eq!(body["deliveryStepIndex"], -2);
}

#[tokio::test]
async fn tracking_info_sets_courier_metadata_without_touching_the_log() {
    let app = TestApp::new().await;
    let order_id = place_order(&app, Uuid::new_v4()).await;

    let response = app
        .request_admin(
            Method::PUT,
            &format!("/api/v1/admin/orders/{order_id}/tracking"),
            Some(json!({
                "trackingNumber": "AWB123456789",
                "courierName": "Delhivery",
                "estimatedDelivery": "2026-09-05"
            })),
        )
        .await;
    assert_status(&response, StatusCode::OK);
    let body = response_json(response).await;

    assert_eq!(body["tracking_number"], "AWB123456789");
    assert_eq!(body["courier_name"], "Delhivery");
    assert_eq!(body["estimated_delivery"], "2026-09-05");
    // Status and the log are untouched.
    assert_eq!(body["delivery_status"], "pending");
    let log = body["tracking_updates"].as_array().expect("tracking log");
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn owners_and_admins_can_read_an_order_but_strangers_cannot() {
    let app = TestApp::new().await;
    let owner = Uuid::new_v4();
    let order_id = place_order(&app, owner).await;

    let response = app
        .request_as(
            Method::GET,
            &format!("/api/v1/orders/{order_id}"),
            None,
            owner,
            "asha@example.com",
        )
        .await;
    assert_status(&response, StatusCode::OK);

    let response = app
        .request_admin(Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    assert_status(&response, StatusCode::OK);

    let response = app
        .request_as(
            Method::GET,
            &format!("/api/v1/orders/{order_id}"),
            None,
            Uuid::new_v4(),
            "someone.else@example.com",
        )
        .await;
    assert_status(&response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn order_listing_is_scoped_to_the_caller() {
    let app = TestApp::new().await;
    let asha = Uuid::new_v4();
    let ravi = Uuid::new_v4();
    place_order(&app, asha).await;
    place_order(&app, asha).await;
    let ravi_order = place_order(&app, ravi).await;

    let response = app
        .request_as(Method::GET, "/api/v1/orders", None, asha, "asha@example.com")
        .await;
    assert_status(&response, StatusCode::OK);
    let body = response_json(response).await;
    let orders = body.as_array().expect("order list");
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o["id"] != ravi_order.to_string()));

    let response = app
        .request_as(Method::GET, "/api/v1/orders", None, ravi, "ravi@example.com")
        .await;
    let body = response_json(response).await;
    assert_eq!(body.as_array().expect("order list").len(), 1);

    // The admin listing sees everything.
    let response = app.request_admin(Method::GET, "/api/v1/admin/orders", None).await;
    let body = response_json(response).await;
    assert_eq!(body.as_array().expect("order list").len(), 3);
}

#[tokio::test]
async fn delivery_updates_on_unknown_orders_are_404() {
    let app = TestApp::new().await;
    let response = app
        .request_admin(
            Method::PUT,
            &format!("/api/v1/admin/orders/{}/delivery", Uuid::new_v4()),
            Some(json!({ "status": "shipped" })),
        )
        .await;
    assert_status(&response, StatusCode::NOT_FOUND);
}
