use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, success_response, validate_input};
use crate::models::shipping::{OrderItemSnapshot, ShippingAddress};
use crate::services::checkout::{BeginCheckoutInput, CompletePaymentInput};
use crate::AppState;

/// Body of `POST /checkout`. The user id comes from the bearer token, never
/// from the body.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate]
    pub shipping_address: ShippingAddress,
    #[validate(length(min = 1, message = "Cart is empty"))]
    pub items: Vec<OrderItemSnapshot>,
    pub coupon_code: Option<String>,
}

/// Opens a checkout session: prices the cart server-side and creates the
/// gateway order plus a pending local order.
#[utoipa::path(
    post,
    path = "/api/v1/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Checkout session for the payment widget"),
        (status = 400, description = "Empty cart or invalid coupon"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "checkout"
)]
pub async fn begin_checkout(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&body)?;
    let session = state
        .services
        .checkout
        .begin_checkout(BeginCheckoutInput {
            user_id: user.user_id,
            shipping_address: body.shipping_address,
            items: body.items,
            coupon_code: body.coupon_code,
        })
        .await?;
    Ok(created_response(session))
}

/// Settles an order from the signed payment callback. Deliberately
/// unauthenticated: the HMAC signature is the proof, and the widget posts
/// here before any token refresh can happen.
#[utoipa::path(
    post,
    path = "/api/v1/checkout/verify",
    request_body = CompletePaymentInput,
    responses(
        (status = 200, description = "Verification outcome; the order is settled either way"),
        (status = 404, description = "Unknown gateway order id"),
    ),
    tag = "checkout"
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(body): Json<CompletePaymentInput>,
) -> Result<Response, ServiceError> {
    let result = state.services.checkout.complete_payment(body).await?;
    Ok(success_response(result))
}
