use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, no_content_response, success_response};
use crate::services::coupons::CouponInput;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    pub code: String,
    pub cart_total: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// Checks a coupon against the current cart total. Always 200; the body says
/// whether the code applies and why not if it does not.
#[utoipa::path(
    post,
    path = "/api/v1/coupons/validate",
    request_body = ValidateCouponRequest,
    responses((status = 200, description = "Validation outcome with discount amount")),
    tag = "coupons"
)]
pub async fn validate_coupon(
    State(state): State<AppState>,
    Json(body): Json<ValidateCouponRequest>,
) -> Result<Response, ServiceError> {
    let validation = state
        .services
        .coupons
        .validate(&body.code, body.cart_total)
        .await?;
    Ok(success_response(validation))
}

pub async fn list_coupons(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let coupons = state.services.coupons.list().await?;
    Ok(success_response(coupons))
}

pub async fn create_coupon(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CouponInput>,
) -> Result<Response, ServiceError> {
    let coupon = state.services.coupons.create(input).await?;
    Ok(created_response(coupon))
}

pub async fn set_coupon_active(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetActiveRequest>,
) -> Result<Response, ServiceError> {
    let coupon = state.services.coupons.set_active(id, body.is_active).await?;
    Ok(success_response(coupon))
}

pub async fn delete_coupon(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.coupons.delete(id).await?;
    Ok(no_content_response())
}
