use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::entities::order::{self, DeliveryStatus, PaymentStatus};
use crate::errors::ServiceError;
use crate::handlers::common::success_response;
use crate::models::tracking::{delivery_step_index, DELIVERY_STEPS};
use crate::AppState;

/// Order plus the derived progress index the tracking page renders from.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: order::Model,
    pub delivery_step_index: i32,
}

impl OrderDetail {
    fn from(order: order::Model) -> Self {
        let delivery_step_index = delivery_step_index(order.delivery_status);
        Self {
            order,
            delivery_step_index,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryUpdateRequest {
    pub status: DeliveryStatus,
    /// Log entry text; defaults to the standard step description.
    pub message: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfoRequest {
    pub tracking_number: String,
    pub courier_name: String,
    pub estimated_delivery: Option<String>,
}

/// The caller's own orders, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "Orders for the authenticated user"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn list_my_orders(
    user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let orders = state.services.orders.orders_for_user(user.user_id).await?;
    let detailed: Vec<OrderDetail> = orders.into_iter().map(OrderDetail::from).collect();
    Ok(success_response(detailed))
}

/// A single order, visible to its owner or any admin.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order detail with tracking progress"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Unknown order"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn get_order(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let order = state.services.orders.get_order(id).await?;
    if order.user_id != user.user_id && !state.config.is_admin_email(&user.email) {
        return Err(ServiceError::Forbidden(
            "You do not have access to this order".to_string(),
        ));
    }
    Ok(success_response(OrderDetail::from(order)))
}

/// Resends the confirmation emails for a paid order. Owner only.
pub async fn resend_confirmation(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let order = state.services.orders.get_order(id).await?;
    if order.user_id != user.user_id {
        return Err(ServiceError::Forbidden(
            "You do not have access to this order".to_string(),
        ));
    }
    if order.payment_status != PaymentStatus::Paid {
        return Err(ServiceError::InvalidInput(
            "Order is not paid yet".to_string(),
        ));
    }

    let settings = state.services.settings.get().await?;
    state
        .services
        .emails
        .send_order_confirmation(&order, &settings)
        .await;
    Ok(success_response(serde_json::json!({ "sent": true })))
}

pub async fn admin_list_orders(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let orders = state.services.orders.all_orders().await?;
    let detailed: Vec<OrderDetail> = orders.into_iter().map(OrderDetail::from).collect();
    Ok(success_response(detailed))
}

pub async fn update_delivery_status(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<DeliveryUpdateRequest>,
) -> Result<Response, ServiceError> {
    let message = body.message.unwrap_or_else(|| default_message(body.status));
    let order = state
        .services
        .orders
        .update_delivery_status(id, body.status, message, body.location)
        .await?;
    Ok(success_response(OrderDetail::from(order)))
}

pub async fn set_tracking_info(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<TrackingInfoRequest>,
) -> Result<Response, ServiceError> {
    let order = state
        .services
        .orders
        .set_tracking_info(id, body.tracking_number, body.courier_name, body.estimated_delivery)
        .await?;
    Ok(success_response(OrderDetail::from(order)))
}

fn default_message(status: DeliveryStatus) -> String {
    DELIVERY_STEPS
        .iter()
        .find(|step| step.status == status)
        .map(|step| step.description.to_string())
        .unwrap_or_else(|| format!("Status changed to {status}"))
}
