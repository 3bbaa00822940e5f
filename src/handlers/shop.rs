use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::handlers::common::success_response;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub size: String,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    pub product_id: Uuid,
    pub size: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleWishlistRequest {
    pub product_id: Uuid,
}

/// Current cart and wishlist for a scope.
#[utoipa::path(
    get,
    path = "/api/v1/shop/{scope}",
    params(("scope" = String, Path, description = "Shopper scope")),
    responses((status = 200, description = "Cart and wishlist snapshot")),
    tag = "shop"
)]
pub async fn get_shop(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> Result<Response, ServiceError> {
    let view = state.services.shop.get(&scope).await?;
    Ok(success_response(view))
}

#[utoipa::path(
    post,
    path = "/api/v1/shop/{scope}/cart/items",
    params(("scope" = String, Path, description = "Shopper scope")),
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Updated snapshot"),
        (status = 404, description = "Unknown product"),
    ),
    tag = "shop"
)]
pub async fn add_cart_item(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Json(body): Json<AddCartItemRequest>,
) -> Result<Response, ServiceError> {
    let view = state
        .services
        .shop
        .add_item(&scope, body.product_id, body.quantity, &body.size)
        .await?;
    Ok(success_response(view))
}

pub async fn update_cart_item(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Json(body): Json<UpdateCartItemRequest>,
) -> Result<Response, ServiceError> {
    let view = state
        .services
        .shop
        .update_quantity(&scope, body.product_id, &body.size, body.quantity)
        .await?;
    Ok(success_response(view))
}

pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path((scope, product_id, size)): Path<(String, Uuid, String)>,
) -> Result<Response, ServiceError> {
    let view = state
        .services
        .shop
        .remove_item(&scope, product_id, &size)
        .await?;
    Ok(success_response(view))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> Result<Response, ServiceError> {
    let view = state.services.shop.clear_cart(&scope).await?;
    Ok(success_response(view))
}

pub async fn toggle_wishlist(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Json(body): Json<ToggleWishlistRequest>,
) -> Result<Response, ServiceError> {
    let view = state
        .services
        .shop
        .toggle_wishlist(&scope, body.product_id)
        .await?;
    Ok(success_response(view))
}
