use axum::extract::{Path, Query, State};
use axum::response::Response;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, no_content_response, success_response};
use crate::services::catalog::{ProductFilter, ProductInput};
use crate::AppState;

/// Storefront product listing, filterable by category and title search.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(
        ("category" = Option<String>, Query, description = "Exact category filter"),
        ("search" = Option<String>, Query, description = "Title substring filter"),
    ),
    responses((status = 200, description = "Products in merchandising order")),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Response, ServiceError> {
    let products = state.services.catalog.list_products(filter).await?;
    Ok(success_response(products))
}

/// Product detail by URL handle.
#[utoipa::path(
    get,
    path = "/api/v1/products/{handle}",
    params(("handle" = String, Path, description = "Product handle")),
    responses(
        (status = 200, description = "Product detail"),
        (status = 404, description = "Unknown handle"),
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Response, ServiceError> {
    let product = state.services.catalog.get_by_handle(&handle).await?;
    Ok(success_response(product))
}

pub async fn admin_list_products(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Response, ServiceError> {
    let products = state.services.catalog.list_products(filter).await?;
    Ok(success_response(products))
}

pub async fn create_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    axum::Json(input): axum::Json<ProductInput>,
) -> Result<Response, ServiceError> {
    let product = state.services.catalog.create_product(input).await?;
    Ok(created_response(product))
}

pub async fn update_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(input): axum::Json<ProductInput>,
) -> Result<Response, ServiceError> {
    let product = state.services.catalog.update_product(id, input).await?;
    Ok(success_response(product))
}

pub async fn delete_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.catalog.delete_product(id).await?;
    Ok(no_content_response())
}
