use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;

use crate::auth::AdminUser;
use crate::errors::ServiceError;
use crate::handlers::common::{no_content_response, success_response};
use crate::AppState;

/// Public CMS fragment by key.
#[utoipa::path(
    get,
    path = "/api/v1/content/{key}",
    params(("key" = String, Path, description = "Content key")),
    responses(
        (status = 200, description = "Content document"),
        (status = 404, description = "Unknown key"),
    ),
    tag = "content"
)]
pub async fn get_content(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ServiceError> {
    let content = state.services.content.get(&key).await?;
    Ok(success_response(content))
}

pub async fn list_content(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let content = state.services.content.list().await?;
    Ok(success_response(content))
}

pub async fn upsert_content(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(value): Json<serde_json::Value>,
) -> Result<Response, ServiceError> {
    let content = state.services.content.upsert(&key, value).await?;
    Ok(success_response(content))
}

pub async fn delete_content(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ServiceError> {
    state.services.content.delete(&key).await?;
    Ok(no_content_response())
}
