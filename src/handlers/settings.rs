use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::auth::AdminUser;
use crate::errors::ServiceError;
use crate::handlers::common::success_response;
use crate::services::settings::SettingsUpdate;
use crate::AppState;

pub async fn get_settings(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let settings = state.services.settings.get().await?;
    Ok(success_response(settings))
}

/// Partial update; only the sections present in the body change.
pub async fn update_settings(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Response, ServiceError> {
    let settings = state.services.settings.update(update).await?;
    Ok(success_response(settings))
}
