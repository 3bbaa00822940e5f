use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::entities::review::ReviewStatus;
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, no_content_response, success_response};
use crate::services::reviews::ReviewInput;
use crate::AppState;

/// Review payload without the product id, which comes from the path.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub name: String,
    pub email: Option<String>,
    pub heading: Option<String>,
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerateReviewRequest {
    pub status: ReviewStatus,
}

/// Approved reviews for a product, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product id")),
    responses((status = 200, description = "Approved reviews")),
    tag = "reviews"
)]
pub async fn list_product_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let reviews = state.services.reviews.approved_for_product(id).await?;
    Ok(success_response(reviews))
}

/// Submits a review; it stays pending until an admin approves it.
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = SubmitReviewRequest,
    responses(
        (status = 201, description = "Pending review"),
        (status = 404, description = "Unknown product"),
    ),
    tag = "reviews"
)]
pub async fn submit_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SubmitReviewRequest>,
) -> Result<Response, ServiceError> {
    let review = state
        .services
        .reviews
        .submit(ReviewInput {
            product_id: id,
            name: body.name,
            email: body.email,
            heading: body.heading,
            rating: body.rating,
            comment: body.comment,
        })
        .await?;
    Ok(created_response(review))
}

pub async fn admin_list_reviews(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let reviews = state.services.reviews.list_all().await?;
    Ok(success_response(reviews))
}

pub async fn moderate_review(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ModerateReviewRequest>,
) -> Result<Response, ServiceError> {
    let review = state.services.reviews.moderate(id, body.status).await?;
    Ok(success_response(review))
}

pub async fn delete_review(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.reviews.delete(id).await?;
    Ok(no_content_response())
}
