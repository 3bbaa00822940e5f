use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, no_content_response, success_response};
use crate::services::blog::BlogPostInput;
use crate::AppState;

/// Published posts, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/blogs",
    responses((status = 200, description = "Published posts")),
    tag = "blog"
)]
pub async fn list_blogs(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let posts = state.services.blog.list_published().await?;
    Ok(success_response(posts))
}

#[utoipa::path(
    get,
    path = "/api/v1/blogs/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Published post"),
        (status = 404, description = "Unknown or unpublished slug"),
    ),
    tag = "blog"
)]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, ServiceError> {
    let post = state.services.blog.get_published_by_slug(&slug).await?;
    Ok(success_response(post))
}

pub async fn admin_list_blogs(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let posts = state.services.blog.list_all().await?;
    Ok(success_response(posts))
}

pub async fn create_blog(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(input): Json<BlogPostInput>,
) -> Result<Response, ServiceError> {
    let post = state.services.blog.create(input).await?;
    Ok(created_response(post))
}

pub async fn update_blog(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<BlogPostInput>,
) -> Result<Response, ServiceError> {
    let post = state.services.blog.update(id, input).await?;
    Ok(success_response(post))
}

pub async fn delete_blog(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.blog.delete(id).await?;
    Ok(no_content_response())
}
