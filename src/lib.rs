pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod services;
pub mod shop;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;

pub use handlers::{api_routes, AppServices};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<config::AppConfig>,
    pub event_sender: events::EventSender,
    pub services: AppServices,
}

/// The full `/api/v1` router, ready to be given state.
pub fn api_v1_routes() -> Router<AppState> {
    handlers::api_routes()
}
