use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::Duration;
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use doree_api::auth::issue_token;
use doree_api::config::AppConfig;
use doree_api::entities::product;
use doree_api::handlers::AppServices;
use doree_api::services::catalog::ProductInput;
use doree_api::shop::{MemoryStore, ShopStore};
use doree_api::{api_v1_routes, db, events, AppState};

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";
pub const ADMIN_EMAIL: &str = "admin@doree.test";

/// Application harness backed by a throwaway SQLite file and an in-memory
/// shop store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
    _tmp: TempDir,
}

pub fn test_config(database_url: String, razorpay_base_url: String) -> AppConfig {
    AppConfig {
        database_url,
        host: "127.0.0.1".to_string(),
        port: 18080,
        environment: "test".to_string(),
        log_level: "warn".to_string(),
        log_json: false,
        auto_migrate: true,
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
        cors_allow_credentials: false,
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 5,
        db_idle_timeout_secs: 60,
        db_acquire_timeout_secs: 5,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        admin_emails: ADMIN_EMAIL.to_string(),
        razorpay_key_id: "rzp_test_key".to_string(),
        razorpay_key_secret: "test_secret".to_string(),
        razorpay_base_url,
        resend_api_key: None,
        email_base_url: "https://api.resend.com".to_string(),
        email_from: "Doree <orders@doree.test>".to_string(),
        shop_storage_dir: "./unused".to_string(),
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_gateway("https://api.razorpay.com".to_string()).await
    }

    /// Points the payment gateway client at the given base URL, usually a
    /// wiremock server.
    pub async fn with_gateway(razorpay_base_url: String) -> Self {
        let tmp = TempDir::new().expect("temp dir");
        let db_path = tmp.path().join("doree_test.db");
        let cfg = test_config(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            razorpay_base_url,
        );

        let pool = db::establish_connection(&cfg)
            .await
            .expect("test database");
        db::run_migrations(&pool).await.expect("migrations");
        let pool = Arc::new(pool);

        let (event_tx, mut event_rx) = mpsc::channel(64);
        let event_task = tokio::spawn(async move { while event_rx.recv().await.is_some() {} });
        let event_sender = events::EventSender::new(event_tx);

        let store: Arc<dyn ShopStore> = Arc::new(MemoryStore::new());
        let services = AppServices::with_store(pool.clone(), event_sender.clone(), &cfg, store);

        let state = AppState {
            db: pool,
            config: Arc::new(cfg),
            event_sender,
            services,
        };

        let router = Router::new()
            .route("/", get(|| async { "doree-api up" }))
            .nest("/api/v1", api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
            _tmp: tmp,
        }
    }

    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Response {
        self.dispatch(method, path, body, None).await
    }

    pub async fn request_as(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        user_id: Uuid,
        email: &str,
    ) -> Response {
        let token = issue_token(user_id, email, TEST_JWT_SECRET, Duration::hours(1))
            .expect("test token");
        self.dispatch(method, path, body, Some(token)).await
    }

    pub async fn request_admin(&self, method: Method, path: &str, body: Option<Value>) -> Response {
        self.request_as(method, path, body, Uuid::new_v4(), ADMIN_EMAIL)
            .await
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<String>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.router.clone().oneshot(request).await.expect("response")
    }

    /// Inserts a product directly through the catalog service.
    pub async fn seed_product(&self, handle: &str, price: Decimal) -> product::Model {
        self.state
            .services
            .catalog
            .create_product(ProductInput {
                title: format!("Test {handle}"),
                handle: handle.to_string(),
                price,
                original_price: None,
                image: "/assets/test.png".to_string(),
                images: vec!["/assets/test.png".to_string()],
                tag: None,
                category: Some("Knitwear".to_string()),
                description: None,
                sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
                colors: vec!["Navy".to_string()],
                details: vec![],
                rating: None,
                review_count: None,
                in_stock: true,
                sort_order: 0,
            })
            .await
            .expect("seed product")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .expect("response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json response")
}

pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
