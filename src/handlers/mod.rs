pub mod blogs;
pub mod checkout;
pub mod common;
pub mod content;
pub mod coupons;
pub mod health;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod settings;
pub mod shop;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::services;
use crate::shop::storage::{FileStore, ShopStore};

pub use crate::AppState;

/// Services container handed to HTTP handlers through [`AppState`].
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<services::CatalogService>,
    pub shop: Arc<services::ShopService>,
    pub orders: Arc<services::OrderService>,
    pub coupons: Arc<services::CouponService>,
    pub checkout: Arc<services::CheckoutService>,
    pub blog: Arc<services::BlogService>,
    pub reviews: Arc<services::ReviewService>,
    pub settings: Arc<services::SettingsService>,
    pub content: Arc<services::ContentService>,
    pub emails: Arc<services::EmailService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, config: &AppConfig) -> Self {
        let store: Arc<dyn ShopStore> = Arc::new(FileStore::new(&config.shop_storage_dir));
        Self::with_store(db, event_sender, config, store)
    }

    /// Like [`AppServices::new`] but with a caller-provided shop store, used
    /// by tests to swap in an in-memory store.
    pub fn with_store(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        config: &AppConfig,
        store: Arc<dyn ShopStore>,
    ) -> Self {
        let catalog = Arc::new(services::CatalogService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let shop = Arc::new(services::ShopService::new(store, catalog.clone()));
        let orders = Arc::new(services::OrderService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let coupons = Arc::new(services::CouponService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let settings = Arc::new(services::SettingsService::new(db.clone()));
        let emails = Arc::new(services::EmailService::new(
            config.resend_api_key.clone(),
            config.email_base_url.clone(),
            config.email_from.clone(),
        ));
        let gateway = Arc::new(services::RazorpayClient::with_base_url(
            config.razorpay_key_id.clone(),
            config.razorpay_key_secret.clone(),
            config.razorpay_base_url.clone(),
        ));
        let checkout = Arc::new(services::CheckoutService::new(
            orders.clone(),
            coupons.clone(),
            settings.clone(),
            emails.clone(),
            gateway,
        ));
        let blog = Arc::new(services::BlogService::new(db.clone(), event_sender.clone()));
        let reviews = Arc::new(services::ReviewService::new(db.clone(), event_sender));
        let content = Arc::new(services::ContentService::new(db));

        Self {
            catalog,
            shop,
            orders,
            coupons,
            checkout,
            blog,
            reviews,
            settings,
            content,
            emails,
        }
    }
}

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        // catalog
        .route("/products", get(products::list_products))
        .route("/products/:handle", get(products::get_product))
        .route("/products/:id/reviews", get(reviews::list_product_reviews))
        .route("/products/:id/reviews", post(reviews::submit_review))
        // shop sessions
        .route("/shop/:scope", get(shop::get_shop))
        .route("/shop/:scope/cart/items", post(shop::add_cart_item))
        .route("/shop/:scope/cart/items", put(shop::update_cart_item))
        .route(
            "/shop/:scope/cart/items/:id/:size",
            delete(shop::remove_cart_item),
        )
        .route("/shop/:scope/cart/clear", post(shop::clear_cart))
        .route("/shop/:scope/wishlist/toggle", post(shop::toggle_wishlist))
        // coupons
        .route("/coupons/validate", post(coupons::validate_coupon))
        // checkout and orders
        .route("/checkout", post(checkout::begin_checkout))
        .route("/checkout/verify", post(checkout::verify_payment))
        .route("/orders", get(orders::list_my_orders))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/confirm", post(orders::resend_confirmation))
        // blog and cms
        .route("/blogs", get(blogs::list_blogs))
        .route("/blogs/:slug", get(blogs::get_blog))
        .route("/content/:key", get(content::get_content))
        // admin
        .nest("/admin", admin_routes())
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::admin_list_products))
        .route("/products", post(products::create_product))
        .route("/products/:id", put(products::update_product))
        .route("/products/:id", delete(products::delete_product))
        .route("/orders", get(orders::admin_list_orders))
        .route("/orders/:id/delivery", put(orders::update_delivery_status))
        .route("/orders/:id/tracking", put(orders::set_tracking_info))
        .route("/coupons", get(coupons::list_coupons))
        .route("/coupons", post(coupons::create_coupon))
        .route("/coupons/:id/active", put(coupons::set_coupon_active))
        .route("/coupons/:id", delete(coupons::delete_coupon))
        .route("/blogs", get(blogs::admin_list_blogs))
        .route("/blogs", post(blogs::create_blog))
        .route("/blogs/:id", put(blogs::update_blog))
        .route("/blogs/:id", delete(blogs::delete_blog))
        .route("/reviews", get(reviews::admin_list_reviews))
        .route("/reviews/:id/status", put(reviews::moderate_review))
        .route("/reviews/:id", delete(reviews::delete_review))
        .route("/settings", get(settings::get_settings))
        .route("/settings", put(settings::update_settings))
        .route("/content", get(content::list_content))
        .route("/content/:key", put(content::upsert_content))
        .route("/content/:key", delete(content::delete_content))
}
