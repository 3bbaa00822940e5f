use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::Validate;

const DEFAULT_ENV: &str = "development";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// CORS: comma-separated list of allowed origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback outside development
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// CORS: allow credentials
    #[serde(default)]
    pub cors_allow_credentials: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Secret used to verify access tokens issued by the hosted auth service
    #[validate(length(min = 32))]
    pub jwt_secret: String,

    /// Comma-separated list of e-mail addresses allowed into the admin surface
    #[serde(default)]
    pub admin_emails: String,

    /// Razorpay key id (public, also handed to the checkout widget)
    pub razorpay_key_id: String,

    /// Razorpay key secret (order creation auth + signature verification)
    pub razorpay_key_secret: String,

    /// Razorpay API base URL (overridable for tests)
    #[serde(default = "default_razorpay_base_url")]
    pub razorpay_base_url: String,

    /// Resend-compatible email API key; e-mail sending is disabled when unset
    #[serde(default)]
    pub resend_api_key: Option<String>,

    /// Email API base URL (overridable for tests)
    #[serde(default = "default_email_base_url")]
    pub email_base_url: String,

    /// From address for outbound transactional mail
    #[serde(default = "default_email_from")]
    pub email_from: String,

    /// Directory backing the durable cart/wishlist store
    #[serde(default = "default_shop_storage_dir")]
    pub shop_storage_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}
fn default_razorpay_base_url() -> String {
    "https://api.razorpay.com".to_string()
}
fn default_email_base_url() -> String {
    "https://api.resend.com".to_string()
}
fn default_email_from() -> String {
    "Doree <orders@doree.in>".to_string()
}
fn default_shop_storage_dir() -> String {
    "./data/shop".to_string()
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        matches!(self.environment.as_str(), "development" | "dev" | "test")
    }

    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Parsed admin allow-list. Comparison is case-insensitive.
    pub fn admin_email_list(&self) -> Vec<String> {
        self.admin_emails
            .split(',')
            .map(|e| e.trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_email_list()
            .iter()
            .any(|allowed| allowed == &email.to_ascii_lowercase())
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("configuration load error: {0}")]
    Load(#[from] ConfigError),
    #[error("configuration validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Loads application configuration.
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://doree.db?mode=rwc")?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    // Required secrets get a pointed message instead of a generic missing-field error.
    for key in ["jwt_secret", "razorpay_key_id", "razorpay_key_secret"] {
        if config.get_string(key).is_err() {
            error!(
                "{} is not configured. Set APP__{} in the environment.",
                key,
                key.to_ascii_uppercase()
            );
            return Err(AppConfigError::Load(ConfigError::NotFound(format!(
                "{key} is required but not configured"
            ))));
        }
    }

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

/// Initialise the global tracing subscriber.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter_directive =
        env::var("RUST_LOG").unwrap_or_else(|_| format!("{},sqlx=warn,sea_orm=warn", level));

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".into(),
            host: default_host(),
            port: default_port(),
            environment: "development".into(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            cors_allow_credentials: false,
            db_max_connections: 1,
            db_min_connections: 1,
            db_connect_timeout_secs: 5,
            db_idle_timeout_secs: 60,
            db_acquire_timeout_secs: 5,
            jwt_secret: "test_secret_key_for_testing_purposes_only_32chars".into(),
            admin_emails: "ops@doree.in, Support@doree.in".into(),
            razorpay_key_id: "rzp_test_key".into(),
            razorpay_key_secret: "rzp_test_secret".into(),
            razorpay_base_url: default_razorpay_base_url(),
            resend_api_key: None,
            email_base_url: default_email_base_url(),
            email_from: default_email_from(),
            shop_storage_dir: default_shop_storage_dir(),
        }
    }

    #[test]
    fn admin_allow_list_is_case_insensitive() {
        let cfg = base_config();
        assert!(cfg.is_admin_email("ops@doree.in"));
        assert!(cfg.is_admin_email("SUPPORT@doree.in"));
        assert!(!cfg.is_admin_email("shopper@example.com"));
    }

    #[test]
    fn empty_allow_list_admits_nobody() {
        let mut cfg = base_config();
        cfg.admin_emails = String::new();
        assert!(cfg.admin_email_list().is_empty());
        assert!(!cfg.is_admin_email(""));
    }
}
