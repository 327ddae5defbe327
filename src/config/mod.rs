use axum::http::HeaderValue;
use std::env;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

// Signing key used outside production when JWT_KEY is not supplied.
const DEV_JWT_KEY: &str = "chitchat-development-key";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// How a multi-tag post filter combines its names: match posts carrying at
/// least one of them, or posts carrying every one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFilterMode {
    Any,
    All,
}

/// Immutable application configuration, built once at process start from the
/// environment and passed into every collaborator through the shared state.
/// Nothing reads ambient globals after construction.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub port: u16,
    pub database_url: String,
    pub jwt_key: String,
    pub stripe_sk: Option<String>,
    pub cors_origins: Vec<String>,
    pub dev_app_name: String,
    pub prod_app_name: String,
    pub tag_filter_mode: TagFilterMode,
    pub token_ttl_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = match get("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        };

        let jwt_key = match get("JWT_KEY").filter(|key| !key.is_empty()) {
            Some(key) => key,
            None if environment == Environment::Production => {
                return Err(ConfigError::Missing("JWT_KEY"))
            }
            None => DEV_JWT_KEY.to_string(),
        };

        let tag_filter_mode = match get("TAG_FILTER_MODE").as_deref() {
            None | Some("any") => TagFilterMode::Any,
            Some("all") => TagFilterMode::All,
            Some(_) => return Err(ConfigError::Invalid("TAG_FILTER_MODE")),
        };

        Ok(Self {
            environment,
            port: get("PORT").and_then(|v| v.parse().ok()).unwrap_or(8080),
            database_url: get("DATABASE_URL").unwrap_or_else(|| "sqlite::memory:".to_string()),
            jwt_key,
            stripe_sk: get("STRIPE_SK").filter(|key| !key.is_empty()),
            cors_origins: get("CORS_ORIGINS")
                .map(|list| {
                    list.split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            dev_app_name: get("DEV_APP_NAME")
                .unwrap_or_else(|| "ChitChatConnect (dev)".to_string()),
            prod_app_name: get("PROD_APP_NAME").unwrap_or_else(|| "ChitChatConnect".to_string()),
            tag_filter_mode,
            token_ttl_hours: get("TOKEN_TTL_HOURS").and_then(|v| v.parse().ok()).unwrap_or(24),
        })
    }

    /// Banner name for the current environment.
    pub fn app_name(&self) -> &str {
        match self.environment {
            Environment::Production => &self.prod_app_name,
            Environment::Development => &self.dev_app_name,
        }
    }

    pub fn environment_name(&self) -> &'static str {
        match self.environment {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    }

    /// CORS policy from the origin whitelist: a `*` entry is permissive,
    /// an empty list allows no cross-origin callers.
    pub fn cors_layer(&self) -> CorsLayer {
        if self.cors_origins.iter().any(|origin| origin == "*") {
            return CorsLayer::permissive();
        }
        if self.cors_origins.is_empty() {
            return CorsLayer::new();
        }

        let origins: Vec<HeaderValue> = self
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring unparseable CORS origin: {}", origin);
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
