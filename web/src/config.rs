//! Configuration management for the Gatehouse server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Loaded once at startup and shared immutably across handlers; nothing here
//! is re-fetched per request.

use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Signing secrets.
    pub secrets: SecretsConfig,
    /// Checkout redirect configuration.
    pub checkout: CheckoutConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

/// Signing secrets, loaded once per process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// HMAC secret for admission tokens.
    pub admission_token_secret: String,
    /// Issuer tag embedded in every admission token.
    pub token_issuer: String,
    /// Shared secret for payment webhook signatures.
    pub webhook_secret: String,
}

/// Checkout redirect configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Storefront origin used for success/cancel redirects when the request
    /// carries no Origin header.
    pub public_origin: String,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
                log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            },
            secrets: SecretsConfig {
                admission_token_secret: env::var("ADMISSION_TOKEN_SECRET")
                    .unwrap_or_else(|_| "dev-secret-change-in-production".to_string()),
                token_issuer: env::var("ADMISSION_TOKEN_ISSUER")
                    .unwrap_or_else(|_| "gatehouse".to_string()),
                webhook_secret: env::var("PAYMENT_WEBHOOK_SECRET")
                    .unwrap_or_else(|_| "whsec-dev-change-in-production".to_string()),
            },
            checkout: CheckoutConfig {
                public_origin: env::var("PUBLIC_ORIGIN")
                    .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            },
        }
    }
}
