//! # Gatehouse Web
//!
//! The imperative shell around `gatehouse-core`: an Axum router exposing the
//! storefront, admin and scanner endpoints, plus the payment webhook
//! receiver. Handlers stay thin: they extract a verified caller identity,
//! delegate to a core service, and map the outcome onto HTTP.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use routes::build_router;
pub use state::AppState;
