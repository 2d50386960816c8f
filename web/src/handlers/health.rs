//! Liveness endpoint.

use axum::Json;
use serde_json::{Value, json};

/// Report process liveness.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "gatehouse",
    }))
}
