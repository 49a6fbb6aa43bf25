//! Liveness endpoint.

use axum::Json;
use serde_json::{json, Value};

/// `GET /health` — process liveness. The directory is deliberately not
/// probed here: a slow or unreachable directory should not make the
/// process look dead.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
