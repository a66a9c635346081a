use axum::Json;
use serde_json::{Value, json};

/// Detailed health check: status plus server time.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
