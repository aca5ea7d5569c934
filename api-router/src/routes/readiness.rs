use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

/// Readiness probe: 200 once the chunk store answers queries, else 503.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    match state
        .db
        .client
        .query("SELECT count() FROM document_chunk GROUP ALL")
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "checks": { "db": "ok" },
                "embedding_backend": format!("{:?}", state.config.embedding_backend),
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "checks": { "db": "fail" },
                "reason": e.to_string()
            })),
        ),
    }
}
