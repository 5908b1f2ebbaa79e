use axum::{extract::State, routing::get, Json, Router};

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/ping", get(ping))
}

/// GET /v1/ping
/// Verify upstream supplier credentials
async fn ping(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    state
        .engine
        .verify_supplier()
        .await
        .map_err(|e| AppError::UpstreamError(format!("Supplier authentication failed: {}", e)))?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}
