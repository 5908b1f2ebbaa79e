use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Extension,
    Json,
    Router,
};
use uuid::Uuid;

use wayfare_core::store::HistoryEntry;

use crate::{error::AppError, middleware::auth::Claims, state::AppState};

/// Most entries a single response carries, matching the store-side cap.
const HISTORY_LIMIT: usize = 20;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/history", get(list_history))
        .route("/v1/history/{id}", delete(delete_history))
}

/// GET /v1/history
/// Recent searches for the authenticated user, newest first
async fn list_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let entries = state.store.get_history(&claims.sub, HISTORY_LIMIT).await?;
    Ok(Json(entries))
}

/// DELETE /v1/history/{id}
/// Remove one history entry
async fn delete_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.store.delete_history_item(&claims.sub, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFoundError("History entry not found".to_string()))
    }
}
