use axum::{
    extract::State,
    routing::post,
    Extension,
    Json,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use wayfare_core::options::SearchResult;
use wayfare_core::search::SearchQuery;
use wayfare_core::CoreError;

use crate::{error::AppError, middleware::auth::Claims, state::AppState};

#[derive(Debug, Deserialize)]
struct SearchRequest {
    origin: String,
    destination: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
    #[serde(default = "default_adults")]
    adults: u32,
}

fn default_adults() -> u32 {
    1
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/search", post(search))
}

/// POST /v1/search
/// Run a package search; the best deal lands in the caller's history
async fn search(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResult>, AppError> {
    let query = SearchQuery {
        origin: req.origin.trim().to_uppercase(),
        destination: req.destination.trim().to_uppercase(),
        check_in: req.check_in,
        check_out: req.check_out,
        adults: req.adults,
    };

    match state.engine.run_search(&query, Some(&claims.sub)).await {
        Ok(result) => Ok(Json(result)),
        Err(CoreError::ValidationError(msg)) => Err(AppError::ValidationError(msg)),
        Err(err) => Err(AppError::InternalServerError(err.to_string())),
    }
}
