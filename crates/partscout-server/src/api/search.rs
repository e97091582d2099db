use axum::{extract::rejection::JsonRejection, extract::State, Json};
use partscout_core::{Category, SearchQuery, SearchResult};
use partscout_scraper::SearchError;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};

const QUERY_REQUIRED: &str = "Query is required";

#[derive(Debug, Deserialize)]
pub(super) struct SearchRequest {
    #[serde(default)]
    query: Option<String>,
    /// Categories to run, in order. Omitted means general then specialized.
    #[serde(default)]
    sources: Option<Vec<Category>>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    results: Vec<SearchResult>,
}

pub(super) async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = payload?;

    let query = SearchQuery::new(request.query.unwrap_or_default(), request.sources)
        .map_err(|_| ApiError::bad_request(QUERY_REQUIRED))?;

    tracing::info!(
        query = %query.text(),
        categories = ?query.categories(),
        "search requested"
    );

    match state.orchestrator.search(&query).await {
        Ok(results) => Ok(Json(SearchResponse { results })),
        Err(SearchError::InvalidQuery(_)) => Err(ApiError::bad_request(QUERY_REQUIRED)),
        Err(e @ SearchError::ResourceInit(_)) => {
            tracing::error!(error = %e, "search failed");
            Err(ApiError::internal(e.to_string()))
        }
    }
}
