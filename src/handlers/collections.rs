use axum::{extract::State, Json};

use crate::services::CollectionSummary;
use crate::state::AppState;

/// GET /collections
pub async fn list_collections(State(state): State<AppState>) -> Json<Vec<CollectionSummary>> {
    Json(state.words.summaries())
}
