//! Read-only views over recorded results.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::error::{ApiError, ApiResult};
use crate::scoring::{PublicExamStats, RankedExamTaker};
use crate::services::LearnedCollection;
use crate::state::AppState;

/// GET /leaderboard
pub async fn leaderboard(State(state): State<AppState>) -> Json<Vec<RankedExamTaker>> {
    Json(state.ledger.leaderboard())
}

/// Collections a user has finished with a perfect practice score.
///
/// GET /users/{user_id}/learned
pub async fn learned_collections(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Vec<LearnedCollection>> {
    Json(state.ledger.learned_collections(&user_id))
}

/// GET /public-exams/{exam_id}/stats
pub async fn public_exam_stats(
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
) -> ApiResult<Json<PublicExamStats>> {
    state
        .ledger
        .public_exam_stats(&exam_id)
        .map(Json)
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::NOT_FOUND,
                format!("no attempts recorded for exam {}", exam_id),
            )
        })
}
