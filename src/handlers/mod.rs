//! HTTP surface: JSON endpoints over the session store and result ledger.

pub mod assessment;
pub mod collections;
pub mod error;
pub mod leaderboard;

use axum::{
  routing::{get, post},
  Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use error::{ApiError, ApiResult};

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
  Json(serde_json::json!({ "status": "ok" }))
}

/// All routes, with request tracing.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/collections", get(collections::list_collections))
    .route("/assessments", post(assessment::create_assessment))
    .route(
      "/assessments/{id}",
      get(assessment::get_assessment).delete(assessment::delete_assessment),
    )
    .route("/assessments/{id}/start", post(assessment::start_assessment))
    .route("/assessments/{id}/answer", post(assessment::answer))
    .route("/assessments/{id}/goto", post(assessment::go_to))
    .route("/assessments/{id}/next", post(assessment::next_question))
    .route("/assessments/{id}/previous", post(assessment::previous_question))
    .route("/assessments/{id}/submit", post(assessment::submit))
    .route("/assessments/{id}/confirm", post(assessment::confirm_submit))
    .route("/assessments/{id}/cancel", post(assessment::cancel_submit))
    .route("/leaderboard", get(leaderboard::leaderboard))
    .route("/users/{user_id}/learned", get(leaderboard::learned_collections))
    .route("/public-exams/{exam_id}/stats", get(leaderboard::public_exam_stats))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
