//! Assessment lifecycle endpoints.
//!
//! Every endpoint answers with the same envelope: the session id, its kind
//! and a snapshot of the state machine. The countdown runs server-side, so
//! clients only need to poll `GET /assessments/{id}` to redraw the clock.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use crate::domain::{AssessmentConfig, AssessmentKind, AssessmentResult, PoolPolicy, QuizMode};
use crate::error::SessionError;
use crate::exam::{AnswerOutcome, AssessmentSession, AssessmentStatus, SessionOptions, SessionSnapshot};
use crate::quiz;
use crate::scoring::{self, Grade};
use crate::services::{spawn_countdown, AssessmentContext, FinishedAssessment};
use crate::session::generate_session_id;
use crate::state::AppState;

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateAssessmentRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub collection_ids: Vec<String>,
    #[serde(default)]
    pub kind: AssessmentKind,
    pub word_count: Option<usize>,
    pub variant_count: Option<usize>,
    pub time_limit_minutes: Option<u32>,
    pub mode: Option<QuizMode>,
    pub pool_policy: Option<PoolPolicy>,
    /// Practice only; defaults to true
    pub auto_advance: Option<bool>,
    pub public_exam_id: Option<String>,
}

impl CreateAssessmentRequest {
    /// Fill unset fields from the configured defaults.
    fn config(&self, defaults: &AssessmentConfig) -> AssessmentConfig {
        AssessmentConfig {
            word_count: self.word_count.unwrap_or(defaults.word_count),
            variant_count: self.variant_count.unwrap_or(defaults.variant_count),
            time_limit_minutes: self.time_limit_minutes.unwrap_or(defaults.time_limit_minutes),
            mode: self.mode.unwrap_or(defaults.mode),
            pool_policy: self.pool_policy.unwrap_or(defaults.pool_policy),
        }
    }

    fn session_options(&self, config: &AssessmentConfig) -> SessionOptions {
        match self.kind {
            AssessmentKind::Exam => SessionOptions::exam(config.time_limit_minutes),
            AssessmentKind::Practice => SessionOptions::practice(self.auto_advance.unwrap_or(true)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question: usize,
    pub option: usize,
}

#[derive(Debug, Deserialize)]
pub struct GoToRequest {
    pub index: usize,
}

// ============================================================================
// Responses
// ============================================================================

/// Result figures as the result screen shows them.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSummary {
    pub percentage: u32,
    pub grade: Grade,
    /// Time spent, as `m:ss`
    pub time_spent: String,
    pub learned: bool,
}

impl ResultSummary {
    fn new(kind: AssessmentKind, result: &AssessmentResult) -> Self {
        Self {
            percentage: result.percentage(),
            grade: result.grade(),
            time_spent: scoring::format_clock(result.elapsed_seconds),
            learned: kind == AssessmentKind::Practice && scoring::qualifies_as_learned(result),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentResponse {
    pub id: String,
    pub kind: AssessmentKind,
    pub state: SessionSnapshot,
    /// Remaining time as `m:ss` for timed sessions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ResultSummary>,
}

impl AssessmentResponse {
    fn new(id: &str, kind: AssessmentKind, session: &AssessmentSession) -> Self {
        Self {
            id: id.to_string(),
            kind,
            state: session.snapshot(),
            clock: session.remaining_seconds().map(scoring::format_clock),
            summary: session.result().map(|r| ResultSummary::new(kind, r)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    /// recorded, locked or completed
    pub outcome: &'static str,
    #[serde(flatten)]
    pub assessment: AssessmentResponse,
}

// ============================================================================
// Handlers
// ============================================================================

/// Build questions and store a new session.
///
/// POST /assessments
///
/// A session without usable vocabulary is still created in the `errored`
/// state so the client can show why.
pub async fn create_assessment(
    State(state): State<AppState>,
    Json(request): Json<CreateAssessmentRequest>,
) -> ApiResult<(StatusCode, Json<AssessmentResponse>)> {
    let config = request.config(&state.exam_defaults);
    config.validate()?;

    let collections = state.words.collections(&request.collection_ids);
    let outcome = quiz::pool_from_collections(&collections, &request.collection_ids)
        .and_then(|pool| quiz::prepare_questions(&pool, &config, &mut rand::rng()));

    let mut session = AssessmentSession::new(request.session_options(&config));
    let status = session.load(outcome);

    let id = generate_session_id();
    let context = AssessmentContext {
        user_id: request.user_id.clone(),
        kind: request.kind,
        collection_ids: request.collection_ids.clone(),
        public_exam_id: request.public_exam_id.clone(),
        config,
    };

    if status == AssessmentStatus::Ready {
        let sender = state.results.clone();
        let session_id = id.clone();
        let finished_context = context.clone();
        session.on_finish(move |result| {
            let finished = FinishedAssessment {
                session_id,
                context: finished_context,
                result: *result,
                finished_at: Utc::now(),
            };
            if let Err(e) = sender.send(finished) {
                tracing::warn!("Result of {} was not saved: worker stopped", e.0.session_id);
            }
        });
    }

    crate::profile_log!(crate::profiling::EventType::AssessmentCreated {
        kind: format!("{:?}", request.kind).to_lowercase(),
        questions: session.questions().len(),
        status: status.as_str().to_string(),
    });
    tracing::info!(
        "Created {:?} assessment {} with {} questions ({})",
        request.kind,
        id,
        session.questions().len(),
        status
    );

    let response = AssessmentResponse::new(&id, request.kind, &session);
    state.sessions.insert(&id, session, context)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Run a state machine operation and answer with the new state.
fn act<T>(
    state: &AppState,
    id: &str,
    op: impl FnOnce(&mut AssessmentSession) -> Result<T, SessionError>,
) -> ApiResult<(T, AssessmentResponse)> {
    let outcome = state.sessions.with_session(id, |session, context| {
        let value = op(session)?;
        Ok::<_, SessionError>((value, AssessmentResponse::new(id, context.kind, session)))
    })??;
    Ok(outcome)
}

/// GET /assessments/{id}
pub async fn get_assessment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AssessmentResponse>> {
    let response = state
        .sessions
        .with_session(&id, |session, context| {
            AssessmentResponse::new(&id, context.kind, session)
        })?;
    Ok(Json(response))
}

/// Start answering and the session clock with it. Untimed sessions still
/// tick so their result reports the time spent.
///
/// POST /assessments/{id}/start
pub async fn start_assessment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AssessmentResponse>> {
    let (_, response) = act(&state, &id, |session| session.start())?;

    let handle = spawn_countdown(state.sessions.clone(), id.clone());
    state.sessions.set_countdown(&id, handle)?;
    tracing::info!("Assessment {} started", id);
    Ok(Json(response))
}

/// POST /assessments/{id}/answer
pub async fn answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> ApiResult<Json<AnswerResponse>> {
    let (outcome, assessment) = act(&state, &id, |session| {
        session.select_answer(request.question, request.option)
    })?;

    let outcome = match outcome {
        AnswerOutcome::Recorded => "recorded",
        AnswerOutcome::Locked => "locked",
        AnswerOutcome::Completed(_) => "completed",
    };
    Ok(Json(AnswerResponse {
        outcome,
        assessment,
    }))
}

/// POST /assessments/{id}/goto
pub async fn go_to(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<GoToRequest>,
) -> ApiResult<Json<AssessmentResponse>> {
    let (_, response) = act(&state, &id, |session| session.go_to(request.index))?;
    Ok(Json(response))
}

/// POST /assessments/{id}/next
pub async fn next_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AssessmentResponse>> {
    let (_, response) = act(&state, &id, |session| session.next())?;
    Ok(Json(response))
}

/// POST /assessments/{id}/previous
pub async fn previous_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AssessmentResponse>> {
    let (_, response) = act(&state, &id, |session| session.previous())?;
    Ok(Json(response))
}

/// Submit; with unanswered questions left the session waits for `confirm`.
///
/// POST /assessments/{id}/submit
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AssessmentResponse>> {
    let (_, response) = act(&state, &id, |session| session.request_submit())?;
    Ok(Json(response))
}

/// POST /assessments/{id}/confirm
pub async fn confirm_submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AssessmentResponse>> {
    let (_, response) = act(&state, &id, |session| session.confirm_submit())?;
    Ok(Json(response))
}

/// POST /assessments/{id}/cancel
pub async fn cancel_submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AssessmentResponse>> {
    let (_, response) = act(&state, &id, |session| session.cancel_submit())?;
    Ok(Json(response))
}

/// Abandon a session. Unfinished sessions produce no result.
///
/// DELETE /assessments/{id}
pub async fn delete_assessment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.sessions.remove(&id)? {
        tracing::info!("Assessment {} removed", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(crate::session::SessionStoreError::NotFound(id).into())
    }
}
