//! Application state shared by all handlers.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::domain::AssessmentConfig;
use crate::services::{spawn_result_worker, MemoryResultStore, ResultSender, WordStore};
use crate::session::SessionStore;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Live assessment sessions
    pub sessions: Arc<SessionStore>,

    /// Read-only vocabulary
    pub words: Arc<dyn WordStore>,

    /// Queue feeding the result worker
    pub results: ResultSender,

    /// Recorded results, leaderboard and learned collections
    pub ledger: Arc<MemoryResultStore>,

    /// Settings used when a request leaves them out
    pub exam_defaults: AssessmentConfig,
}

impl AppState {
    /// Build the state and start the result worker.
    ///
    /// The worker stops once every clone of the state has been dropped.
    pub fn new(
        words: Arc<dyn WordStore>,
        ledger: Arc<MemoryResultStore>,
        exam_defaults: AssessmentConfig,
    ) -> (Self, JoinHandle<()>) {
        let (results, worker) = spawn_result_worker(ledger.clone());
        let state = Self {
            sessions: Arc::new(SessionStore::new()),
            words,
            results,
            ledger,
            exam_defaults,
        };
        (state, worker)
    }
}
