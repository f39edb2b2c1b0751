//! Finished assessment results: the sink trait, an in-memory ledger and the
//! background worker that feeds the sink.
//!
//! Sessions never wait on persistence. The completion callback only pushes a
//! [`FinishedAssessment`] onto a channel; the worker records it and logs
//! failures without reporting them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::{AssessmentConfig, AssessmentKind, AssessmentResult};
use crate::scoring::{self, ExamTakerStats, PublicExamStats, RankedExamTaker};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("result store unavailable")]
    Unavailable,
}

/// Who took the assessment and what it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentContext {
    pub user_id: Option<String>,
    pub kind: AssessmentKind,
    pub collection_ids: Vec<String>,
    pub public_exam_id: Option<String>,
    pub config: AssessmentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedAssessment {
    pub session_id: String,
    pub context: AssessmentContext,
    pub result: AssessmentResult,
    pub finished_at: DateTime<Utc>,
}

/// Destination for finished assessments.
pub trait ResultSink: Send + Sync {
    fn record(&self, finished: &FinishedAssessment) -> Result<(), SinkError>;
}

/// A collection some user finished with a perfect practice score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedCollection {
    pub collection_id: String,
    pub perfect_score_count: u32,
}

#[derive(Default)]
struct Ledger {
    results: Vec<FinishedAssessment>,
    public_exams: HashMap<String, PublicExamStats>,
    /// (user_id, collection_id) -> perfect practice runs
    learned: BTreeMap<(String, String), u32>,
}

/// Keeps every result in memory and derives the statistics from it.
#[derive(Default)]
pub struct MemoryResultStore {
    ledger: Mutex<Ledger>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        // Append-only, so a poisoned ledger is still consistent
        self.ledger.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn results(&self) -> Vec<FinishedAssessment> {
        self.ledger().results.clone()
    }

    pub fn public_exam_stats(&self, public_exam_id: &str) -> Option<PublicExamStats> {
        self.ledger().public_exams.get(public_exam_id).copied()
    }

    /// Exam statistics per user, for users with at least one exam.
    pub fn exam_takers(&self) -> Vec<ExamTakerStats> {
        let ledger = self.ledger();
        let mut by_user: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
        for finished in &ledger.results {
            if finished.context.kind != AssessmentKind::Exam {
                continue;
            }
            if let Some(user_id) = finished.context.user_id.as_deref() {
                by_user
                    .entry(user_id)
                    .or_default()
                    .push(finished.result.percentage());
            }
        }

        by_user
            .into_iter()
            .map(|(user_id, percentages)| {
                ExamTakerStats::from_percentages(user_id, user_id, percentages)
            })
            .collect()
    }

    pub fn leaderboard(&self) -> Vec<RankedExamTaker> {
        scoring::rank_exam_takers(self.exam_takers())
    }

    pub fn learned_collections(&self, user_id: &str) -> Vec<LearnedCollection> {
        self.ledger()
            .learned
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|((_, collection_id), &count)| LearnedCollection {
                collection_id: collection_id.clone(),
                perfect_score_count: count,
            })
            .collect()
    }
}

impl ResultSink for MemoryResultStore {
    fn record(&self, finished: &FinishedAssessment) -> Result<(), SinkError> {
        let mut ledger = self.ledger();
        let context = &finished.context;

        match context.kind {
            AssessmentKind::Exam => {
                if let Some(exam_id) = &context.public_exam_id {
                    ledger
                        .public_exams
                        .entry(exam_id.clone())
                        .or_default()
                        .record(finished.result.percentage());
                }
            }
            AssessmentKind::Practice => {
                if let Some(user_id) = &context.user_id {
                    if scoring::qualifies_as_learned(&finished.result) {
                        for collection_id in &context.collection_ids {
                            *ledger
                                .learned
                                .entry((user_id.clone(), collection_id.clone()))
                                .or_insert(0) += 1;
                        }
                    }
                }
            }
        }

        ledger.results.push(finished.clone());
        Ok(())
    }
}

pub type ResultSender = mpsc::UnboundedSender<FinishedAssessment>;

/// Start the task that hands finished assessments to `sink`.
///
/// The task ends once every sender is dropped and the queue is drained.
pub fn spawn_result_worker(sink: Arc<dyn ResultSink>) -> (ResultSender, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<FinishedAssessment>();

    let handle = tokio::spawn(async move {
        while let Some(finished) = rx.recv().await {
            let outcome = sink.record(&finished);
            crate::profile_log!(crate::profiling::EventType::ResultRecorded {
                ok: outcome.is_ok(),
            });
            match outcome {
                Ok(()) => tracing::debug!(
                    "Recorded result of {} ({}%)",
                    finished.session_id,
                    finished.result.percentage()
                ),
                Err(e) => tracing::warn!(
                    "Failed to save result of {}: {}",
                    finished.session_id,
                    e
                ),
            }
        }
        tracing::debug!("Result worker stopped");
    });

    (tx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn finished(
        user: Option<&str>,
        kind: AssessmentKind,
        correct: usize,
        total: usize,
    ) -> FinishedAssessment {
        FinishedAssessment {
            session_id: "s1".to_string(),
            context: AssessmentContext {
                user_id: user.map(str::to_string),
                kind,
                collection_ids: vec!["fruit".to_string()],
                public_exam_id: None,
                config: AssessmentConfig::default(),
            },
            result: AssessmentResult {
                correct_count: correct,
                total_questions: total,
                elapsed_seconds: 30,
                auto_submitted: false,
            },
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_perfect_practice_marks_collection_learned() {
        let store = MemoryResultStore::new();
        store
            .record(&finished(Some("u1"), AssessmentKind::Practice, 5, 5))
            .unwrap();
        store
            .record(&finished(Some("u1"), AssessmentKind::Practice, 5, 5))
            .unwrap();
        store
            .record(&finished(Some("u1"), AssessmentKind::Practice, 4, 5))
            .unwrap();

        let learned = store.learned_collections("u1");
        assert_eq!(
            learned,
            vec![LearnedCollection {
                collection_id: "fruit".to_string(),
                perfect_score_count: 2,
            }]
        );
        assert!(store.learned_collections("u2").is_empty());
    }

    #[test]
    fn test_perfect_exam_does_not_mark_learned() {
        let store = MemoryResultStore::new();
        store
            .record(&finished(Some("u1"), AssessmentKind::Exam, 5, 5))
            .unwrap();
        assert!(store.learned_collections("u1").is_empty());
    }

    #[test]
    fn test_public_exam_stats_accumulate() {
        let store = MemoryResultStore::new();
        for correct in [10, 5] {
            let mut entry = finished(Some("u1"), AssessmentKind::Exam, correct, 10);
            entry.context.public_exam_id = Some("midterm".to_string());
            store.record(&entry).unwrap();
        }

        let stats = store.public_exam_stats("midterm").unwrap();
        assert_eq!(stats.total_attempts, 2);
        assert!((stats.average_score - 75.0).abs() < 1e-9);
        assert!(store.public_exam_stats("final").is_none());
    }

    #[test]
    fn test_leaderboard_ignores_practice_and_anonymous() {
        let store = MemoryResultStore::new();
        store
            .record(&finished(Some("u1"), AssessmentKind::Exam, 8, 10))
            .unwrap();
        store
            .record(&finished(Some("u1"), AssessmentKind::Exam, 6, 10))
            .unwrap();
        store
            .record(&finished(Some("u2"), AssessmentKind::Practice, 10, 10))
            .unwrap();
        store
            .record(&finished(None, AssessmentKind::Exam, 10, 10))
            .unwrap();

        let board = store.leaderboard();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].stats.user_id, "u1");
        assert_eq!(board[0].stats.total_exams, 2);
        assert!((board[0].stats.average_exam_score - 70.0).abs() < 1e-9);
        assert_eq!(store.results().len(), 4);
    }

    /// Fails on the first call, succeeds afterwards.
    struct FlakySink {
        calls: AtomicUsize,
        inner: MemoryResultStore,
    }

    impl ResultSink for FlakySink {
        fn record(&self, finished: &FinishedAssessment) -> Result<(), SinkError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(SinkError::Unavailable);
            }
            self.inner.record(finished)
        }
    }

    #[tokio::test]
    async fn test_worker_survives_sink_failure() {
        let sink = Arc::new(FlakySink {
            calls: AtomicUsize::new(0),
            inner: MemoryResultStore::new(),
        });
        let (tx, handle) = spawn_result_worker(sink.clone());

        tx.send(finished(Some("u1"), AssessmentKind::Exam, 1, 2))
            .unwrap();
        tx.send(finished(Some("u1"), AssessmentKind::Exam, 2, 2))
            .unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(sink.calls.load(Ordering::SeqCst), 2);
        let saved = sink.inner.results();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].result.correct_count, 2);
    }
}
