//! Profiling event records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// One line of the profiling log.
#[derive(Serialize)]
pub struct ProfileEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    /// Microseconds, for timed scopes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_us: Option<u64>,
}

impl ProfileEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            duration_us: None,
        }
    }

    pub fn with_duration(event_type: EventType, duration: Duration) -> Self {
        Self {
            duration_us: Some(duration.as_micros() as u64),
            ..Self::new(event_type)
        }
    }
}

/// Types of events that can be logged.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventType {
    // === Session lifecycle ===
    /// Profiling session started
    SessionStart {
        /// Session identifier
        session_id: String,
    },
    /// Profiling session ended
    SessionEnd {
        /// Total events logged
        total_events: u64,
    },

    // === Assessment lifecycle ===
    /// An assessment was created and its questions generated
    AssessmentCreated {
        /// "exam" or "practice"
        kind: String,
        /// Number of generated questions
        questions: usize,
        /// Status right after loading (ready or errored)
        status: String,
    },
    /// The user started answering
    AssessmentStarted {
        questions: usize,
        /// None for untimed practice
        time_limit_seconds: Option<u32>,
    },
    /// An answer was recorded
    AnswerSelected {
        question: usize,
        is_correct: bool,
    },
    /// The assessment produced its result
    AssessmentFinalized {
        correct: usize,
        total: usize,
        elapsed_seconds: u32,
        /// True when the countdown ran out
        auto_submitted: bool,
    },

    // === Result persistence ===
    /// A finished assessment reached the result sink
    ResultRecorded {
        /// Whether the sink accepted it
        ok: bool,
    },

    // === Timed scope ===
    /// A timed code block completed
    TimedScope {
        /// Name of the scope
        name: String,
        /// Duration in milliseconds
        duration_ms: u64,
    },
}
