//! Application services.
//!
//! Everything between the HTTP handlers and the assessment core: where
//! vocabulary comes from, where results go, and the clock that drives
//! timed sessions.

pub mod countdown;
pub mod results;
pub mod word_store;

pub use countdown::spawn_countdown;
pub use results::{
    spawn_result_worker, AssessmentContext, FinishedAssessment, LearnedCollection,
    MemoryResultStore, ResultSender, ResultSink, SinkError,
};
pub use word_store::{CollectionSummary, JsonWordStore, StoreError, WordStore};
