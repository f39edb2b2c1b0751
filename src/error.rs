//! Error types shared by the question generator and the session state machine.

use serde::Serialize;
use thiserror::Error;

use crate::exam::AssessmentStatus;

/// Why an assessment could not be built from the selected vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InsufficientData {
  #[error("no collection selected")]
  NoCollectionSelected,

  #[error("not enough words: the selected collections have no usable vocabulary")]
  EmptyPool,

  #[error("not enough words: {available} available, {required} required")]
  NotEnoughWords { available: usize, required: usize },
}

/// Rejected assessment settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  #[error("variant count must be between {min} and {max}, got {got}")]
  VariantCount { got: usize, min: usize, max: usize },

  #[error("word count must be between 1 and {max}, got {got}")]
  WordCount { got: usize, max: usize },

  #[error("time limit must be between 1 and {max} minutes, got {got}")]
  TimeLimit { got: u32, max: u32 },
}

/// An operation the session cannot perform in its current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
  #[error("cannot {action} while the assessment is {status}")]
  InvalidTransition {
    action: &'static str,
    status: AssessmentStatus,
  },

  #[error("question {index} is out of range (0..{len})")]
  QuestionOutOfRange { index: usize, len: usize },

  #[error("option {option} is out of range for question {question} (0..{len})")]
  OptionOutOfRange {
    question: usize,
    option: usize,
    len: usize,
  },
}
