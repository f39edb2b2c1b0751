use serde::{Deserialize, Serialize};

use super::QuizMode;
use crate::config;
use crate::error::ConfigError;
use crate::scoring::{self, Grade};

/// Practice quiz or timed exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
  #[default]
  Exam,
  Practice,
}

/// What to do when the pool cannot fill the requested word count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PoolPolicy {
  /// Ask fewer questions
  #[default]
  Clamp,
  /// Refuse to build the assessment
  Strict,
}

/// Whether an answered question can be changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerEditPolicy {
  /// Practice quizzes: the first selection is final
  LockOnFirst,
  /// Timed exams: answers can change until submission
  EditableUntilSubmit,
}

/// Caller-supplied assessment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentConfig {
  pub word_count: usize,
  pub variant_count: usize,
  pub time_limit_minutes: u32,
  #[serde(default)]
  pub mode: QuizMode,
  #[serde(default)]
  pub pool_policy: PoolPolicy,
}

impl Default for AssessmentConfig {
  fn default() -> Self {
    Self {
      word_count: config::DEFAULT_WORD_COUNT,
      variant_count: config::DEFAULT_VARIANT_COUNT,
      time_limit_minutes: config::DEFAULT_TIME_LIMIT_MINUTES,
      mode: QuizMode::default(),
      pool_policy: PoolPolicy::default(),
    }
  }
}

impl AssessmentConfig {
  /// Check the settings against the configured limits.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if !config::VARIANT_COUNT_RANGE.contains(&self.variant_count) {
      return Err(ConfigError::VariantCount {
        got: self.variant_count,
        min: *config::VARIANT_COUNT_RANGE.start(),
        max: *config::VARIANT_COUNT_RANGE.end(),
      });
    }
    if self.word_count == 0 || self.word_count > config::MAX_WORD_COUNT {
      return Err(ConfigError::WordCount {
        got: self.word_count,
        max: config::MAX_WORD_COUNT,
      });
    }
    if self.time_limit_minutes == 0 || self.time_limit_minutes > config::MAX_TIME_LIMIT_MINUTES {
      return Err(ConfigError::TimeLimit {
        got: self.time_limit_minutes,
        max: config::MAX_TIME_LIMIT_MINUTES,
      });
    }
    Ok(())
  }

  pub fn time_limit_seconds(&self) -> u32 {
    self.time_limit_minutes * 60
  }
}

/// Final outcome of one assessment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
  pub correct_count: usize,
  pub total_questions: usize,
  pub elapsed_seconds: u32,
  /// True when the countdown ran out before a manual submit
  pub auto_submitted: bool,
}

impl AssessmentResult {
  pub fn percentage(&self) -> u32 {
    scoring::percentage(self.correct_count, self.total_questions)
  }

  pub fn grade(&self) -> Grade {
    Grade::from_percentage(self.percentage())
  }

  pub fn is_perfect(&self) -> bool {
    self.total_questions > 0 && self.correct_count == self.total_questions
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_config_is_valid() {
    assert!(AssessmentConfig::default().validate().is_ok());
  }

  #[test]
  fn test_validate_rejects_single_variant() {
    let config = AssessmentConfig {
      variant_count: 1,
      ..Default::default()
    };
    assert!(matches!(
      config.validate(),
      Err(ConfigError::VariantCount { got: 1, .. })
    ));
  }

  #[test]
  fn test_validate_rejects_zero_words() {
    let config = AssessmentConfig {
      word_count: 0,
      ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::WordCount { got: 0, .. })));
  }

  #[test]
  fn test_validate_rejects_too_many_words() {
    let config = AssessmentConfig {
      word_count: config::MAX_WORD_COUNT + 1,
      ..Default::default()
    };
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_validate_rejects_zero_time_limit() {
    let config = AssessmentConfig {
      time_limit_minutes: 0,
      ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::TimeLimit { got: 0, .. })));
  }

  #[test]
  fn test_time_limit_seconds() {
    let config = AssessmentConfig {
      time_limit_minutes: 10,
      ..Default::default()
    };
    assert_eq!(config.time_limit_seconds(), 600);
  }

  #[test]
  fn test_result_percentage_and_grade() {
    let result = AssessmentResult {
      correct_count: 17,
      total_questions: 20,
      elapsed_seconds: 300,
      auto_submitted: false,
    };
    assert_eq!(result.percentage(), 85);
    assert_eq!(result.grade(), Grade::Good);
    assert!(!result.is_perfect());
  }

  #[test]
  fn test_result_perfect() {
    let result = AssessmentResult {
      correct_count: 5,
      total_questions: 5,
      elapsed_seconds: 42,
      auto_submitted: false,
    };
    assert!(result.is_perfect());
  }

  #[test]
  fn test_empty_result_is_not_perfect() {
    let result = AssessmentResult {
      correct_count: 0,
      total_questions: 0,
      elapsed_seconds: 0,
      auto_submitted: true,
    };
    assert!(!result.is_perfect());
    assert_eq!(result.percentage(), 0);
  }
}
