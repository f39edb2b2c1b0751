//! The assessment state machine.
//!
//! One `AssessmentSession` per attempt:
//!
//! ```text
//! Loading -> Ready -> InProgress <-> ConfirmingSubmit -> Finished
//!    |
//!    +-> Errored              (any non-terminal) -> Cancelled
//! ```
//!
//! The session has no clock of its own; the host calls [`AssessmentSession::tick`]
//! once per second. Manual submission and the countdown both end in
//! [`AssessmentSession::finalize`], which produces a result only once.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config;
use crate::domain::{AnswerEditPolicy, AssessmentResult, Direction, QuestionRecord};
use crate::error::{InsufficientData, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
  Loading,
  Ready,
  InProgress,
  /// Submit was requested with unanswered questions left
  ConfirmingSubmit,
  Finished,
  Errored,
  Cancelled,
}

impl AssessmentStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Loading => "loading",
      Self::Ready => "ready",
      Self::InProgress => "in_progress",
      Self::ConfirmingSubmit => "confirming_submit",
      Self::Finished => "finished",
      Self::Errored => "errored",
      Self::Cancelled => "cancelled",
    }
  }

  /// No further transitions are possible
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Finished | Self::Errored | Self::Cancelled)
  }
}

impl fmt::Display for AssessmentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      Self::Loading => "loading",
      Self::Ready => "ready",
      Self::InProgress => "in progress",
      Self::ConfirmingSubmit => "waiting for submit confirmation",
      Self::Finished => "finished",
      Self::Errored => "errored",
      Self::Cancelled => "cancelled",
    };
    f.write_str(label)
  }
}

/// How close a timed session is to running out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUrgency {
  Normal,
  Warning,
  Critical,
}

impl TimeUrgency {
  pub fn from_remaining(remaining_seconds: u32) -> Self {
    if remaining_seconds <= config::URGENCY_CRITICAL_SECS {
      Self::Critical
    } else if remaining_seconds <= config::URGENCY_WARNING_SECS {
      Self::Warning
    } else {
      Self::Normal
    }
  }
}

/// Behaviour switches for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
  pub edit_policy: AnswerEditPolicy,
  /// None for untimed sessions
  pub time_limit_seconds: Option<u32>,
  /// Move to the next question after answering the current one
  pub auto_advance: bool,
  /// Finalize as soon as every question has an answer
  pub finish_when_all_answered: bool,
}

impl SessionOptions {
  /// Timed exam: answers editable until submit, explicit submission.
  pub fn exam(time_limit_minutes: u32) -> Self {
    Self {
      edit_policy: AnswerEditPolicy::EditableUntilSubmit,
      time_limit_seconds: Some(time_limit_minutes * 60),
      auto_advance: false,
      finish_when_all_answered: false,
    }
  }

  /// Untimed practice quiz: first answer counts, ends after the last answer.
  pub fn practice(auto_advance: bool) -> Self {
    Self {
      edit_policy: AnswerEditPolicy::LockOnFirst,
      time_limit_seconds: None,
      auto_advance,
      finish_when_all_answered: true,
    }
  }
}

/// Outcome of [`AssessmentSession::select_answer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
  Recorded,
  /// The question already had a locked answer; nothing changed
  Locked,
  /// The answer completed the session
  Completed(AssessmentResult),
}

/// Outcome of [`AssessmentSession::request_submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
  ConfirmationRequired { unanswered: usize },
  Finished(AssessmentResult),
}

/// The question currently shown, as the host should render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
  pub index: usize,
  pub prompt: String,
  pub direction: Direction,
  pub options: Vec<String>,
  pub selected: Option<usize>,
  /// Only revealed for locked practice answers and after the session ends
  pub correct_index: Option<usize>,
}

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
  pub status: AssessmentStatus,
  pub current_index: usize,
  pub total_questions: usize,
  pub answers: BTreeMap<usize, usize>,
  pub answered: usize,
  pub unanswered: usize,
  pub remaining_seconds: Option<u32>,
  pub elapsed_seconds: u32,
  pub urgency: Option<TimeUrgency>,
  pub question: Option<QuestionView>,
  pub error: Option<String>,
  pub result: Option<AssessmentResult>,
}

type FinishCallback = Box<dyn FnOnce(&AssessmentResult) + Send>;

pub struct AssessmentSession {
  options: SessionOptions,
  status: AssessmentStatus,
  questions: Vec<QuestionRecord>,
  /// Sparse: unanswered questions have no entry
  answers: BTreeMap<usize, usize>,
  current_index: usize,
  remaining_seconds: Option<u32>,
  elapsed_seconds: u32,
  error: Option<InsufficientData>,
  result: Option<AssessmentResult>,
  on_finish: Option<FinishCallback>,
}

impl fmt::Debug for AssessmentSession {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AssessmentSession")
      .field("status", &self.status)
      .field("questions", &self.questions.len())
      .field("answers", &self.answers)
      .field("current_index", &self.current_index)
      .field("remaining_seconds", &self.remaining_seconds)
      .field("result", &self.result)
      .finish_non_exhaustive()
  }
}

impl AssessmentSession {
  pub fn new(options: SessionOptions) -> Self {
    Self {
      options,
      status: AssessmentStatus::Loading,
      questions: Vec::new(),
      answers: BTreeMap::new(),
      current_index: 0,
      remaining_seconds: options.time_limit_seconds,
      elapsed_seconds: 0,
      error: None,
      result: None,
      on_finish: None,
    }
  }

  /// Register the callback that receives the result. Called at most once.
  pub fn on_finish(&mut self, callback: impl FnOnce(&AssessmentResult) + Send + 'static) {
    self.on_finish = Some(Box::new(callback));
  }

  /// Hand the generated questions (or the reason there are none) to the session.
  pub fn load(
    &mut self,
    outcome: Result<Vec<QuestionRecord>, InsufficientData>,
  ) -> AssessmentStatus {
    if self.status != AssessmentStatus::Loading {
      tracing::warn!("Ignoring question load for a session that is {}", self.status);
      return self.status;
    }

    match outcome {
      Ok(questions) if !questions.is_empty() => {
        self.questions = questions;
        self.status = AssessmentStatus::Ready;
      }
      Ok(_) => self.fail(InsufficientData::EmptyPool),
      Err(reason) => self.fail(reason),
    }
    self.status
  }

  /// Move a loading or ready session to `Errored`.
  pub fn fail(&mut self, reason: InsufficientData) {
    if matches!(self.status, AssessmentStatus::Loading | AssessmentStatus::Ready) {
      tracing::info!("Assessment cannot start: {}", reason);
      self.error = Some(reason);
      self.status = AssessmentStatus::Errored;
      self.on_finish = None;
    }
  }

  /// Begin answering; the countdown starts from the full budget.
  pub fn start(&mut self) -> Result<(), SessionError> {
    self.expect_status("start", AssessmentStatus::Ready)?;
    self.status = AssessmentStatus::InProgress;
    self.remaining_seconds = self.options.time_limit_seconds;
    self.elapsed_seconds = 0;
    self.current_index = 0;

    crate::profile_log!(crate::profiling::EventType::AssessmentStarted {
      questions: self.questions.len(),
      time_limit_seconds: self.options.time_limit_seconds,
    });
    Ok(())
  }

  pub fn select_answer(
    &mut self,
    question_index: usize,
    option_index: usize,
  ) -> Result<AnswerOutcome, SessionError> {
    self.expect_status("answer", AssessmentStatus::InProgress)?;
    let question = self.question_at(question_index)?;
    if option_index >= question.options.len() {
      return Err(SessionError::OptionOutOfRange {
        question: question_index,
        option: option_index,
        len: question.options.len(),
      });
    }

    if self.options.edit_policy == AnswerEditPolicy::LockOnFirst
      && self.answers.contains_key(&question_index)
    {
      return Ok(AnswerOutcome::Locked);
    }

    crate::profile_log!(crate::profiling::EventType::AnswerSelected {
      question: question_index,
      is_correct: question.is_correct(option_index),
    });
    self.answers.insert(question_index, option_index);

    if self.options.finish_when_all_answered && self.unanswered() == 0 {
      if let Some(result) = self.finalize(false) {
        return Ok(AnswerOutcome::Completed(result));
      }
    }

    if self.options.auto_advance
      && question_index == self.current_index
      && question_index + 1 < self.questions.len()
    {
      self.current_index += 1;
    }

    Ok(AnswerOutcome::Recorded)
  }

  /// Jump to a question from the index grid.
  pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
    self.expect_status("navigate", AssessmentStatus::InProgress)?;
    self.question_at(index)?;
    self.current_index = index;
    Ok(())
  }

  pub fn next(&mut self) -> Result<usize, SessionError> {
    self.expect_status("navigate", AssessmentStatus::InProgress)?;
    if self.current_index + 1 < self.questions.len() {
      self.current_index += 1;
    }
    Ok(self.current_index)
  }

  pub fn previous(&mut self) -> Result<usize, SessionError> {
    self.expect_status("navigate", AssessmentStatus::InProgress)?;
    self.current_index = self.current_index.saturating_sub(1);
    Ok(self.current_index)
  }

  /// Submit, asking for confirmation first if questions are unanswered.
  pub fn request_submit(&mut self) -> Result<SubmitOutcome, SessionError> {
    self.expect_status("submit", AssessmentStatus::InProgress)?;
    let unanswered = self.unanswered();
    if unanswered > 0 {
      self.status = AssessmentStatus::ConfirmingSubmit;
      return Ok(SubmitOutcome::ConfirmationRequired { unanswered });
    }
    self.finish("submit").map(SubmitOutcome::Finished)
  }

  pub fn confirm_submit(&mut self) -> Result<AssessmentResult, SessionError> {
    self.expect_status("confirm submission", AssessmentStatus::ConfirmingSubmit)?;
    self.finish("confirm submission")
  }

  /// Close the confirmation dialog and keep answering.
  pub fn cancel_submit(&mut self) -> Result<(), SessionError> {
    self.expect_status("cancel submission", AssessmentStatus::ConfirmingSubmit)?;
    self.status = AssessmentStatus::InProgress;
    Ok(())
  }

  /// Advance the clock by one second. Returns the result if time ran out.
  pub fn tick(&mut self) -> Option<AssessmentResult> {
    if !self.is_timer_active() {
      return None;
    }

    self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
    let remaining = self.remaining_seconds?.saturating_sub(1);
    self.remaining_seconds = Some(remaining);

    if remaining == 0 {
      tracing::info!("Time is up, submitting automatically");
      return self.finalize(true);
    }
    None
  }

  /// Turn the session into its result. One-shot: every call after the first
  /// (or outside InProgress/ConfirmingSubmit) returns None.
  pub fn finalize(&mut self, auto_submitted: bool) -> Option<AssessmentResult> {
    if !self.is_timer_active() {
      return None;
    }

    let correct_count = self
      .answers
      .iter()
      .filter(|&(&question, &option)| {
        self
          .questions
          .get(question)
          .is_some_and(|q| q.is_correct(option))
      })
      .count();

    let elapsed_seconds = match (self.options.time_limit_seconds, self.remaining_seconds) {
      (Some(budget), Some(remaining)) => budget.saturating_sub(remaining),
      _ => self.elapsed_seconds,
    };

    let result = AssessmentResult {
      correct_count,
      total_questions: self.questions.len(),
      elapsed_seconds,
      auto_submitted,
    };
    self.status = AssessmentStatus::Finished;
    self.result = Some(result);

    crate::profile_log!(crate::profiling::EventType::AssessmentFinalized {
      correct: result.correct_count,
      total: result.total_questions,
      elapsed_seconds: result.elapsed_seconds,
      auto_submitted,
    });

    if let Some(callback) = self.on_finish.take() {
      callback(&result);
    }
    Some(result)
  }

  /// The host is going away: stop the clock and drop the callback.
  pub fn teardown(&mut self) {
    if !self.status.is_terminal() {
      self.status = AssessmentStatus::Cancelled;
    }
    self.on_finish = None;
  }

  /// Whether the countdown should be running
  pub fn is_timer_active(&self) -> bool {
    matches!(
      self.status,
      AssessmentStatus::InProgress | AssessmentStatus::ConfirmingSubmit
    )
  }

  pub fn status(&self) -> AssessmentStatus {
    self.status
  }

  pub fn questions(&self) -> &[QuestionRecord] {
    &self.questions
  }

  pub fn answers(&self) -> &BTreeMap<usize, usize> {
    &self.answers
  }

  pub fn current_index(&self) -> usize {
    self.current_index
  }

  pub fn remaining_seconds(&self) -> Option<u32> {
    self.remaining_seconds
  }

  pub fn error(&self) -> Option<&InsufficientData> {
    self.error.as_ref()
  }

  pub fn result(&self) -> Option<&AssessmentResult> {
    self.result.as_ref()
  }

  pub fn unanswered(&self) -> usize {
    self.questions.len().saturating_sub(self.answers.len())
  }

  pub fn snapshot(&self) -> SessionSnapshot {
    SessionSnapshot {
      status: self.status,
      current_index: self.current_index,
      total_questions: self.questions.len(),
      answers: self.answers.clone(),
      answered: self.answers.len(),
      unanswered: self.unanswered(),
      remaining_seconds: self.remaining_seconds,
      elapsed_seconds: self.elapsed_seconds,
      urgency: self.remaining_seconds.map(TimeUrgency::from_remaining),
      question: self.current_view(),
      error: self.error.as_ref().map(ToString::to_string),
      result: self.result,
    }
  }

  fn current_view(&self) -> Option<QuestionView> {
    if matches!(
      self.status,
      AssessmentStatus::Loading | AssessmentStatus::Ready | AssessmentStatus::Errored
    ) {
      return None;
    }
    let question = self.questions.get(self.current_index)?;
    let selected = self.answers.get(&self.current_index).copied();
    let reveal = self.status == AssessmentStatus::Finished
      || (self.options.edit_policy == AnswerEditPolicy::LockOnFirst && selected.is_some());

    Some(QuestionView {
      index: self.current_index,
      prompt: question.prompt().to_string(),
      direction: question.direction,
      options: question.options.clone(),
      selected,
      correct_index: reveal.then_some(question.correct_index),
    })
  }

  fn question_at(&self, index: usize) -> Result<&QuestionRecord, SessionError> {
    self.questions.get(index).ok_or(SessionError::QuestionOutOfRange {
      index,
      len: self.questions.len(),
    })
  }

  fn expect_status(
    &self,
    action: &'static str,
    expected: AssessmentStatus,
  ) -> Result<(), SessionError> {
    if self.status == expected {
      Ok(())
    } else {
      Err(SessionError::InvalidTransition {
        action,
        status: self.status,
      })
    }
  }

  fn finish(&mut self, action: &'static str) -> Result<AssessmentResult, SessionError> {
    let status = self.status;
    self
      .finalize(false)
      .ok_or(SessionError::InvalidTransition { action, status })
  }
}
