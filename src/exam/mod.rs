//! Practice quiz and timed exam sessions.

pub mod session;

pub use session::{
  AnswerOutcome, AssessmentSession, AssessmentStatus, QuestionView, SessionOptions,
  SessionSnapshot, SubmitOutcome, TimeUrgency,
};
