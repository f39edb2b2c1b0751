pub mod assessment;
pub mod question;
pub mod vocabulary;

pub use assessment::{
  AnswerEditPolicy, AssessmentConfig, AssessmentKind, AssessmentResult, PoolPolicy,
};
pub use question::{Direction, QuestionRecord, QuizMode};
pub use vocabulary::{Collection, Visibility, VocabularyItem, WordRecord};
