use serde::{Deserialize, Serialize};

use super::VocabularyItem;

/// Which side of an item is shown and which is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
  /// Show the term, ask for the meaning
  ItemToMeaning,
  /// Show the meaning, ask for the term
  MeaningToItem,
}

impl Direction {
  /// The string shown as the question
  pub fn prompt<'a>(&self, item: &'a VocabularyItem) -> &'a str {
    match self {
      Self::ItemToMeaning => &item.term,
      Self::MeaningToItem => &item.meaning,
    }
  }

  /// The string that is the correct option
  pub fn answer<'a>(&self, item: &'a VocabularyItem) -> &'a str {
    match self {
      Self::ItemToMeaning => &item.meaning,
      Self::MeaningToItem => &item.term,
    }
  }
}

/// Direction selection for a whole quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum QuizMode {
  #[default]
  #[serde(alias = "english-to-meaning")]
  ItemToMeaning,
  #[serde(alias = "meaning-to-english")]
  MeaningToItem,
  Mixed,
}

impl QuizMode {
  /// The fixed direction of this mode, None for mixed
  pub fn fixed_direction(&self) -> Option<Direction> {
    match self {
      Self::ItemToMeaning => Some(Direction::ItemToMeaning),
      Self::MeaningToItem => Some(Direction::MeaningToItem),
      Self::Mixed => None,
    }
  }
}

/// A generated multiple-choice question.
///
/// `options[correct_index]` is always `direction.answer(&item)` and `options`
/// holds no duplicate strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
  pub item: VocabularyItem,
  pub options: Vec<String>,
  pub correct_index: usize,
  pub direction: Direction,
}

impl QuestionRecord {
  pub fn prompt(&self) -> &str {
    self.direction.prompt(&self.item)
  }

  pub fn correct_answer(&self) -> &str {
    &self.options[self.correct_index]
  }

  pub fn is_correct(&self, option_index: usize) -> bool {
    option_index == self.correct_index
  }
}
