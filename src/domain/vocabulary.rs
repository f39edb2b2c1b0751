use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// A word as stored inside a collection.
///
/// Older collections carry the term under `english` instead of `word`; both
/// are accepted and `word` wins when a record has both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub word: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub english: Option<String>,
  #[serde(default)]
  pub meaning: String,
  /// Part of speech (noun, verb, ...)
  #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
  pub word_type: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub example_sentence: Option<String>,
}

/// A vocabulary item eligible for questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
  pub id: Option<String>,
  /// Primary-language string (the word being learned)
  pub term: String,
  /// Target-language string
  pub meaning: String,
  pub word_type: Option<String>,
  pub example_sentence: Option<String>,
}

impl VocabularyItem {
  pub fn new(id: Option<&str>, term: &str, meaning: &str) -> Self {
    Self {
      id: id.map(String::from),
      term: term.to_string(),
      meaning: meaning.to_string(),
      word_type: None,
      example_sentence: None,
    }
  }

  /// Convert a stored record, returning None when it has no usable term or meaning.
  pub fn from_record(record: &WordRecord) -> Option<Self> {
    let term = record
      .word
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .or_else(|| record.english.as_deref().map(str::trim).filter(|s| !s.is_empty()))?;

    let meaning = record.meaning.trim();
    if meaning.is_empty() {
      return None;
    }

    Some(Self {
      id: record.id.clone().filter(|id| !id.trim().is_empty()),
      term: term.to_string(),
      meaning: meaning.to_string(),
      word_type: record.word_type.clone(),
      example_sentence: record.example_sentence.clone(),
    })
  }

  /// Deduplication key: the id when present, otherwise the normalized term.
  pub fn identity_key(&self) -> Option<String> {
    if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
      return Some(format!("id:{}", id));
    }
    let term: String = self.term.trim().nfc().collect();
    if term.is_empty() {
      None
    } else {
      Some(format!("term:{}", term))
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
  Public,
  #[default]
  Private,
}

/// A named word collection authored by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
  pub id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default)]
  pub words: Vec<WordRecord>,
  #[serde(default)]
  pub visibility: Visibility,
}

impl Collection {
  /// Items of this collection that survive record conversion.
  pub fn items(&self) -> impl Iterator<Item = VocabularyItem> + '_ {
    self.words.iter().filter_map(VocabularyItem::from_record)
  }
}
