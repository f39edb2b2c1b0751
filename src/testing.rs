//! Test fixtures for pools, collections and sessions.
//!
//! Gives every test the same small vocabulary and a seeded random source so
//! generated questions are reproducible.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::domain::{
  AssessmentConfig, Collection, QuestionRecord, Visibility, VocabularyItem, WordRecord,
};
use crate::exam::{AssessmentSession, SessionOptions};
use crate::quiz::generate_questions;

const TERMS: [(&str, &str); 12] = [
  ("apple", "alma"),
  ("pear", "armud"),
  ("plum", "gavalı"),
  ("fig", "əncir"),
  ("grape", "üzüm"),
  ("cherry", "albalı"),
  ("quince", "heyva"),
  ("melon", "yemiş"),
  ("walnut", "qoz"),
  ("apricot", "ərik"),
  ("pomegranate", "nar"),
  ("mulberry", "tut"),
];

/// Deterministic random source for a test.
pub fn seeded_rng(seed: u64) -> StdRng {
  StdRng::seed_from_u64(seed)
}

/// `n` items with distinct ids, terms and meanings.
pub fn numbered_pool(n: usize) -> Vec<VocabularyItem> {
  (0..n)
    .map(|i| {
      let (term, meaning) = TERMS[i % TERMS.len()];
      let round = i / TERMS.len();
      if round == 0 {
        VocabularyItem::new(Some(&format!("w{}", i)), term, meaning)
      } else {
        VocabularyItem::new(
          Some(&format!("w{}", i)),
          &format!("{} {}", term, round),
          &format!("{} {}", meaning, round),
        )
      }
    })
    .collect()
}

/// A collection holding `numbered_pool(n)` as stored records.
pub fn collection_of(id: &str, n: usize) -> Collection {
  Collection {
    id: id.to_string(),
    name: format!("Test collection {}", id),
    description: None,
    words: numbered_pool(n)
      .into_iter()
      .map(|item| WordRecord {
        id: item.id,
        word: Some(item.term),
        english: None,
        meaning: item.meaning,
        word_type: None,
        example_sentence: None,
      })
      .collect(),
    visibility: Visibility::Public,
  }
}

/// Questions for `n` items with `variants` options each.
pub fn questions(n: usize, variants: usize) -> Vec<QuestionRecord> {
  let config = AssessmentConfig {
    word_count: n,
    variant_count: variants,
    ..Default::default()
  };
  generate_questions(&numbered_pool(n), &config, &mut seeded_rng(n as u64))
}

/// A loaded, not yet started session over `n` four-option questions.
pub fn ready_session(n: usize, options: SessionOptions) -> AssessmentSession {
  let mut session = AssessmentSession::new(options);
  session.load(Ok(questions(n, 4)));
  session
}

/// A wrong option index for a question.
pub fn wrong_option(question: &QuestionRecord) -> usize {
  (question.correct_index + 1) % question.options.len()
}
