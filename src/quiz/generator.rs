//! Multiple-choice question generation.
//!
//! All functions take the random source as a parameter so callers can pass
//! `rand::rng()` in production and a seeded `StdRng` in tests.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use super::pool::dedup_pool;
use crate::config;
use crate::domain::{AssessmentConfig, Direction, PoolPolicy, QuestionRecord, QuizMode, VocabularyItem};
use crate::error::InsufficientData;

/// Pick the direction of one question.
///
/// Mixed mode splits 40% term-first, 40% meaning-first and leaves the rest
/// to a fair coin.
pub fn choose_direction<R: Rng + ?Sized>(mode: QuizMode, rng: &mut R) -> Direction {
  if let Some(direction) = mode.fixed_direction() {
    return direction;
  }

  let roll: f64 = rng.random();
  if roll < config::MIXED_ITEM_TO_MEANING_WEIGHT {
    Direction::ItemToMeaning
  } else if roll < config::MIXED_MEANING_TO_ITEM_CUTOFF {
    Direction::MeaningToItem
  } else if rng.random_bool(0.5) {
    Direction::ItemToMeaning
  } else {
    Direction::MeaningToItem
  }
}

/// Generate up to `config.word_count` questions from `pool`.
///
/// The pool is deduplicated first. When it holds fewer items than requested
/// the question count shrinks to the pool size; an empty pool yields no
/// questions.
pub fn generate_questions<R: Rng + ?Sized>(
  pool: &[VocabularyItem],
  config: &AssessmentConfig,
  rng: &mut R,
) -> Vec<QuestionRecord> {
  let pool = dedup_pool(pool.iter().cloned());
  generate_from_distinct(&pool, config, rng)
}

/// Generate questions, applying the configured pool policy.
pub fn prepare_questions<R: Rng + ?Sized>(
  pool: &[VocabularyItem],
  config: &AssessmentConfig,
  rng: &mut R,
) -> Result<Vec<QuestionRecord>, InsufficientData> {
  let pool = dedup_pool(pool.iter().cloned());
  if pool.is_empty() {
    return Err(InsufficientData::EmptyPool);
  }

  if config.pool_policy == PoolPolicy::Strict {
    if pool.len() < config.word_count {
      return Err(InsufficientData::NotEnoughWords {
        available: pool.len(),
        required: config.word_count,
      });
    }
    let answers = distinct_answer_count(&pool, config.mode);
    if answers < config.variant_count {
      return Err(InsufficientData::NotEnoughWords {
        available: answers,
        required: config.variant_count,
      });
    }
  }

  let questions = crate::profile_scope!("generate_questions", {
    generate_from_distinct(&pool, config, rng)
  });
  if questions.is_empty() {
    return Err(InsufficientData::EmptyPool);
  }
  Ok(questions)
}

fn generate_from_distinct<R: Rng + ?Sized>(
  pool: &[VocabularyItem],
  config: &AssessmentConfig,
  rng: &mut R,
) -> Vec<QuestionRecord> {
  if pool.is_empty() {
    return Vec::new();
  }

  let mut order: Vec<usize> = (0..pool.len()).collect();
  order.shuffle(rng);

  let count = config.word_count.min(pool.len());
  if count < config.word_count {
    tracing::debug!(
      "Pool has {} items, asking {} of {} requested questions",
      pool.len(),
      count,
      config.word_count
    );
  }

  order
    .into_iter()
    .take(count)
    .map(|index| {
      let direction = choose_direction(config.mode, rng);
      build_question(pool, index, direction, config.variant_count, rng)
    })
    .collect()
}

/// Build one question: the correct answer plus up to `variant_count - 1`
/// distinct distractors drawn from the rest of the pool, in random order.
fn build_question<R: Rng + ?Sized>(
  pool: &[VocabularyItem],
  index: usize,
  direction: Direction,
  variant_count: usize,
  rng: &mut R,
) -> QuestionRecord {
  let item = &pool[index];
  let correct = direction.answer(item);

  let mut seen: HashSet<&str> = HashSet::new();
  let mut distractors: Vec<&str> = pool
    .iter()
    .enumerate()
    .filter(|(i, _)| *i != index)
    .map(|(_, other)| direction.answer(other))
    .filter(|answer| *answer != correct && seen.insert(*answer))
    .collect();

  distractors.shuffle(rng);
  distractors.truncate(variant_count.saturating_sub(1));

  // Distractors are already shuffled; only the correct answer needs a slot
  let correct_index = rng.random_range(0..=distractors.len());
  let mut options: Vec<String> = distractors.into_iter().map(String::from).collect();
  options.insert(correct_index, correct.to_string());

  QuestionRecord {
    item: item.clone(),
    options,
    correct_index,
    direction,
  }
}

/// Number of distinct answer strings the pool can offer for a mode.
fn distinct_answer_count(pool: &[VocabularyItem], mode: QuizMode) -> usize {
  let count_for = |direction: Direction| {
    pool
      .iter()
      .map(|item| direction.answer(item))
      .collect::<HashSet<_>>()
      .len()
  };
  match mode.fixed_direction() {
    Some(direction) => count_for(direction),
    None => count_for(Direction::ItemToMeaning).min(count_for(Direction::MeaningToItem)),
  }
}
