//! Building the vocabulary pool an assessment draws from.

use std::collections::HashMap;

use crate::domain::{Collection, VocabularyItem};
use crate::error::InsufficientData;

/// Deduplicate items by identity key.
///
/// A later duplicate replaces the earlier value but keeps the position of the
/// first appearance. Items without an identity key are dropped.
pub fn dedup_pool(items: impl IntoIterator<Item = VocabularyItem>) -> Vec<VocabularyItem> {
  let mut positions: HashMap<String, usize> = HashMap::new();
  let mut pool: Vec<VocabularyItem> = Vec::new();

  for item in items {
    let Some(key) = item.identity_key() else {
      continue;
    };
    match positions.get(&key) {
      Some(&pos) => pool[pos] = item,
      None => {
        positions.insert(key, pool.len());
        pool.push(item);
      }
    }
  }

  pool
}

/// Combine the words of the selected collections into one deduplicated pool.
pub fn pool_from_collections(
  collections: &[Collection],
  selected_ids: &[String],
) -> Result<Vec<VocabularyItem>, InsufficientData> {
  if selected_ids.is_empty() {
    return Err(InsufficientData::NoCollectionSelected);
  }

  let selected: Vec<&Collection> = collections
    .iter()
    .filter(|c| selected_ids.contains(&c.id))
    .collect();
  if selected.is_empty() {
    return Err(InsufficientData::NoCollectionSelected);
  }

  let pool = dedup_pool(selected.iter().flat_map(|c| c.items()));
  if pool.is_empty() {
    return Err(InsufficientData::EmptyPool);
  }

  tracing::debug!(
    "Built pool of {} items from {} collection(s)",
    pool.len(),
    selected.len()
  );
  Ok(pool)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Visibility, WordRecord};

  fn word(id: &str, term: &str, meaning: &str) -> WordRecord {
    WordRecord {
      id: Some(id.to_string()),
      word: Some(term.to_string()),
      meaning: meaning.to_string(),
      ..Default::default()
    }
  }

  fn collection(id: &str, words: Vec<WordRecord>) -> Collection {
    Collection {
      id: id.to_string(),
      name: format!("Collection {}", id),
      description: None,
      words,
      visibility: Visibility::Private,
    }
  }

  #[test]
  fn test_dedup_by_id() {
    let pool = dedup_pool(vec![
      VocabularyItem::new(Some("1"), "apple", "alma"),
      VocabularyItem::new(Some("2"), "pear", "armud"),
      VocabularyItem::new(Some("1"), "apple", "alma (meyvə)"),
    ]);
    assert_eq!(pool.len(), 2);
    // later value wins, first position kept
    assert_eq!(pool[0].meaning, "alma (meyvə)");
    assert_eq!(pool[1].term, "pear");
  }

  #[test]
  fn test_dedup_by_term_without_id() {
    let pool = dedup_pool(vec![
      VocabularyItem::new(None, "apple", "alma"),
      VocabularyItem::new(None, "apple ", "alma"),
      VocabularyItem::new(None, "pear", "armud"),
    ]);
    assert_eq!(pool.len(), 2);
  }

  #[test]
  fn test_dedup_keeps_same_term_with_distinct_ids() {
    let pool = dedup_pool(vec![
      VocabularyItem::new(Some("1"), "bank", "bank (maliyyə)"),
      VocabularyItem::new(Some("2"), "bank", "sahil"),
    ]);
    assert_eq!(pool.len(), 2);
  }

  #[test]
  fn test_dedup_skips_items_without_key() {
    let pool = dedup_pool(vec![VocabularyItem::new(None, "  ", "boş")]);
    assert!(pool.is_empty());
  }

  #[test]
  fn test_pool_requires_selection() {
    let collections = vec![collection("a", vec![word("1", "apple", "alma")])];
    assert_eq!(
      pool_from_collections(&collections, &[]),
      Err(InsufficientData::NoCollectionSelected)
    );
  }

  #[test]
  fn test_pool_unknown_selection() {
    let collections = vec![collection("a", vec![word("1", "apple", "alma")])];
    assert_eq!(
      pool_from_collections(&collections, &["zzz".to_string()]),
      Err(InsufficientData::NoCollectionSelected)
    );
  }

  #[test]
  fn test_pool_empty_collection() {
    let collections = vec![collection("a", vec![])];
    assert_eq!(
      pool_from_collections(&collections, &["a".to_string()]),
      Err(InsufficientData::EmptyPool)
    );
  }

  #[test]
  fn test_pool_merges_and_dedups_selected_only() {
    let collections = vec![
      collection("a", vec![word("1", "apple", "alma"), word("2", "pear", "armud")]),
      collection("b", vec![word("2", "pear", "armud"), word("3", "plum", "gavalı")]),
      collection("c", vec![word("4", "fig", "əncir")]),
    ];
    let pool = pool_from_collections(&collections, &["a".to_string(), "b".to_string()]).unwrap();
    let terms: Vec<&str> = pool.iter().map(|i| i.term.as_str()).collect();
    assert_eq!(terms, vec!["apple", "pear", "plum"]);
  }
}
