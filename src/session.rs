//! In-memory storage for live assessment sessions.
//!
//! Sessions are keyed by a random id handed to the client on creation and
//! expire after `SESSION_EXPIRY_HOURS` without access. Each started session
//! owns a clock task; the store aborts it once the session stops needing a
//! clock.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config;
use crate::exam::AssessmentSession;
use crate::services::AssessmentContext;

#[derive(Debug, Error)]
pub enum SessionStoreError {
  #[error("session store lock poisoned")]
  Poisoned,

  #[error("assessment {0} not found")]
  NotFound(String),
}

/// Session entry with last access time for expiration
struct SessionEntry {
  session: AssessmentSession,
  context: AssessmentContext,
  last_access: DateTime<Utc>,
  countdown: Option<JoinHandle<()>>,
}

impl SessionEntry {
  fn stop_countdown(&mut self) {
    if let Some(handle) = self.countdown.take() {
      handle.abort();
    }
  }
}

#[derive(Default)]
pub struct SessionStore {
  sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, SessionEntry>>, SessionStoreError> {
    self.sessions.lock().map_err(|_| SessionStoreError::Poisoned)
  }

  pub fn insert(
    &self,
    id: &str,
    session: AssessmentSession,
    context: AssessmentContext,
  ) -> Result<(), SessionStoreError> {
    let mut sessions = self.lock()?;
    maybe_cleanup(&mut sessions);

    let replaced = sessions.insert(
      id.to_string(),
      SessionEntry {
        session,
        context,
        last_access: Utc::now(),
        countdown: None,
      },
    );
    if let Some(mut old) = replaced {
      old.session.teardown();
      old.stop_countdown();
    }
    Ok(())
  }

  /// Run `f` against a session and refresh its access time.
  ///
  /// If the session no longer needs a clock afterwards, its countdown task is
  /// aborted.
  pub fn with_session<T>(
    &self,
    id: &str,
    f: impl FnOnce(&mut AssessmentSession, &AssessmentContext) -> T,
  ) -> Result<T, SessionStoreError> {
    let mut sessions = self.lock()?;
    maybe_cleanup(&mut sessions);
    let entry = sessions
      .get_mut(id)
      .ok_or_else(|| SessionStoreError::NotFound(id.to_string()))?;

    entry.last_access = Utc::now();
    let output = f(&mut entry.session, &entry.context);
    if !entry.session.is_timer_active() {
      entry.stop_countdown();
    }
    Ok(output)
  }

  /// Advance one session clock by a second.
  ///
  /// Returns whether the clock should keep running. Called from the
  /// countdown task itself, so the task handle is released rather than
  /// aborted.
  pub fn tick(&self, id: &str) -> Result<bool, SessionStoreError> {
    let mut sessions = self.lock()?;
    let Some(entry) = sessions.get_mut(id) else {
      return Ok(false);
    };

    entry.session.tick();
    let active = entry.session.is_timer_active();
    if !active {
      entry.countdown = None;
    }
    Ok(active)
  }

  /// Attach the countdown task of a session. A stale or unknown session
  /// gets the task aborted immediately.
  pub fn set_countdown(&self, id: &str, handle: JoinHandle<()>) -> Result<(), SessionStoreError> {
    let mut sessions = self.lock()?;
    match sessions.get_mut(id) {
      Some(entry) if entry.session.is_timer_active() => {
        entry.stop_countdown();
        entry.countdown = Some(handle);
      }
      _ => handle.abort(),
    }
    Ok(())
  }

  /// Drop a session, cancelling it if it was still running.
  pub fn remove(&self, id: &str) -> Result<bool, SessionStoreError> {
    let mut sessions = self.lock()?;
    match sessions.remove(id) {
      Some(mut entry) => {
        entry.session.teardown();
        entry.stop_countdown();
        Ok(true)
      }
      None => Ok(false),
    }
  }

  pub fn len(&self) -> usize {
    self.lock().map(|s| s.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Clean up expired sessions occasionally (~10% chance)
fn maybe_cleanup(sessions: &mut HashMap<String, SessionEntry>) {
  if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
    cleanup_expired(sessions, Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS));
  }
}

/// Clean up sessions last touched before `cutoff`
fn cleanup_expired(sessions: &mut HashMap<String, SessionEntry>, cutoff: DateTime<Utc>) {
  sessions.retain(|id, entry| {
    if entry.last_access > cutoff {
      return true;
    }
    tracing::debug!("Expiring assessment session {}", id);
    entry.session.teardown();
    entry.stop_countdown();
    false
  });
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..config::SESSION_ID_LEN)
    .map(|_| {
      let idx = rng.random_range(0..36u8);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{AssessmentConfig, AssessmentKind};
  use crate::exam::{AssessmentStatus, SessionOptions};
  use crate::testing::ready_session;

  fn context() -> AssessmentContext {
    AssessmentContext {
      user_id: Some("u1".to_string()),
      kind: AssessmentKind::Exam,
      collection_ids: vec!["fruit".to_string()],
      public_exam_id: None,
      config: AssessmentConfig::default(),
    }
  }

  fn timed(seconds: u32) -> SessionOptions {
    SessionOptions {
      time_limit_seconds: Some(seconds),
      ..SessionOptions::exam(1)
    }
  }

  #[test]
  fn test_generate_session_id() {
    let id = generate_session_id();
    assert_eq!(id.len(), config::SESSION_ID_LEN);
    assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    assert_ne!(id, generate_session_id());
  }

  #[test]
  fn test_unknown_session_is_not_found() {
    let store = SessionStore::new();
    let err = store.with_session("missing", |s, _| s.status()).unwrap_err();
    assert!(matches!(err, SessionStoreError::NotFound(id) if id == "missing"));
  }

  #[test]
  fn test_with_session_mutates_in_place() {
    let store = SessionStore::new();
    store.insert("a", ready_session(3, timed(10)), context()).unwrap();

    store.with_session("a", |s, _| s.start()).unwrap().unwrap();
    let status = store.with_session("a", |s, _| s.status()).unwrap();
    assert_eq!(status, AssessmentStatus::InProgress);
  }

  #[test]
  fn test_tick_runs_until_time_is_up() {
    let store = SessionStore::new();
    store.insert("a", ready_session(3, timed(2)), context()).unwrap();
    store.with_session("a", |s, _| s.start()).unwrap().unwrap();

    assert!(store.tick("a").unwrap());
    assert!(!store.tick("a").unwrap());

    let result = store
      .with_session("a", |s, _| s.result().copied())
      .unwrap()
      .unwrap();
    assert!(result.auto_submitted);
    assert_eq!(result.elapsed_seconds, 2);
  }

  #[test]
  fn test_tick_on_missing_session_stops_clock() {
    let store = SessionStore::new();
    assert!(!store.tick("gone").unwrap());
  }

  #[test]
  fn test_remove_cancels_running_session() {
    let store = SessionStore::new();
    store.insert("a", ready_session(3, timed(10)), context()).unwrap();
    assert!(store.remove("a").unwrap());
    assert!(!store.remove("a").unwrap());
    assert!(store.is_empty());
  }

  #[test]
  fn test_cleanup_expired_drops_stale_sessions() {
    let store = SessionStore::new();
    store.insert("old", ready_session(2, timed(10)), context()).unwrap();
    store.insert("new", ready_session(2, timed(10)), context()).unwrap();

    let mut sessions = store.lock().unwrap();
    sessions.get_mut("old").unwrap().last_access =
      Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS + 1);
    cleanup_expired(
      &mut sessions,
      Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS),
    );
    assert!(sessions.contains_key("new"));
    assert!(!sessions.contains_key("old"));
  }

  #[tokio::test]
  async fn test_countdown_aborted_when_session_finishes() {
    let store = SessionStore::new();
    store.insert("a", ready_session(2, timed(10)), context()).unwrap();
    store.with_session("a", |s, _| s.start()).unwrap().unwrap();

    let handle = tokio::spawn(std::future::pending::<()>());
    let abort = handle.abort_handle();
    store.set_countdown("a", handle).unwrap();

    store
      .with_session("a", |s, _| {
        s.request_submit().unwrap();
        s.confirm_submit().unwrap();
      })
      .unwrap();

    for _ in 0..10 {
      tokio::task::yield_now().await;
    }
    assert!(abort.is_finished());
  }

  #[tokio::test]
  async fn test_countdown_for_idle_session_is_aborted() {
    let store = SessionStore::new();
    store.insert("a", ready_session(2, timed(10)), context()).unwrap();

    let handle = tokio::spawn(std::future::pending::<()>());
    let abort = handle.abort_handle();
    // never started, so there is no clock to drive
    store.set_countdown("a", handle).unwrap();

    for _ in 0..10 {
      tokio::task::yield_now().await;
    }
    assert!(abort.is_finished());
  }
}
