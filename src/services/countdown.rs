//! Per-session countdown task.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config;
use crate::session::SessionStore;

/// Tick the session once per interval until it stops needing a clock.
///
/// Timed sessions count down and submit themselves at zero; untimed ones
/// only accumulate elapsed time.
///
/// The returned handle should be given to [`SessionStore::set_countdown`] so
/// the store can abort the task when the session ends early.
pub fn spawn_countdown(store: Arc<SessionStore>, id: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(config::TICK_INTERVAL_SECS));
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            match store.tick(&id) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    tracing::error!("Countdown for {} stopped: {}", id, e);
                    break;
                }
            }
        }
        tracing::debug!("Countdown for {} finished", id);
    })
}
