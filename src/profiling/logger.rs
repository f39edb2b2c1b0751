//! JSONL file logger for profiling events.

use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;

use super::event::{EventType, ProfileEvent};
use crate::paths;

/// Flush the file after this many events
const FLUSH_EVERY: u64 = 100;

/// Global logger instance, set by init().
static LOGGER: Mutex<Option<ProfileLogger>> = Mutex::new(None);

/// Events written since startup.
static EVENT_COUNT: AtomicU64 = AtomicU64::new(0);

struct ProfileLogger {
    writer: BufWriter<File>,
}

impl ProfileLogger {
    /// Open `profile_<timestamp>.jsonl` in the profile directory.
    fn open(run_id: &str) -> std::io::Result<Self> {
        let dir = paths::profile_dir();
        create_dir_all(&dir)?;

        let filename = format!("{}/profile_{}.jsonl", dir, run_id);
        let file = OpenOptions::new().create(true).append(true).open(&filename)?;
        tracing::info!("Profiling enabled: writing to {}", filename);

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn write(&mut self, event: &ProfileEvent) {
        let Ok(json) = serde_json::to_string(event) else {
            return;
        };
        let _ = writeln!(self.writer, "{}", json);
        tracing::trace!(target: "lugat::profile", "{}", json);

        if EVENT_COUNT.fetch_add(1, Ordering::Relaxed) % FLUSH_EVERY == 0 {
            let _ = self.writer.flush();
        }
    }
}

fn write(event: ProfileEvent) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_mut() {
            logger.write(&event);
        }
    }
}

/// Start profiling. Call once from main() before anything is logged.
pub fn init() {
    let run_id = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    {
        let Ok(mut guard) = LOGGER.lock() else {
            tracing::error!("Profiler lock poisoned");
            return;
        };
        if guard.is_some() {
            tracing::warn!("Profiler already initialized");
            return;
        }
        match ProfileLogger::open(&run_id) {
            Ok(logger) => *guard = Some(logger),
            Err(e) => {
                tracing::error!("Failed to initialize profiler: {}", e);
                return;
            }
        }
    }
    log_event(EventType::SessionStart { session_id: run_id });
}

/// Log the end of the run and flush the file.
pub fn shutdown() {
    let total_events = EVENT_COUNT.load(Ordering::Relaxed);
    log_event(EventType::SessionEnd { total_events });

    let Ok(mut guard) = LOGGER.lock() else {
        return;
    };
    if let Some(mut logger) = guard.take() {
        let _ = logger.writer.flush();
        tracing::info!("Profiling session ended: {} events logged", total_events);
    }
}

pub fn log_event(event_type: EventType) {
    write(ProfileEvent::new(event_type));
}

/// Log the duration of a `profile_scope!` block.
pub fn log_timed(name: &str, duration: Duration) {
    write(ProfileEvent::with_duration(
        EventType::TimedScope {
            name: name.to_string(),
            duration_ms: duration.as_millis() as u64,
        },
        duration,
    ));
}
