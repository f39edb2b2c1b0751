//! Feature-gated assessment profiling.
//!
//! With `--features profiling`, assessment events and timed scopes are
//! appended as JSON lines to `$DATA_DIR/profile/profile_<timestamp>.jsonl`.
//! Without it, [`profile_log!`] drops its argument unevaluated,
//! [`profile_scope!`] only runs its block, and `init`/`shutdown` are empty.
//!
//! ```rust,ignore
//! lugat::profile_log!(lugat::profiling::EventType::AnswerSelected {
//!     question: 3,
//!     is_correct: true,
//! });
//! ```

#[cfg(feature = "profiling")]
mod event;
#[cfg(feature = "profiling")]
mod logger;

#[cfg(feature = "profiling")]
pub use event::{EventType, ProfileEvent};
#[cfg(feature = "profiling")]
pub use logger::{init, log_event, log_timed, shutdown};

#[cfg(not(feature = "profiling"))]
pub fn init() {}

#[cfg(not(feature = "profiling"))]
pub fn shutdown() {}

/// Record one `EventType` in the profile log.
#[macro_export]
macro_rules! profile_log {
    ($event:expr) => {
        #[cfg(feature = "profiling")]
        $crate::profiling::log_event($event);
    };
}

/// Run `$body` and record how long it took under `$name`.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr, $body:block) => {{
        #[cfg(feature = "profiling")]
        let started = std::time::Instant::now();
        let value = $body;
        #[cfg(feature = "profiling")]
        $crate::profiling::log_timed($name, started.elapsed());
        value
    }};
}
