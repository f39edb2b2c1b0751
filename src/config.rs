//! Application configuration constants.
//!
//! Limits and defaults live here as constants. Deployment settings (bind
//! address, collections file, default exam settings) are loaded from
//! `config.toml` with `.env`/environment fallback.

use serde::Deserialize;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::domain::{AssessmentConfig, PoolPolicy, QuizMode};
use crate::paths;

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

// ==================== Assessment Limits ====================

/// Allowed number of options per question
pub const VARIANT_COUNT_RANGE: RangeInclusive<usize> = 2..=6;

/// Largest exam the setup screen allows
pub const MAX_WORD_COUNT: usize = 100;

/// Longest allowed exam, in minutes
pub const MAX_TIME_LIMIT_MINUTES: u32 = 180;

pub const DEFAULT_WORD_COUNT: usize = 20;
pub const DEFAULT_VARIANT_COUNT: usize = 4;
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 10;

// ==================== Mixed Mode ====================

/// Mixed mode roll below this shows the term
pub const MIXED_ITEM_TO_MEANING_WEIGHT: f64 = 0.4;

/// Mixed mode roll below this (and above the previous) shows the meaning;
/// anything higher is a coin flip
pub const MIXED_MEANING_TO_ITEM_CUTOFF: f64 = 0.8;

// ==================== Countdown ====================

/// Countdown tick interval in seconds
pub const TICK_INTERVAL_SECS: u64 = 1;

/// Remaining seconds at or below which the clock is critical
pub const URGENCY_CRITICAL_SECS: u32 = 60;

/// Remaining seconds at or below which the clock shows a warning
pub const URGENCY_WARNING_SECS: u32 = 300;

// ==================== Session Configuration ====================

/// Live session expiration after inactivity, in hours.
/// Longer than the longest exam so a running exam is never swept.
pub const SESSION_EXPIRY_HOURS: i64 = 4;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

/// Length of generated session identifiers
pub const SESSION_ID_LEN: usize = 32;

// ==================== Loaded Settings ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    server: Option<ServerConfig>,
    content: Option<ContentConfig>,
    exam: Option<ExamConfig>,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct ContentConfig {
    collections_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExamConfig {
    word_count: Option<usize>,
    variant_count: Option<usize>,
    time_limit_minutes: Option<u32>,
    mode: Option<QuizMode>,
    pool_policy: Option<PoolPolicy>,
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub addr: String,
    pub port: u16,
    pub collections_path: PathBuf,
    /// Defaults applied to requests that omit a setting
    pub exam_defaults: AssessmentConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: SERVER_ADDR.to_string(),
            port: SERVER_PORT,
            collections_path: PathBuf::from(paths::collections_path()),
            exam_defaults: AssessmentConfig::default(),
        }
    }
}

impl Settings {
    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

/// Load settings with priority: config.toml > .env > default
pub fn load_settings() -> Settings {
    // Load .env file if present
    let _ = dotenvy::dotenv();
    load_settings_from(Path::new("config.toml"))
}

/// Load settings from a specific config file, falling back to env and defaults.
pub fn load_settings_from(config_path: &Path) -> Settings {
    let file = read_config_file(config_path);
    let mut settings = Settings::default();

    // Priority 2: environment
    if let Ok(port) = std::env::var("PORT") {
        match port.parse() {
            Ok(port) => settings.port = port,
            Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
        }
    }
    if let Ok(path) = std::env::var("COLLECTIONS_PATH") {
        settings.collections_path = PathBuf::from(path);
    }

    // Priority 1: config.toml
    if let Some(server) = file.server {
        if let Some(addr) = server.addr {
            settings.addr = addr;
        }
        if let Some(port) = server.port {
            settings.port = port;
        }
    }
    if let Some(path) = file.content.and_then(|c| c.collections_path) {
        tracing::info!("Using collections from config file: {}", path);
        settings.collections_path = PathBuf::from(path);
    }
    if let Some(exam) = file.exam {
        apply_exam_section(&mut settings.exam_defaults, exam);
    }

    settings
}

fn read_config_file(path: &Path) -> AppConfig {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return AppConfig::default(),
    };
    match toml::from_str::<AppConfig>(&contents) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring unreadable {}: {}", path.display(), e);
            AppConfig::default()
        }
    }
}

fn apply_exam_section(defaults: &mut AssessmentConfig, exam: ExamConfig) {
    let mut candidate = defaults.clone();
    if let Some(word_count) = exam.word_count {
        candidate.word_count = word_count;
    }
    if let Some(variant_count) = exam.variant_count {
        candidate.variant_count = variant_count;
    }
    if let Some(minutes) = exam.time_limit_minutes {
        candidate.time_limit_minutes = minutes;
    }
    if let Some(mode) = exam.mode {
        candidate.mode = mode;
    }
    if let Some(policy) = exam.pool_policy {
        candidate.pool_policy = policy;
    }

    match candidate.validate() {
        Ok(()) => *defaults = candidate,
        Err(e) => tracing::warn!("Ignoring [exam] defaults from config file: {}", e),
    }
}
