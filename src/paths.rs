//! Project path functions - single source of truth for all file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//! - `COLLECTIONS_PATH`: Override the collections file (see config.rs)
//!
//! This allows running multiple isolated server instances side by side:
//! ```bash
//! DATA_DIR=data/test/a PORT=3001 cargo run
//! DATA_DIR=data/test/b PORT=3002 cargo run
//! ```

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// Word collections served by the read-only store
pub fn collections_path() -> String {
    format!("{}/collections.json", data_dir())
}

/// Directory for profiling event logs
pub fn profile_dir() -> String {
    format!("{}/profile", data_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_live_under_data_dir() {
        assert!(collections_path().starts_with(data_dir()));
        assert!(profile_dir().starts_with(data_dir()));
        assert!(collections_path().ends_with("collections.json"));
    }
}
