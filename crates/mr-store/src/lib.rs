//! Persistence for the picker: catalog loading from JSON/CSV exports with
//! TOML curation overrides, and a small SQLite session store for the daily
//! exclusion list, deck checkpoint, and last pick.

pub mod catalog;
pub mod error;
pub mod schema;
pub mod store;

use std::path::PathBuf;

pub use catalog::load_catalog;
pub use error::{Result, StoreError};
pub use store::Store;

/// File name of the session database inside the data directory.
pub const DB_FILE: &str = "session.db";

/// Default data directory: `~/.movie-roulette`.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".movie-roulette")
}

/// Resolve the data directory: an explicit flag wins, then the
/// `MR_DATA_DIR` environment variable, then the default under `$HOME`.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    if let Ok(dir) = std::env::var("MR_DATA_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    default_base_dir()
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
