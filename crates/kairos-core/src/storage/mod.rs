mod prefs;

pub use prefs::{PrefStore, Preferences, PREFS_FILE};

use std::path::PathBuf;

use crate::error::StoreError;

/// Returns `~/.config/kairos[-dev]/` based on KAIROS_ENV.
///
/// Set KAIROS_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("KAIROS_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("kairos-dev")
    } else {
        base_dir.join("kairos")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StoreError::DataDir(e.to_string()))?;
    Ok(dir)
}
