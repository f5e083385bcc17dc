//! Filesystem helpers for Registrar.

use std::path::PathBuf;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "REGISTRAR_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `REGISTRAR_DATA_DIR` environment variable
/// 2. `~/.registrar`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".registrar");
    }

    // Last resort: current directory
    PathBuf::from(".registrar")
}
