//! Application directory paths for Ansimssi.
//!
//! Uses the [`dirs`] crate for platform-appropriate resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | App data | `~/Library/Application Support/ansimssi/` | `~/.local/share/ansimssi/` |
//! | Config | `~/Library/Application Support/ansimssi/` | `~/.config/ansimssi/` |
//!
//! # Environment Overrides
//!
//! - `ANSIMSSI_DATA_DIR` overrides [`data_dir`]
//! - `ANSIMSSI_CONFIG_DIR` overrides [`config_dir`]

use std::path::PathBuf;

/// Application data root directory. Holds the knowledge store.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("ANSIMSSI_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("ansimssi"))
        .unwrap_or_else(|| PathBuf::from("/tmp/ansimssi-data"))
}

/// Application config directory.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("ANSIMSSI_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("ansimssi"))
        .unwrap_or_else(|| PathBuf::from("/tmp/ansimssi-config"))
}

/// Path to `config.toml`.
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default path of the learned knowledge store.
#[must_use]
pub fn knowledge_file() -> PathBuf {
    data_dir().join("knowledge_base.json")
}
