//! Ansimssi: health information search host.
//!
//! Thin layer over [`ansimssi_search`] that adds the TOML configuration
//! file, platform directories and the service wiring used by the
//! `ansimssi-search` binary.

pub mod ansimssi_dirs;
pub mod config;
pub mod error;
pub mod service;

pub use config::{AppConfig, KnowledgeConfig};
pub use error::{AppError, Result};
pub use service::SearchService;
