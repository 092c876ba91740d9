//! Configuration section types

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    /// Directory holding saved deals and profiles
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset (e.g. "info", "jusur_calc=debug")
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}
