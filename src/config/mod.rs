//! Configuration management
//!
//! Built-in defaults, then `config/default` and `config/local` files, then
//! `JUSUR__*` environment variables (a `.env` file is loaded first).
//! Deal files given on the command line are layered over the `deal`
//! section the same way.

mod types;

pub use types::*;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::types::{DealInputs, SharingModel};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Default inputs every deal starts from
    #[serde(default)]
    pub deal: DealInputs,
    /// Model used when none is given
    pub model: SharingModel,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    fn with_defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            // Deal defaults; anything unset is zero
            .set_default("deal.use_transaction_tax", false)?
            .set_default("deal.transaction_tax_pct", 2.5)?
            .set_default("deal.agent_commission_mode", "percentage")?
            .set_default("model", "sliding")?
            // Persistence defaults
            .set_default("persistence.data_dir", "./data")?
            // Logging defaults
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?)
    }

    /// Built-in defaults only, ignoring files and environment
    pub fn defaults() -> Result<Self> {
        Self::with_defaults()?
            .build()
            .context("Failed to build default configuration")?
            .try_deserialize()
            .context("Failed to deserialize default configuration")
    }

    /// Load configuration from files and environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::with_defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (JUSUR__*)
            .add_source(Environment::with_prefix("JUSUR").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    /// Read a YAML or JSON deal file, filling unset fields from `self.deal`
    pub fn load_deal(&self, path: impl AsRef<Path>) -> Result<DealInputs> {
        let path = path.as_ref();
        let base = Config::try_from(&self.deal).context("Failed to encode default deal")?;

        let inputs: DealInputs = Config::builder()
            .add_source(base)
            .add_source(File::from(path).required(true))
            .build()
            .with_context(|| format!("Failed to read deal file {}", path.display()))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse deal file {}", path.display()))?;

        debug!(path = %path.display(), buy_price = inputs.buy_price, sell_price = inputs.sell_price, "deal loaded");
        Ok(inputs)
    }

    /// Generate a digest of the config for logging
    pub fn digest(&self) -> String {
        format!(
            "model={} data_dir={} log_level={} json_logs={} tax_pct={:.2}",
            self.model,
            self.persistence.data_dir,
            self.logging.level,
            self.logging.json,
            self.deal.transaction_tax_pct
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
