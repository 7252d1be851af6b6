//! Application configuration management.

use serde::Deserialize;

use crate::types::CurrencyType;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Planning workflow configuration.
    #[serde(default)]
    pub planning: PlanningConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Planning workflow configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanningConfig {
    /// Currency all indicator totals are normalized to.
    #[serde(default)]
    pub reporting_currency: CurrencyType,
    /// Require the acceptance window to start no earlier than the edit window.
    #[serde(default)]
    pub enforce_window_order: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "planbook=info".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PLANBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
