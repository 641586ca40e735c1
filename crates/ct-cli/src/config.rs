//! Configuration loading and management.

use std::path::{Path, PathBuf};

use ct_core::EstimatorConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Longest gap between activities that still counts as active time.
    pub idle_cap_minutes: f64,
    /// Flat allowance added to every session with activity signal.
    pub base_minutes: f64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        let defaults = EstimatorConfig::default();
        Self {
            database_path: data_dir.join("ct.db"),
            idle_cap_minutes: defaults.idle_cap_minutes,
            base_minutes: defaults.base_minutes,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (CT_*)
        figment = figment.merge(Env::prefixed("CT_"));

        figment.extract()
    }

    /// Returns the estimator tuning from this configuration.
    pub const fn estimator_config(&self) -> EstimatorConfig {
        EstimatorConfig {
            idle_cap_minutes: self.idle_cap_minutes,
            base_minutes: self.base_minutes,
        }
    }
}

/// Returns the platform-specific config directory for ct.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ct"))
}

/// Returns the platform-specific data directory for ct.
///
/// On Linux: `~/.local/share/ct`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("ct"))
}
