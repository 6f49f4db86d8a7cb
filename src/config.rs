//! Harness settings.
//!
//! Settings are read from YAML; every field has a default so an empty
//! document is valid:
//!
//! ```yaml
//! logging:
//!   filter: "harness_core=debug"
//! delegation:
//!   warn_on_overwrite: false
//! ```

use crate::errors::SuiteError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub delegation: DelegationSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber` filter directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "harness_core=info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DelegationSettings {
    /// Log a warning when a decoration replaces an existing delegate value.
    pub warn_on_overwrite: bool,
}

impl Default for DelegationSettings {
    fn default() -> Self {
        Self {
            warn_on_overwrite: true,
        }
    }
}

impl Settings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SuiteError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| SuiteError::Config {
            message: e.to_string(),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SuiteError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SuiteError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_yaml_str(&content)
    }
}

/// Installs a global formatting subscriber. `RUST_LOG` wins over the
/// configured filter. Returns false if a subscriber was already installed.
pub fn init_tracing(settings: &LoggingSettings) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
