// Configuration for the committee engine and node binary.
//
// Layers, lowest priority first: built-in defaults, an optional TOML file,
// then COMMITTEE_* environment variables (nested keys separated by "__").

pub mod validation;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::BackendChoice;

pub use validation::{ConfigValidationError, ConfigValidator, ValidationResult};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "COMMITTEE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Invalid configuration:\n{0}")]
    Invalid(String),
}

/// Storage backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    #[default]
    Memory,
    Sled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,
    pub path: Option<PathBuf>,
}

/// Limits applied to proposal content before it is considered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    pub max_title_length: usize,
    pub max_description_length: usize,
    pub max_param_changes: usize,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            max_title_length: 140,
            max_description_length: 10_000,
            max_param_changes: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub log_level: String,
    pub storage: StorageConfig,
    pub governance: GovernanceConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            storage: StorageConfig::default(),
            governance: GovernanceConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config = ::config::Config::builder()
            .add_source(::config::File::from_str(contents, ::config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Run the validator and fail with its summary if anything is wrong
    pub fn validated(self) -> Result<Self, ConfigError> {
        let result = ConfigValidator::new().validate(&self);
        if result.is_valid {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(result.get_summary()))
        }
    }

    pub fn backend_choice(&self) -> Result<BackendChoice, ConfigError> {
        match self.storage.backend {
            StorageBackendKind::Memory => Ok(BackendChoice::Memory),
            StorageBackendKind::Sled => self
                .storage
                .path
                .clone()
                .map(BackendChoice::Sled)
                .ok_or_else(|| ConfigError::Invalid("storage.path is required for sled".into())),
        }
    }
}
