use std::collections::HashMap;

use log::{debug, error};
use thiserror::Error;

use crate::config::{EngineConfig, StorageBackendKind};

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Error type for configuration validation issues
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Missing required setting for: {0}")]
    MissingRequiredSetting(String),

    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),
}

/// Result of configuration validation
#[derive(Debug)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub is_valid: bool,

    /// List of errors found during validation
    pub errors: Vec<ConfigValidationError>,

    /// List of warnings (valid but not recommended)
    pub warnings: Vec<String>,

    /// Suggested fixes for validation issues
    pub suggested_fixes: HashMap<String, String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggested_fixes: HashMap::new(),
        }
    }

    pub fn add_error(&mut self, error: ConfigValidationError) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn add_suggested_fix(&mut self, setting: &str, suggestion: String) {
        self.suggested_fixes.insert(setting.to_string(), suggestion);
    }

    /// Return a summary of validation issues
    pub fn get_summary(&self) -> String {
        if self.is_valid && self.warnings.is_empty() {
            return "Configuration is valid with no warnings.".to_string();
        }

        let mut result = String::new();

        if !self.is_valid {
            result.push_str(&format!("Configuration has {} errors:\n", self.errors.len()));
            for (i, error) in self.errors.iter().enumerate() {
                result.push_str(&format!("  {}. {}\n", i + 1, error));
            }
        } else {
            result.push_str("Configuration is valid but has warnings.\n");
        }

        if !self.warnings.is_empty() {
            result.push_str(&format!("\nWarnings ({}):\n", self.warnings.len()));
            for (i, warning) in self.warnings.iter().enumerate() {
                result.push_str(&format!("  {}. {}\n", i + 1, warning));
            }
        }

        if !self.suggested_fixes.is_empty() {
            let mut fixes: Vec<_> = self.suggested_fixes.iter().collect();
            fixes.sort();
            result.push_str("\nSuggested fixes:\n");
            for (setting, suggestion) in fixes {
                result.push_str(&format!("  - {}: {}\n", setting, suggestion));
            }
        }

        result
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration validation rule
pub trait ValidationRule {
    fn name(&self) -> &str;

    fn validate(&self, config: &EngineConfig) -> Result<(), ConfigValidationError>;

    /// Suggest a fix for validation failures
    fn suggest_fix(&self, _config: &EngineConfig) -> Option<(String, String)> {
        None
    }
}

/// Applies a set of rules to an engine configuration
pub struct ConfigValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ConfigValidator {
    /// Create a validator with the default rules
    pub fn new() -> Self {
        let mut validator = Self { rules: Vec::new() };
        validator.add_rule(Box::new(LogLevelRule));
        validator.add_rule(Box::new(SledPathRule));
        validator.add_rule(Box::new(ContentLimitsRule));
        validator
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    pub fn validate(&self, config: &EngineConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        for rule in &self.rules {
            match rule.validate(config) {
                Ok(()) => {
                    debug!("Validation rule '{}' passed", rule.name());
                }
                Err(err) => {
                    error!("Validation rule '{}' failed: {}", rule.name(), err);
                    result.add_error(err);
                    if let Some((setting, suggestion)) = rule.suggest_fix(config) {
                        result.add_suggested_fix(&setting, suggestion);
                    }
                }
            }
        }

        if config.storage.backend == StorageBackendKind::Memory {
            result.add_warning(
                "Memory storage backend keeps governance state only for the life of the process."
                    .to_string(),
            );
        }

        result
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

struct LogLevelRule;

impl ValidationRule for LogLevelRule {
    fn name(&self) -> &str {
        "LogLevel"
    }

    fn validate(&self, config: &EngineConfig) -> Result<(), ConfigValidationError> {
        let level = config.log_level.to_ascii_lowercase();
        if LOG_LEVELS.contains(&level.as_str()) {
            Ok(())
        } else {
            Err(ConfigValidationError::InvalidValue(format!(
                "log_level '{}' is not one of {}",
                config.log_level,
                LOG_LEVELS.join(", ")
            )))
        }
    }

    fn suggest_fix(&self, _config: &EngineConfig) -> Option<(String, String)> {
        Some(("log_level".to_string(), "Use \"info\"".to_string()))
    }
}

/// The sled backend needs somewhere to live
struct SledPathRule;

impl ValidationRule for SledPathRule {
    fn name(&self) -> &str {
        "SledPath"
    }

    fn validate(&self, config: &EngineConfig) -> Result<(), ConfigValidationError> {
        if config.storage.backend == StorageBackendKind::Sled && config.storage.path.is_none() {
            return Err(ConfigValidationError::MissingRequiredSetting(
                "storage.path".to_string(),
            ));
        }
        Ok(())
    }

    fn suggest_fix(&self, _config: &EngineConfig) -> Option<(String, String)> {
        Some((
            "storage.path".to_string(),
            "Point storage.path at a writable directory".to_string(),
        ))
    }
}

struct ContentLimitsRule;

impl ValidationRule for ContentLimitsRule {
    fn name(&self) -> &str {
        "ContentLimits"
    }

    fn validate(&self, config: &EngineConfig) -> Result<(), ConfigValidationError> {
        let limits = &config.governance;
        if limits.max_title_length == 0 {
            return Err(ConfigValidationError::ValueOutOfRange(
                "governance.max_title_length must be positive".to_string(),
            ));
        }
        if limits.max_description_length == 0 {
            return Err(ConfigValidationError::ValueOutOfRange(
                "governance.max_description_length must be positive".to_string(),
            ));
        }
        if limits.max_param_changes == 0 {
            return Err(ConfigValidationError::ValueOutOfRange(
                "governance.max_param_changes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
