//! Configuration for the provider engine
//!
//! Covers the two settings a bootstrap needs to agree on: which process
//! variable names the active environment (consulted by environment-bound
//! conditions) and which scope a registration gets when it does not name one.

pub mod environment;

pub use environment::{EnvironmentSource, FixedEnvironment, ProcessEnvironment};

use std::env;
use thiserror::Error;

use crate::provider::scope::ProviderScope;

/// Variable overriding the name of the environment variable
pub const ENVIRONMENT_KEY_VAR: &str = "PROVIDE_ENVIRONMENT_KEY";

/// Variable overriding the default provider scope
pub const DEFAULT_SCOPE_VAR: &str = "PROVIDE_DEFAULT_SCOPE";

/// Environment variable read when no override is configured
pub const DEFAULT_ENVIRONMENT_KEY: &str = "ENVIRONMENT";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Configuration validation failed: {message}")]
    ValidationFailed { message: String },
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a validation failed error
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

/// Provider engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvideConfig {
    /// Name of the process variable holding the active environment name
    pub environment_key: String,
    /// Scope used by registrations that do not specify one
    pub default_scope: ProviderScope,
}

impl ProvideConfig {
    /// Create a configuration with the framework defaults
    pub fn new() -> Self {
        Self {
            environment_key: DEFAULT_ENVIRONMENT_KEY.to_string(),
            default_scope: ProviderScope::Singleton,
        }
    }

    /// Use a different environment variable
    pub fn with_environment_key(mut self, key: impl Into<String>) -> Self {
        self.environment_key = key.into();
        self
    }

    /// Use a different default scope
    pub fn with_default_scope(mut self, scope: ProviderScope) -> Self {
        self.default_scope = scope;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Ok(key) = env::var(ENVIRONMENT_KEY_VAR) {
            config.environment_key = key;
        }

        if let Ok(scope) = env::var(DEFAULT_SCOPE_VAR) {
            config.default_scope = scope.parse().map_err(|_| {
                ConfigError::invalid_value(
                    "default_scope",
                    scope.clone(),
                    "singleton or transient",
                )
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment_key.trim().is_empty() {
            return Err(ConfigError::validation_failed(
                "environment_key cannot be empty",
            ));
        }

        if self.default_scope.is_deferred() {
            return Err(ConfigError::invalid_value(
                "default_scope",
                self.default_scope.to_string(),
                "singleton or transient",
            ));
        }

        Ok(())
    }
}

impl Default for ProvideConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProvideConfig::default();
        assert_eq!(config.environment_key, "ENVIRONMENT");
        assert_eq!(config.default_scope, ProviderScope::Singleton);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deferred_default_scope_is_rejected() {
        let config = ProvideConfig::new().with_default_scope(ProviderScope::Deferred);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_empty_environment_key_is_rejected() {
        let config = ProvideConfig::new().with_environment_key("  ");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }
}
