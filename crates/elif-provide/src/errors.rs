use thiserror::Error;

use crate::config::ConfigError;
use crate::provider::scope::ProviderScope;

/// Result alias used across the provider engine
pub type ProvideResult<T> = Result<T, ProvideError>;

/// Error type for provider registration, materialization and resolution
#[derive(Debug, Error)]
pub enum ProvideError {
    #[error("No valid identifier specified: {message}. The identifier must be a type, a symbol or a non-empty name")]
    InvalidIdentifier { message: String },

    #[error("Provider kind '{kind}' is unrecognized (expected: class, value)")]
    UnrecognizedProviderKind { kind: String },

    #[error("Scope '{scope}' is unrecognized (expected: singleton, transient, deferred, deferred_transient)")]
    UnrecognizedScope { scope: String },

    #[error("Deferred scope '{scope}' of identifier {identifier} must be materialized before being bound")]
    DeferredBindingNotAllowed {
        identifier: String,
        scope: ProviderScope,
    },

    #[error("No binding found for identifier {identifier}")]
    MissingBinding { identifier: String },

    #[error("Ambiguous match for identifier {identifier}: {count} bindings found")]
    AmbiguousBinding { identifier: String, count: usize },

    #[error("Instance bound to {identifier} is not a '{expected}'")]
    TypeMismatch {
        identifier: String,
        expected: &'static str,
    },

    #[error("Construction of {identifier} failed: {source}")]
    ConstructionFailed {
        identifier: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },

    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl ProvideError {
    /// Create a new invalid identifier error
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            message: message.into(),
        }
    }

    /// Create a new missing binding error
    pub fn missing_binding(identifier: impl ToString) -> Self {
        Self::MissingBinding {
            identifier: identifier.to_string(),
        }
    }

    /// Create a new construction failure wrapping the constructor's error
    pub fn construction_failed(
        identifier: impl ToString,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ConstructionFailed {
            identifier: identifier.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn lock_error(resource: impl Into<String>) -> Self {
        Self::LockError {
            resource: resource.into(),
        }
    }

    /// Check if the error reports an unbound identifier
    pub fn is_missing_binding(&self) -> bool {
        matches!(self, Self::MissingBinding { .. })
    }

    /// Check if the error reports more than one candidate binding
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::AmbiguousBinding { .. })
    }

    /// Check if the error was raised by the registration engine itself
    /// rather than by container resolution
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifier { .. }
                | Self::UnrecognizedProviderKind { .. }
                | Self::UnrecognizedScope { .. }
                | Self::DeferredBindingNotAllowed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ProvideError::missing_binding("Provide<mailer>");
        assert_eq!(err.to_string(), "No binding found for identifier Provide<mailer>");
        assert!(err.is_missing_binding());
        assert!(!err.is_registration_error());

        let err = ProvideError::DeferredBindingNotAllowed {
            identifier: "Provide<session>".to_string(),
            scope: ProviderScope::DeferredTransient,
        };
        assert!(err.to_string().starts_with("Deferred scope 'deferred_transient'"));
        assert!(err.is_registration_error());
    }

    #[test]
    fn test_construction_failed_keeps_source() {
        let err = ProvideError::construction_failed("Provide<db>", "connection refused");
        assert_eq!(
            err.to_string(),
            "Construction of Provide<db> failed: connection refused"
        );
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: ProvideError = ConfigError::validation_failed("bad").into();
        assert_eq!(err.to_string(), "Configuration validation failed: bad");
    }
}
