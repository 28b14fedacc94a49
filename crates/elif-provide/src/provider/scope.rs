use serde::{Deserialize, Serialize};

use crate::container::BindingScope;
use crate::errors::ProvideError;

/// Provider scope enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderScope {
    /// Single instance shared by every resolution
    #[default]
    Singleton,
    /// New instance created for each resolution
    Transient,
    /// Singleton, bound only once a deferred scope container is materialized
    Deferred,
    /// Transient, bound only once a deferred scope container is materialized
    DeferredTransient,
}

impl ProviderScope {
    /// Check if the scope waits for materialization
    pub fn is_deferred(&self) -> bool {
        matches!(self, ProviderScope::Deferred | ProviderScope::DeferredTransient)
    }

    /// Check if the scope can be bound right away
    pub fn is_immediate(&self) -> bool {
        !self.is_deferred()
    }

    /// The immediate scope a deferred scope turns into when materialized
    pub fn materialized(&self) -> ProviderScope {
        match self {
            ProviderScope::Deferred => ProviderScope::Singleton,
            ProviderScope::DeferredTransient => ProviderScope::Transient,
            immediate => *immediate,
        }
    }

    /// Container scope policy, `None` for deferred scopes
    pub fn binding_scope(&self) -> Option<BindingScope> {
        match self {
            ProviderScope::Singleton => Some(BindingScope::Singleton),
            ProviderScope::Transient => Some(BindingScope::Transient),
            ProviderScope::Deferred | ProviderScope::DeferredTransient => None,
        }
    }

    /// Get the scope name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderScope::Singleton => "singleton",
            ProviderScope::Transient => "transient",
            ProviderScope::Deferred => "deferred",
            ProviderScope::DeferredTransient => "deferred_transient",
        }
    }
}

impl std::fmt::Display for ProviderScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderScope {
    type Err = ProvideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "singleton" => Ok(ProviderScope::Singleton),
            "transient" => Ok(ProviderScope::Transient),
            "deferred" => Ok(ProviderScope::Deferred),
            "deferred_transient" | "deferredtransient" => Ok(ProviderScope::DeferredTransient),
            _ => Err(ProvideError::UnrecognizedScope {
                scope: s.to_string(),
            }),
        }
    }
}

/// How a provider value turns into instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// A constructible; instances are built on resolution
    Class,
    /// A constant payload returned as is
    Value,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Class => "class",
            ProviderKind::Value => "value",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ProvideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "class" => Ok(ProviderKind::Class),
            "value" => Ok(ProviderKind::Value),
            _ => Err(ProvideError::UnrecognizedProviderKind {
                kind: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_scope_from_str() {
        assert_eq!("singleton".parse::<ProviderScope>().unwrap(), ProviderScope::Singleton);
        assert_eq!("Transient".parse::<ProviderScope>().unwrap(), ProviderScope::Transient);
        assert_eq!("deferred".parse::<ProviderScope>().unwrap(), ProviderScope::Deferred);
        assert_eq!(
            "deferred-transient".parse::<ProviderScope>().unwrap(),
            ProviderScope::DeferredTransient
        );
        assert_eq!(
            "DeferredTransient".parse::<ProviderScope>().unwrap(),
            ProviderScope::DeferredTransient
        );

        assert!(matches!(
            "scoped".parse::<ProviderScope>(),
            Err(ProvideError::UnrecognizedScope { .. })
        ));
    }

    #[test]
    fn test_materialized_scopes() {
        assert_eq!(ProviderScope::Deferred.materialized(), ProviderScope::Singleton);
        assert_eq!(ProviderScope::DeferredTransient.materialized(), ProviderScope::Transient);
        assert_eq!(ProviderScope::Transient.materialized(), ProviderScope::Transient);

        assert!(ProviderScope::Deferred.binding_scope().is_none());
        assert_eq!(ProviderScope::Singleton.binding_scope(), Some(BindingScope::Singleton));
    }

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("CLASS".parse::<ProviderKind>().unwrap(), ProviderKind::Class);
        assert_eq!("value".parse::<ProviderKind>().unwrap(), ProviderKind::Value);
        assert!(matches!(
            "factory".parse::<ProviderKind>(),
            Err(ProvideError::UnrecognizedProviderKind { .. })
        ));
    }

    #[test]
    fn test_default_scopes() {
        assert_eq!(ProviderScope::default(), ProviderScope::Singleton);
        assert_eq!(BindingScope::default(), BindingScope::Singleton);
        assert_eq!(ProviderScope::default().binding_scope(), Some(BindingScope::default()));
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(format!("{}", ProviderScope::DeferredTransient), "deferred_transient");
        assert_eq!(format!("{}", ProviderKind::Value), "value");
    }
}
