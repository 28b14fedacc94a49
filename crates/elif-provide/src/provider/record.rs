use std::sync::Arc;

use crate::container::{BindingTarget, Constructor, Container, Instance, Token};
use crate::errors::ProvideResult;
use crate::provider::scope::{ProviderKind, ProviderScope};

/// What a provider hands out when its identifier is resolved
#[derive(Clone)]
pub enum Provider {
    /// Constructible: instances are built on resolution
    Class(Constructor),
    /// Constant payload
    Value(Instance),
}

impl Provider {
    /// Construct `T` through its `Default` implementation
    pub fn class<T: Default + Send + Sync + 'static>() -> Self {
        Provider::Class(Arc::new(|_: &Container| -> ProvideResult<Instance> {
            Ok(Arc::new(T::default()))
        }))
    }

    /// Construct instances with a factory that may resolve its own dependencies
    pub fn factory<T, F>(factory: F) -> Self
    where
        F: Fn(&Container) -> ProvideResult<T> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Provider::Class(Arc::new(move |container: &Container| -> ProvideResult<Instance> {
            Ok(Arc::new(factory(container)?))
        }))
    }

    /// Provide a constant
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Provider::Value(Arc::new(value))
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::Class(_) => ProviderKind::Class,
            Provider::Value(_) => ProviderKind::Value,
        }
    }

    pub(crate) fn binding_target(&self) -> BindingTarget {
        match self {
            Provider::Class(constructor) => BindingTarget::Constructor(constructor.clone()),
            Provider::Value(instance) => BindingTarget::Constant(instance.clone()),
        }
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Class(_) => write!(f, "Class(<constructor_fn>)"),
            Provider::Value(_) => write!(f, "Value(<instance>)"),
        }
    }
}

/// A registered provider
///
/// Immutable once created.
#[derive(Debug, Clone)]
pub struct ProviderRecord {
    identifier: Token,
    provider: Provider,
    scope: ProviderScope,
    override_existing: bool,
}

impl ProviderRecord {
    pub fn new(identifier: Token, provider: Provider, scope: ProviderScope) -> Self {
        Self {
            identifier,
            provider,
            scope,
            override_existing: false,
        }
    }

    /// Replace previous providers of the same identifier
    pub fn with_override(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    pub fn identifier(&self) -> &Token {
        &self.identifier
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    pub fn scope(&self) -> ProviderScope {
        self.scope
    }

    pub fn is_override(&self) -> bool {
        self.override_existing
    }
}

/// Registration classified by when it takes effect
#[derive(Debug, Clone)]
pub enum Registration {
    /// Bound into the target container right away
    Immediate(ProviderRecord),
    /// Held until materialization; the record already carries the
    /// immediate scope it will be bound with
    Pending(ProviderRecord),
}

impl Registration {
    pub fn plan(record: ProviderRecord) -> Self {
        if record.scope.is_deferred() {
            let scope = record.scope.materialized();
            Registration::Pending(ProviderRecord { scope, ..record })
        } else {
            Registration::Immediate(record)
        }
    }
}
