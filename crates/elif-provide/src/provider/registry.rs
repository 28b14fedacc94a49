use std::sync::Arc;

use crate::container::{BindingHandle, BindingScope, Container};
use crate::errors::{ProvideError, ProvideResult};
use crate::provider::condition::{Condition, ConditionEvaluator};
use crate::provider::deferred::{DeferredScopeStore, WriteMode};
use crate::provider::identifier::{Identifier, IdentifierResolver};
use crate::provider::record::{Provider, ProviderRecord, Registration};
use crate::provider::scope::{ProviderKind, ProviderScope};

#[derive(Debug, Clone)]
enum ScopeOption {
    Known(ProviderScope),
    Named(String),
}

/// Options of a single registration
#[derive(Debug, Clone, Default)]
pub struct ProvideOptions {
    scope: Option<ScopeOption>,
    condition: Option<Condition>,
    override_existing: Option<bool>,
    target: Option<Container>,
}

impl ProvideOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider scope
    pub fn scope(mut self, scope: ProviderScope) -> Self {
        self.scope = Some(ScopeOption::Known(scope));
        self
    }

    /// Set the provider scope by name; unknown names fail at registration
    pub fn scope_name(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(ScopeOption::Named(scope.into()));
        self
    }

    /// Only register when the condition holds
    pub fn when(mut self, condition: impl Into<Condition>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Replace previous providers of the same identifier
    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing = Some(override_existing);
        self
    }

    /// Bind immediate scopes into this container instead of the root
    pub fn target(mut self, container: Container) -> Self {
        self.target = Some(container);
        self
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn is_override(&self) -> bool {
        self.override_existing.unwrap_or(false)
    }

    /// Fill the options left unset here from `base`
    pub fn or_from(self, base: &ProvideOptions) -> Self {
        Self {
            scope: self.scope.or_else(|| base.scope.clone()),
            condition: self.condition.or_else(|| base.condition.clone()),
            override_existing: self.override_existing.or(base.override_existing),
            target: self.target.or_else(|| base.target.clone()),
        }
    }

    fn resolve_scope(&self, default_scope: ProviderScope) -> ProvideResult<ProviderScope> {
        match &self.scope {
            None => Ok(default_scope),
            Some(ScopeOption::Known(scope)) => Ok(*scope),
            Some(ScopeOption::Named(name)) => name.parse(),
        }
    }
}

/// Bind a provider record into a container
///
/// With `override_existing`, the bindings the container itself holds for
/// the identifier are removed first. A class is bound as a constructor with
/// the record's scope applied; a value is bound as a constant. Deferred
/// scopes are rejected: they are only bound through materialization, after
/// being turned into their immediate scope.
pub fn bind_provider(record: &ProviderRecord, container: &Container) -> ProvideResult<BindingHandle> {
    let scope = record
        .scope()
        .binding_scope()
        .ok_or_else(|| ProvideError::DeferredBindingNotAllowed {
            identifier: record.identifier().to_string(),
            scope: record.scope(),
        })?;

    if record.is_override() && container.is_current_bound(record.identifier())? {
        container.unbind(record.identifier())?;
    }

    let handle = container.bind(record.identifier().clone(), record.provider().binding_target())?;
    if record.kind() == ProviderKind::Class {
        match scope {
            BindingScope::Singleton => handle.in_singleton_scope()?,
            BindingScope::Transient => handle.in_transient_scope()?,
        };
    }

    tracing::debug!(
        "Bound {} provider for {} in container {} ({})",
        record.kind(),
        record.identifier(),
        container.id(),
        record.scope()
    );
    Ok(handle)
}

/// Registers providers into the root container or the deferred scope store
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    root: Container,
    conditions: ConditionEvaluator,
    default_scope: ProviderScope,
}

impl ProviderRegistry {
    pub fn new(root: Container, conditions: ConditionEvaluator, default_scope: ProviderScope) -> Self {
        Self {
            root,
            conditions,
            default_scope,
        }
    }

    pub fn root(&self) -> &Container {
        &self.root
    }

    /// Register a provider
    ///
    /// Returns the binding for immediate scopes, and `None` when the
    /// condition does not hold or the scope is deferred. A failing
    /// condition leaves both the container and the deferred store untouched.
    pub fn register(
        &self,
        id: impl Into<Identifier>,
        provider: Provider,
        options: ProvideOptions,
    ) -> ProvideResult<Option<BindingHandle>> {
        let token = IdentifierResolver::resolve(&id.into())?;

        if !self.conditions.should_bind(options.condition()) {
            tracing::trace!("Skipped provider for {}: condition not met", token);
            return Ok(None);
        }

        let scope = options.resolve_scope(self.default_scope)?;
        let record = ProviderRecord::new(token, provider, scope).with_override(options.is_override());

        match Registration::plan(record) {
            Registration::Immediate(record) => {
                let container = options.target.as_ref().unwrap_or(&self.root);
                bind_provider(&record, container).map(Some)
            }
            Registration::Pending(record) => {
                let store = DeferredScopeStore::ensure(&self.root)?;
                store.write(record, WriteMode::from_override(options.is_override()))?;
                Ok(None)
            }
        }
    }

    /// Register `T` as a class constructed through `Default`
    pub fn provide_class<T: Default + Send + Sync + 'static>(
        &self,
        id: impl Into<Identifier>,
        options: ProvideOptions,
    ) -> ProvideResult<Option<BindingHandle>> {
        self.register(id, Provider::class::<T>(), options)
    }

    /// Register a class built by a factory
    pub fn provide_factory<T, F>(
        &self,
        id: impl Into<Identifier>,
        factory: F,
        options: ProvideOptions,
    ) -> ProvideResult<Option<BindingHandle>>
    where
        F: Fn(&Container) -> ProvideResult<T> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.register(id, Provider::factory(factory), options)
    }

    /// Register a constant
    ///
    /// Singleton and transient scopes resolve a constant the same way; a
    /// deferred scope still holds it back until materialization.
    pub fn provide_value<T: Send + Sync + 'static>(
        &self,
        id: impl Into<Identifier>,
        value: T,
        options: ProvideOptions,
    ) -> ProvideResult<Option<BindingHandle>> {
        self.register(id, Provider::value(value), options)
    }

    /// Resolve an identifier from `container`, or from the root
    pub fn get_dependency<T: Send + Sync + 'static>(
        &self,
        id: impl Into<Identifier>,
        container: Option<&Container>,
    ) -> ProvideResult<Arc<T>> {
        let token = IdentifierResolver::resolve(&id.into())?;
        container.unwrap_or(&self.root).get_as::<T>(&token)
    }

    /// Pending deferred providers of an identifier
    pub fn deferred_providers(&self, id: impl Into<Identifier>) -> ProvideResult<Vec<Arc<ProviderRecord>>> {
        let token = IdentifierResolver::resolve(&id.into())?;
        match DeferredScopeStore::locate(&self.root)? {
            Some(store) => store.records(&token),
            None => Ok(Vec::new()),
        }
    }
}
