//! Process-wide root container
//!
//! A [`ContainerAccessor`] owns the root container every registration
//! defaults to, and is the only way to return the engine to its initial
//! state. Applications normally go through [`ContainerAccessor::global`];
//! tests and embedders can own an accessor of their own.

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::config::{EnvironmentSource, ProcessEnvironment, ProvideConfig};
use crate::container::{BindingTarget, Container, ContainerKeys, ContainerOptions};
use crate::errors::ProvideResult;
use crate::provider::{ConditionEvaluator, ProviderRegistry, ScopeContainerFactory};

static GLOBAL: Lazy<ContainerAccessor> = Lazy::new(|| {
    let config = ProvideConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!("Invalid provider configuration, using defaults: {}", e);
        ProvideConfig::default()
    });
    let environment = Arc::new(ProcessEnvironment::new(config.environment_key.clone()));
    ContainerAccessor::build(config, environment)
});

/// Owner of the root container
#[derive(Debug, Clone)]
pub struct ContainerAccessor {
    root: Container,
    config: ProvideConfig,
    conditions: ConditionEvaluator,
}

impl ContainerAccessor {
    /// Create an accessor reading the environment name from the process
    pub fn new(config: ProvideConfig) -> ProvideResult<Self> {
        let environment = Arc::new(ProcessEnvironment::new(config.environment_key.clone()));
        Self::with_environment(config, environment)
    }

    /// Create an accessor evaluating conditions against `environment`
    pub fn with_environment(
        config: ProvideConfig,
        environment: Arc<dyn EnvironmentSource>,
    ) -> ProvideResult<Self> {
        config.validate()?;
        Ok(Self::build(config, environment))
    }

    fn build(config: ProvideConfig, environment: Arc<dyn EnvironmentSource>) -> Self {
        let root = Container::with_self_reference(ContainerOptions::default());
        tracing::debug!("Created root container {}", root.id());
        Self {
            root,
            config,
            conditions: ConditionEvaluator::new(environment),
        }
    }

    /// The process-wide accessor, configured from the environment on first use
    pub fn global() -> &'static ContainerAccessor {
        &GLOBAL
    }

    pub fn root(&self) -> &Container {
        &self.root
    }

    pub fn config(&self) -> &ProvideConfig {
        &self.config
    }

    /// Registry binding into the root container
    pub fn registry(&self) -> ProviderRegistry {
        ProviderRegistry::new(self.root.clone(), self.conditions.clone(), self.config.default_scope)
    }

    /// Factory materializing deferred scopes below the root container
    pub fn scopes(&self) -> ScopeContainerFactory {
        ScopeContainerFactory::new(self.root.clone())
    }

    /// Materialize a deferred scope container from `parent`, or from the root
    pub fn materialize(&self, parent: Option<&Container>) -> ProvideResult<Container> {
        self.scopes().materialize(parent)
    }

    /// Remove every binding of the root container, the deferred scope store
    /// included, keeping only the root's reference to itself
    ///
    /// Containers materialized before the reset keep their own bindings.
    pub fn reset(&self) -> ProvideResult<()> {
        let removed = self.root.binding_count()?;
        self.root.unbind_all()?;
        self.root
            .bind(ContainerKeys::container(), BindingTarget::SelfReference)?;
        tracing::info!(
            "Reset root container {} ({} bindings removed)",
            self.root.id(),
            removed
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixedEnvironment;
    use crate::container::Token;
    use crate::errors::ProvideError;
    use crate::provider::{ProvideOptions, ProviderScope};

    fn accessor() -> ContainerAccessor {
        ContainerAccessor::with_environment(ProvideConfig::default(), Arc::new(FixedEnvironment::unset())).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ProvideConfig::new().with_default_scope(ProviderScope::DeferredTransient);
        assert!(matches!(
            ContainerAccessor::new(config),
            Err(ProvideError::Configuration(_))
        ));
    }

    #[test]
    fn test_reset_keeps_self_reference() {
        let accessor = accessor();
        let registry = accessor.registry();
        registry.provide_value("a", 1u8, ProvideOptions::new()).unwrap();
        registry
            .provide_value("b", 2u8, ProvideOptions::new().scope(ProviderScope::Deferred))
            .unwrap();
        assert_eq!(accessor.root().binding_count().unwrap(), 3);

        accessor.reset().unwrap();
        assert_eq!(accessor.root().binding_count().unwrap(), 1);
        assert!(!accessor
            .root()
            .is_bound(&ContainerKeys::deferred_scope_providers())
            .unwrap());

        let root = accessor.root().get_as::<Container>(&ContainerKeys::container()).unwrap();
        assert!(root.ptr_eq(accessor.root()));
    }

    #[test]
    fn test_default_scope_from_config() {
        let config = ProvideConfig::new().with_default_scope(ProviderScope::Transient);
        let accessor = ContainerAccessor::with_environment(config, Arc::new(FixedEnvironment::unset())).unwrap();

        #[derive(Default)]
        struct Worker;
        accessor
            .registry()
            .provide_class::<Worker>("worker", ProvideOptions::new())
            .unwrap();

        let token = Token::provided("worker");
        let a = accessor.root().get_as::<Worker>(&token).unwrap();
        let b = accessor.root().get_as::<Worker>(&token).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
