use crate::container::{BindingScope, Container, ContainerOptions};
use crate::errors::ProvideResult;
use crate::provider::deferred::DeferredScopeStore;
use crate::provider::registry::bind_provider;

/// Creates deferred scope containers
///
/// Each materialization produces an independent child container holding a
/// binding for every record pending in the deferred store at that moment.
/// The store is read, never drained: a later materialization sees every
/// record registered so far, and children materialized earlier keep the
/// bindings they were created with.
#[derive(Debug, Clone)]
pub struct ScopeContainerFactory {
    root: Container,
}

impl ScopeContainerFactory {
    pub fn new(root: Container) -> Self {
        Self { root }
    }

    /// Materialize a child of `parent`, or of the root when `None`
    ///
    /// The store is looked up through the parent's chain, so a child
    /// materialized from another deferred scope container sees the same
    /// pending records. A record failing to bind fails the whole call.
    pub fn materialize(&self, parent: Option<&Container>) -> ProvideResult<Container> {
        let parent = parent.unwrap_or(&self.root);
        let child = parent.create_child(ContainerOptions::with_default_scope(BindingScope::Singleton));

        let snapshot = match DeferredScopeStore::locate(parent)? {
            Some(store) => store.snapshot()?,
            None => {
                tracing::debug!(
                    "No deferred scope store visible from container {}, materialized empty scope {}",
                    parent.id(),
                    child.id()
                );
                return Ok(child);
            }
        };

        for (_, records) in snapshot.iter() {
            for record in records {
                bind_provider(record, &child)?;
            }
        }

        tracing::info!(
            "Materialized deferred scope container {} from {} ({} identifiers, {} providers)",
            child.id(),
            parent.id(),
            snapshot.iter().count(),
            snapshot.record_count()
        );
        Ok(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixedEnvironment;
    use crate::container::Token;
    use crate::errors::ProvideError;
    use crate::provider::deferred::WriteMode;
    use crate::provider::record::{Provider, ProviderRecord};
    use crate::provider::condition::ConditionEvaluator;
    use crate::provider::registry::{ProvideOptions, ProviderRegistry};
    use crate::provider::scope::ProviderScope;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Session;

    fn setup() -> (ProviderRegistry, ScopeContainerFactory) {
        let root = Container::with_self_reference(ContainerOptions::default());
        let registry = ProviderRegistry::new(
            root.clone(),
            ConditionEvaluator::new(Arc::new(FixedEnvironment::unset())),
            ProviderScope::Singleton,
        );
        (registry, ScopeContainerFactory::new(root))
    }

    #[test]
    fn test_materialize_without_store() {
        let (registry, factory) = setup();
        let child = factory.materialize(None).unwrap();
        assert!(child.parent().unwrap().ptr_eq(registry.root()));
        assert_eq!(child.binding_count().unwrap(), 0);
        assert_eq!(child.options().default_scope, BindingScope::Singleton);
    }

    #[test]
    fn test_materialize_binds_pending_records() {
        let (registry, factory) = setup();
        registry
            .provide_class::<Session>("session", ProvideOptions::new().scope(ProviderScope::DeferredTransient))
            .unwrap();

        let child = factory.materialize(None).unwrap();
        let token = Token::provided("session");
        assert!(child.is_current_bound(&token).unwrap());

        let a = child.get_as::<Session>(&token).unwrap();
        let b = child.get_as::<Session>(&token).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(registry.root().get(&token).unwrap_err().is_missing_binding());
    }

    #[test]
    fn test_materialize_from_nested_scope() {
        let (registry, factory) = setup();
        registry
            .provide_value("request.id", 7u64, ProvideOptions::new().scope(ProviderScope::Deferred))
            .unwrap();

        let outer = factory.materialize(None).unwrap();
        let inner = factory.materialize(Some(&outer)).unwrap();

        assert!(inner.parent().unwrap().ptr_eq(&outer));
        assert!(inner.is_current_bound(&Token::provided("request.id")).unwrap());
        assert_eq!(*inner.get_as::<u64>(&Token::provided("request.id")).unwrap(), 7);
    }

    #[test]
    fn test_unbindable_record_fails_materialization() {
        let (registry, factory) = setup();
        registry
            .provide_class::<Session>("session", ProvideOptions::new().scope(ProviderScope::Deferred))
            .unwrap();

        let store = DeferredScopeStore::ensure(registry.root()).unwrap();
        store
            .write(
                ProviderRecord::new(Token::provided("broken"), Provider::class::<Session>(), ProviderScope::Deferred),
                WriteMode::Append,
            )
            .unwrap();

        let err = factory.materialize(None).unwrap_err();
        assert!(matches!(
            err,
            ProvideError::DeferredBindingNotAllowed {
                scope: ProviderScope::Deferred,
                ..
            }
        ));
        assert!(registry.root().get(&Token::provided("session")).unwrap_err().is_missing_binding());
        assert!(registry.root().get(&Token::provided("broken")).unwrap_err().is_missing_binding());
    }
}
