use std::sync::Arc;

use crate::container::BindingHandle;
use crate::errors::ProvideResult;
use crate::provider::identifier::Identifier;
use crate::provider::record::Provider;
use crate::provider::registry::{ProvideOptions, ProviderRegistry};

/// Hook called with the identifier and the merged options of a registration
pub type ProvideHook = Arc<dyn Fn(&Identifier, &ProvideOptions) + Send + Sync>;

/// Reusable registration options with hooks around each registration
///
/// Options passed to [`ProvidePreset::provide`] take precedence over the
/// preset's own; fields left unset fall back to the preset. The after hook
/// only runs when registration succeeds, whether or not it was skipped by
/// its condition.
#[derive(Clone, Default)]
pub struct ProvidePreset {
    options: ProvideOptions,
    before_provide: Option<ProvideHook>,
    after_provide: Option<ProvideHook>,
}

impl ProvidePreset {
    pub fn new(options: ProvideOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn before_provide<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Identifier, &ProvideOptions) + Send + Sync + 'static,
    {
        self.before_provide = Some(Arc::new(hook));
        self
    }

    pub fn after_provide<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Identifier, &ProvideOptions) + Send + Sync + 'static,
    {
        self.after_provide = Some(Arc::new(hook));
        self
    }

    pub fn options(&self) -> &ProvideOptions {
        &self.options
    }

    /// Register a provider with this preset applied
    pub fn provide(
        &self,
        registry: &ProviderRegistry,
        id: impl Into<Identifier>,
        provider: Provider,
        options: ProvideOptions,
    ) -> ProvideResult<Option<BindingHandle>> {
        let id = id.into();
        let options = options.or_from(&self.options);

        if let Some(hook) = &self.before_provide {
            hook(&id, &options);
        }
        let handle = registry.register(id.clone(), provider, options.clone())?;
        if let Some(hook) = &self.after_provide {
            hook(&id, &options);
        }
        Ok(handle)
    }
}

impl std::fmt::Debug for ProvidePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvidePreset")
            .field("options", &self.options)
            .field("before_provide", &self.before_provide.is_some())
            .field("after_provide", &self.after_provide.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixedEnvironment;
    use crate::container::{Container, ContainerOptions};
    use crate::provider::condition::ConditionEvaluator;
    use crate::provider::scope::ProviderScope;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Job;

    fn registry() -> ProviderRegistry {
        ProviderRegistry::new(
            Container::with_self_reference(ContainerOptions::default()),
            ConditionEvaluator::new(Arc::new(FixedEnvironment::new("worker"))),
            ProviderScope::Singleton,
        )
    }

    #[test]
    fn test_preset_options_apply() {
        let registry = registry();
        let preset = ProvidePreset::new(ProvideOptions::new().scope(ProviderScope::Deferred));

        let handle = preset
            .provide(&registry, "job", Provider::class::<Job>(), ProvideOptions::new())
            .unwrap();
        assert!(handle.is_none());
        assert_eq!(registry.deferred_providers("job").unwrap().len(), 1);
    }

    #[test]
    fn test_call_options_take_precedence() {
        let registry = registry();
        let preset = ProvidePreset::new(ProvideOptions::new().scope(ProviderScope::Deferred).when("worker"));

        let handle = preset
            .provide(
                &registry,
                "job",
                Provider::class::<Job>(),
                ProvideOptions::new().scope(ProviderScope::Transient),
            )
            .unwrap();
        assert!(handle.is_some());
        assert!(registry.deferred_providers("job").unwrap().is_empty());

        let skipped = preset
            .provide(&registry, "other", Provider::class::<Job>(), ProvideOptions::new().when("web"))
            .unwrap();
        assert!(skipped.is_none());
        assert!(registry.deferred_providers("other").unwrap().is_empty());
    }

    #[test]
    fn test_hooks_run_around_registration() {
        let registry = registry();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let preset = ProvidePreset::new(ProvideOptions::new())
            .before_provide({
                let calls = calls.clone();
                move |id: &Identifier, _: &ProvideOptions| calls.lock().unwrap().push(format!("before {}", id))
            })
            .after_provide({
                let calls = calls.clone();
                move |id: &Identifier, options: &ProvideOptions| {
                    calls
                        .lock()
                        .unwrap()
                        .push(format!("after {} {}", id, options.is_override()))
                }
            });

        preset
            .provide(
                &registry,
                "job",
                Provider::class::<Job>(),
                ProvideOptions::new().override_existing(true),
            )
            .unwrap();
        assert!(preset
            .provide(&registry, "", Provider::class::<Job>(), ProvideOptions::new())
            .is_err());

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "before \"job\"".to_string(),
                "after \"job\" true".to_string(),
                "before \"\"".to_string(),
            ]
        );
    }
}
