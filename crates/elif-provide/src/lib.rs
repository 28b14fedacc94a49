//! # elif-provide
//!
//! Provider registration for the elif.rs container: typed, symbolic and
//! named identifiers, conditional and overriding registrations, and
//! deferred scopes whose providers are declared up front and only bound
//! once a scope container is materialized for them.
//!
//! ```
//! use elif_provide::{ContainerAccessor, ProvideConfig, ProvideOptions, ProviderScope};
//!
//! #[derive(Default)]
//! struct RequestContext;
//!
//! let accessor = ContainerAccessor::new(ProvideConfig::default())?;
//! accessor.registry().provide_class::<RequestContext>(
//!     "request",
//!     ProvideOptions::new().scope(ProviderScope::Deferred),
//! )?;
//!
//! let scope = accessor.materialize(None)?;
//! let context = accessor.registry().get_dependency::<RequestContext>("request", Some(&scope))?;
//! # let _ = context;
//! # Ok::<(), elif_provide::ProvideError>(())
//! ```

pub mod accessor;
pub mod config;
pub mod container;
pub mod errors;
pub mod provider;

pub use accessor::ContainerAccessor;
pub use config::{ConfigError, EnvironmentSource, FixedEnvironment, ProcessEnvironment, ProvideConfig};
pub use container::{BindingHandle, BindingScope, BindingTarget, Container, ContainerKeys, ContainerOptions, Symbol, Token};
pub use errors::{ProvideError, ProvideResult};
pub use provider::{
    bind_provider, Condition, DeferredScopeStore, Identifier, Provider, ProvideOptions, ProvidePreset,
    ProviderKind, ProviderRecord, ProviderRegistry, ProviderScope, ScopeContainerFactory, WriteMode,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
