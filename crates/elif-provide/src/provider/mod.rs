pub mod condition;
pub mod deferred;
pub mod identifier;
pub mod materializer;
pub mod preset;
pub mod record;
pub mod registry;
pub mod scope;

pub use condition::{Condition, ConditionEvaluator};
pub use deferred::{
    DeferredEntrySummary, DeferredRecordSummary, DeferredScopeStore, DeferredSnapshot, WriteMode,
};
pub use identifier::{Identifier, IdentifierResolver};
pub use materializer::ScopeContainerFactory;
pub use preset::{ProvideHook, ProvidePreset};
pub use record::{Provider, ProviderRecord, Registration};
pub use registry::{bind_provider, ProvideOptions, ProviderRegistry};
pub use scope::{ProviderKind, ProviderScope};
