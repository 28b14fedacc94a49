//! Pending deferred-scope providers
//!
//! Deferred registrations do not touch any container. They are recorded in a
//! [`DeferredScopeStore`] bound into the root container under
//! [`ContainerKeys::deferred_scope_providers`], and are only bound when a
//! deferred scope container is materialized from it.
//!
//! Records are kept per identifier in registration order, and identifiers in
//! first-registration order. Materialization binds them in that order, which
//! is the order multi-injection returns instances in.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::container::{BindingTarget, Container, ContainerKeys, Token};
use crate::errors::{ProvideError, ProvideResult};
use crate::provider::record::ProviderRecord;
use crate::provider::scope::{ProviderKind, ProviderScope};

/// How a record is written into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Keep previous records and add this one after them
    Append,
    /// Discard previous records of the identifier
    Replace,
}

impl WriteMode {
    pub fn from_override(override_existing: bool) -> Self {
        if override_existing {
            WriteMode::Replace
        } else {
            WriteMode::Append
        }
    }
}

#[derive(Default)]
struct StoreEntries {
    order: Vec<Token>,
    records: HashMap<Token, Vec<Arc<ProviderRecord>>>,
}

/// Ordered collection of not-yet-bound provider records
#[derive(Default)]
pub struct DeferredScopeStore {
    entries: RwLock<StoreEntries>,
}

impl DeferredScopeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the store visible from `container`, looking through its ancestors
    pub fn locate(container: &Container) -> ProvideResult<Option<Arc<DeferredScopeStore>>> {
        let key = ContainerKeys::deferred_scope_providers();
        if !container.is_bound(&key)? {
            return Ok(None);
        }
        container.get_as::<DeferredScopeStore>(&key).map(Some)
    }

    /// Get the store bound in `container` itself, binding a new one on first use
    pub fn ensure(container: &Container) -> ProvideResult<Arc<DeferredScopeStore>> {
        let key = ContainerKeys::deferred_scope_providers();
        if container.is_current_bound(&key)? {
            return container.get_as::<DeferredScopeStore>(&key);
        }

        let store = Arc::new(DeferredScopeStore::new());
        container.bind(key, BindingTarget::Constant(store.clone()))?;
        tracing::debug!("Created deferred scope store in container {}", container.id());
        Ok(store)
    }

    /// Write a record under its identifier; returns the identifier's record count
    pub fn write(&self, record: ProviderRecord, mode: WriteMode) -> ProvideResult<usize> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ProvideError::lock_error("deferred_scope_store"))?;
        let StoreEntries { order, records } = &mut *entries;

        let identifier = record.identifier().clone();
        let list = records.entry(identifier.clone()).or_insert_with(|| {
            order.push(identifier.clone());
            Vec::new()
        });
        if mode == WriteMode::Replace {
            list.clear();
        }
        list.push(Arc::new(record));

        tracing::debug!(
            "Deferred provider for {} stored ({:?}), {} pending",
            identifier,
            mode,
            list.len()
        );
        Ok(list.len())
    }

    /// Pending records of one identifier, in registration order
    pub fn records(&self, identifier: &Token) -> ProvideResult<Vec<Arc<ProviderRecord>>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ProvideError::lock_error("deferred_scope_store"))?;
        Ok(entries.records.get(identifier).cloned().unwrap_or_default())
    }

    /// Copy of every pending record, as the store stands now
    pub fn snapshot(&self) -> ProvideResult<DeferredSnapshot> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ProvideError::lock_error("deferred_scope_store"))?;
        let entries = entries
            .order
            .iter()
            .filter_map(|identifier| {
                entries
                    .records
                    .get(identifier)
                    .filter(|records| !records.is_empty())
                    .map(|records| (identifier.clone(), records.clone()))
            })
            .collect();
        Ok(DeferredSnapshot { entries })
    }

    /// Identifiers with pending records, in first-registration order
    pub fn identifiers(&self) -> ProvideResult<Vec<Token>> {
        Ok(self
            .snapshot()?
            .entries
            .into_iter()
            .map(|(identifier, _)| identifier)
            .collect())
    }

    /// Number of identifiers with pending records
    pub fn len(&self) -> ProvideResult<usize> {
        Ok(self.snapshot()?.entries.len())
    }

    pub fn is_empty(&self) -> ProvideResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Serializable description of the pending records
    pub fn summary(&self) -> ProvideResult<Vec<DeferredEntrySummary>> {
        Ok(self
            .snapshot()?
            .iter()
            .map(|(identifier, records)| DeferredEntrySummary {
                identifier: identifier.to_string(),
                records: records
                    .iter()
                    .map(|record| DeferredRecordSummary {
                        kind: record.kind(),
                        scope: record.scope(),
                    })
                    .collect(),
            })
            .collect())
    }
}

impl std::fmt::Debug for DeferredScopeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredScopeStore")
            .field("identifiers", &self.len().ok())
            .finish()
    }
}

/// Pending records captured at one point in time
#[derive(Debug, Clone, Default)]
pub struct DeferredSnapshot {
    entries: Vec<(Token, Vec<Arc<ProviderRecord>>)>,
}

impl DeferredSnapshot {
    pub fn iter(&self) -> impl Iterator<Item = &(Token, Vec<Arc<ProviderRecord>>)> {
        self.entries.iter()
    }

    /// Total number of records
    pub fn record_count(&self) -> usize {
        self.entries.iter().map(|(_, records)| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeferredEntrySummary {
    pub identifier: String,
    pub records: Vec<DeferredRecordSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeferredRecordSummary {
    pub kind: ProviderKind,
    pub scope: ProviderScope,
}
