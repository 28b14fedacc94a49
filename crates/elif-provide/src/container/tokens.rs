//! Container keys
//!
//! A [`Token`] is what the container actually stores bindings under. Three
//! kinds exist and never compare equal to each other:
//!
//! - [`TypeKey`]: a Rust type, compared by `TypeId`
//! - [`Symbol`]: a unique symbolic token, compared by identity
//! - a name token, holding a string key
//!
//! Name tokens produced by provider registration always carry the
//! `Provide<...>` wrapping (see [`Token::provided`]), so they cannot collide
//! with plain name keys used by unrelated container code.

use once_cell::sync::Lazy;
use std::any::TypeId;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Key for a Rust type
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeKey {
    /// Create the key of a type
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

static SHARED_SYMBOLS: Lazy<Mutex<HashMap<String, Symbol>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Unique symbolic token
///
/// Every call to [`Symbol::new`] yields a token distinct from all others,
/// even with an identical description. [`Symbol::for_key`] looks the key up
/// in a process-wide table instead and returns the same token for the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    id: u64,
    description: Arc<str>,
}

impl Symbol {
    /// Create a new unique symbol
    pub fn new(description: impl AsRef<str>) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: Arc::from(description.as_ref()),
        }
    }

    /// Get the shared symbol registered under `key`, creating it on first use
    pub fn for_key(key: &str) -> Self {
        // The table only ever grows, so a poisoned guard still holds valid data
        let mut shared = SHARED_SYMBOLS
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        shared
            .entry(key.to_string())
            .or_insert_with(|| Symbol::new(key))
            .clone()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

/// Key of a binding inside a container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Type(TypeKey),
    Symbol(Symbol),
    Name(Arc<str>),
}

impl Token {
    /// Token of a Rust type
    pub fn of<T: ?Sized + 'static>() -> Self {
        Token::Type(TypeKey::of::<T>())
    }

    /// Name token reserved for provider registrations: `Provide<name>`
    pub fn provided(name: &str) -> Self {
        Token::Name(Arc::from(format!("Provide<{}>", name)))
    }

    /// Check whether this is a name token
    pub fn is_name(&self) -> bool {
        matches!(self, Token::Name(_))
    }
}

impl From<TypeKey> for Token {
    fn from(key: TypeKey) -> Self {
        Token::Type(key)
    }
}

impl From<Symbol> for Token {
    fn from(symbol: Symbol) -> Self {
        Token::Symbol(symbol)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Type(key) => f.write_str(key.type_name()),
            Token::Symbol(symbol) => write!(f, "{}", symbol),
            Token::Name(name) => f.write_str(name),
        }
    }
}

static CONTAINER_KEY: Lazy<Symbol> = Lazy::new(|| Symbol::new("elif-provide.ContainerKeys.Container"));

static DEFERRED_SCOPE_PROVIDERS_KEY: Lazy<Symbol> =
    Lazy::new(|| Symbol::new("elif-provide.ContainerKeys.DeferredScopeProviders"));

/// Reserved keys the engine binds into containers
pub struct ContainerKeys;

impl ContainerKeys {
    /// Key resolving to the container that owns the binding
    pub fn container() -> Token {
        Token::Symbol(CONTAINER_KEY.clone())
    }

    /// Key of the pending deferred-scope provider store
    pub fn deferred_scope_providers() -> Token {
        Token::Symbol(DEFERRED_SCOPE_PROVIDERS_KEY.clone())
    }
}
