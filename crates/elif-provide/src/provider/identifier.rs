//! Dependency identifiers and their canonical container keys

use crate::container::{Symbol, Token, TypeKey};
use crate::errors::{ProvideError, ProvideResult};

/// Identifier a provider is registered or requested under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// A Rust type
    Type(TypeKey),
    /// A unique symbolic token
    Symbol(Symbol),
    /// A plain name
    Name(String),
}

impl Identifier {
    /// Identifier of a type
    pub fn of<T: ?Sized + 'static>() -> Self {
        Identifier::Type(TypeKey::of::<T>())
    }

    /// Identifier from a name
    pub fn name(name: impl Into<String>) -> Self {
        Identifier::Name(name.into())
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::Name(name.to_string())
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Identifier::Name(name)
    }
}

impl From<Symbol> for Identifier {
    fn from(symbol: Symbol) -> Self {
        Identifier::Symbol(symbol)
    }
}

impl From<TypeKey> for Identifier {
    fn from(key: TypeKey) -> Self {
        Identifier::Type(key)
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identifier::Type(key) => f.write_str(key.type_name()),
            Identifier::Symbol(symbol) => write!(f, "{}", symbol),
            Identifier::Name(name) => write!(f, "\"{}\"", name),
        }
    }
}

/// Turns identifiers into container keys
pub struct IdentifierResolver;

impl IdentifierResolver {
    /// Resolve an identifier into the token used as container key
    ///
    /// Types and symbols are used as is. A name becomes `Provide<name>`, so
    /// registrations never collide with plain name keys bound by other code.
    /// Empty names are rejected.
    pub fn resolve(identifier: &Identifier) -> ProvideResult<Token> {
        match identifier {
            Identifier::Type(key) => Ok(Token::Type(*key)),
            Identifier::Symbol(symbol) => Ok(Token::Symbol(symbol.clone())),
            Identifier::Name(name) if name.is_empty() => {
                Err(ProvideError::invalid_identifier("the name is empty"))
            }
            Identifier::Name(name) => Ok(Token::provided(name)),
        }
    }
}
