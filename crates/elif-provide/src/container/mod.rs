#[allow(clippy::module_inception)]
pub mod container;
pub mod tokens;

pub use container::{
    BindingHandle, BindingScope, BindingTarget, Constructor, Container, ContainerOptions, Instance,
};
pub use tokens::{ContainerKeys, Symbol, Token, TypeKey};
