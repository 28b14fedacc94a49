use once_cell::sync::OnceCell;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};
use uuid::Uuid;

use crate::container::tokens::{ContainerKeys, Token};
use crate::errors::{ProvideError, ProvideResult};

/// A resolved instance
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Constructor building a new instance, given the container resolving it
pub type Constructor = Arc<dyn Fn(&Container) -> ProvideResult<Instance> + Send + Sync>;

/// Instance sharing policy of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BindingScope {
    /// One instance per binding, created on first resolution
    #[default]
    Singleton,
    /// A new instance on every resolution
    Transient,
}

/// What a binding resolves to
#[derive(Clone)]
pub enum BindingTarget {
    /// Built by a constructor, shared or not depending on the binding scope
    Constructor(Constructor),
    /// A constant; always the same instance regardless of scope
    Constant(Instance),
    /// The container owning the binding
    SelfReference,
}

impl std::fmt::Debug for BindingTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingTarget::Constructor(_) => write!(f, "Constructor(<constructor_fn>)"),
            BindingTarget::Constant(_) => write!(f, "Constant(<instance>)"),
            BindingTarget::SelfReference => write!(f, "SelfReference"),
        }
    }
}

/// Options for creating a container
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerOptions {
    /// Scope given to new bindings until changed through their handle
    pub default_scope: BindingScope,
}

impl ContainerOptions {
    pub fn with_default_scope(default_scope: BindingScope) -> Self {
        Self { default_scope }
    }
}

struct Binding {
    token: Token,
    target: BindingTarget,
    scope: RwLock<BindingScope>,
    cache: OnceCell<Instance>,
}

impl Binding {
    fn scope(&self) -> ProvideResult<BindingScope> {
        self.scope
            .read()
            .map(|scope| *scope)
            .map_err(|_| ProvideError::lock_error("binding_scope"))
    }

    fn set_scope(&self, scope: BindingScope) -> ProvideResult<()> {
        let mut current = self
            .scope
            .write()
            .map_err(|_| ProvideError::lock_error("binding_scope"))?;
        *current = scope;
        Ok(())
    }

    /// `owner` holds the binding, `requester` is where resolution started
    ///
    /// Constructors always resolve their dependencies from `requester`. A
    /// singleton bound in a parent but first resolved from a child is built
    /// against the child's bindings and then cached on the parent's binding,
    /// so later resolutions from any container share that instance.
    fn resolve(&self, owner: &Container, requester: &Container) -> ProvideResult<Instance> {
        match &self.target {
            BindingTarget::Constant(instance) => Ok(instance.clone()),
            BindingTarget::SelfReference => Ok(Arc::new(owner.clone()) as Instance),
            BindingTarget::Constructor(constructor) => match self.scope()? {
                BindingScope::Singleton => self
                    .cache
                    .get_or_try_init(|| constructor(requester))
                    .map(Arc::clone),
                BindingScope::Transient => constructor(requester),
            },
        }
    }
}

/// Handle on a just-created binding
///
/// Used to apply the scope modifiers after binding, the same way a fluent
/// binding chain would.
#[derive(Clone)]
pub struct BindingHandle {
    binding: Arc<Binding>,
}

impl BindingHandle {
    pub fn token(&self) -> &Token {
        &self.binding.token
    }

    pub fn scope(&self) -> ProvideResult<BindingScope> {
        self.binding.scope()
    }

    /// Check whether the binding is a constant
    pub fn is_constant(&self) -> bool {
        matches!(self.binding.target, BindingTarget::Constant(_))
    }

    /// Share one instance across all resolutions
    pub fn in_singleton_scope(&self) -> ProvideResult<&Self> {
        self.binding.set_scope(BindingScope::Singleton)?;
        Ok(self)
    }

    /// Create a new instance on every resolution
    pub fn in_transient_scope(&self) -> ProvideResult<&Self> {
        self.binding.set_scope(BindingScope::Transient)?;
        Ok(self)
    }
}

impl std::fmt::Debug for BindingHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingHandle")
            .field("token", &self.binding.token)
            .field("target", &self.binding.target)
            .field("scope", &self.binding.scope().ok())
            .finish()
    }
}

struct ContainerInner {
    id: Uuid,
    options: ContainerOptions,
    parent: Option<Weak<ContainerInner>>,
    bindings: RwLock<HashMap<Token, Vec<Arc<Binding>>>>,
}

/// Binding table with instance caching and parent fallback
///
/// This is a shared handle: clones refer to the same container. A child
/// only keeps a weak reference to its parent; the caller owns both.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    /// Create a new, empty container
    pub fn new(options: ContainerOptions) -> Self {
        Self::with_bindings(options, None, HashMap::new())
    }

    /// Create a container whose `ContainerKeys::container()` key resolves to itself
    pub fn with_self_reference(options: ContainerOptions) -> Self {
        let token = ContainerKeys::container();
        let mut bindings = HashMap::new();
        bindings.insert(
            token.clone(),
            vec![Arc::new(Binding {
                token,
                target: BindingTarget::SelfReference,
                scope: RwLock::new(options.default_scope),
                cache: OnceCell::new(),
            })],
        );
        Self::with_bindings(options, None, bindings)
    }

    fn with_bindings(
        options: ContainerOptions,
        parent: Option<Weak<ContainerInner>>,
        bindings: HashMap<Token, Vec<Arc<Binding>>>,
    ) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                id: Uuid::new_v4(),
                options,
                parent,
                bindings: RwLock::new(bindings),
            }),
        }
    }

    /// Get the container ID
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn options(&self) -> ContainerOptions {
        self.inner.options
    }

    /// Parent container, if this is a child and the parent is still alive
    pub fn parent(&self) -> Option<Container> {
        self.inner
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Container { inner })
    }

    /// Create a child container falling back to this one for resolution
    pub fn create_child(&self, options: ContainerOptions) -> Container {
        let child = Self::with_bindings(options, Some(Arc::downgrade(&self.inner)), HashMap::new());
        tracing::trace!("Created child container {} of {}", child.id(), self.id());
        child
    }

    /// Check whether two handles refer to the same container
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Add a binding; existing bindings for the token are kept
    pub fn bind(&self, token: Token, target: BindingTarget) -> ProvideResult<BindingHandle> {
        let binding = Arc::new(Binding {
            token: token.clone(),
            target,
            scope: RwLock::new(self.inner.options.default_scope),
            cache: OnceCell::new(),
        });

        let mut bindings = self
            .inner
            .bindings
            .write()
            .map_err(|_| ProvideError::lock_error("container_bindings"))?;
        bindings.entry(token).or_default().push(binding.clone());

        tracing::trace!("Bound {} in container {}", binding.token, self.id());
        Ok(BindingHandle { binding })
    }

    /// Remove every binding of `token` held by this container
    pub fn unbind(&self, token: &Token) -> ProvideResult<()> {
        let mut bindings = self
            .inner
            .bindings
            .write()
            .map_err(|_| ProvideError::lock_error("container_bindings"))?;
        match bindings.remove(token) {
            Some(_) => {
                tracing::trace!("Unbound {} from container {}", token, self.id());
                Ok(())
            }
            None => Err(ProvideError::missing_binding(token)),
        }
    }

    /// Remove every binding held by this container
    pub fn unbind_all(&self) -> ProvideResult<()> {
        let mut bindings = self
            .inner
            .bindings
            .write()
            .map_err(|_| ProvideError::lock_error("container_bindings"))?;
        bindings.clear();
        Ok(())
    }

    /// Check whether `token` is bound here or in an ancestor
    pub fn is_bound(&self, token: &Token) -> ProvideResult<bool> {
        if self.is_current_bound(token)? {
            return Ok(true);
        }
        match self.parent() {
            Some(parent) => parent.is_bound(token),
            None => Ok(false),
        }
    }

    /// Check whether `token` is bound in this container itself
    pub fn is_current_bound(&self, token: &Token) -> ProvideResult<bool> {
        Ok(!self.current_bindings(token)?.is_empty())
    }

    /// Number of bindings held by this container
    pub fn binding_count(&self) -> ProvideResult<usize> {
        let bindings = self
            .inner
            .bindings
            .read()
            .map_err(|_| ProvideError::lock_error("container_bindings"))?;
        Ok(bindings.values().map(Vec::len).sum())
    }

    fn current_bindings(&self, token: &Token) -> ProvideResult<Vec<Arc<Binding>>> {
        let bindings = self
            .inner
            .bindings
            .read()
            .map_err(|_| ProvideError::lock_error("container_bindings"))?;
        Ok(bindings.get(token).cloned().unwrap_or_default())
    }

    /// Walk up from this container to the first one holding bindings for `token`
    fn owning_bindings(&self, token: &Token) -> ProvideResult<Option<(Container, Vec<Arc<Binding>>)>> {
        let mut current = Some(self.clone());
        while let Some(container) = current {
            let bindings = container.current_bindings(token)?;
            if !bindings.is_empty() {
                return Ok(Some((container, bindings)));
            }
            current = container.parent();
        }
        Ok(None)
    }

    /// Resolve the single instance bound to `token`
    pub fn get(&self, token: &Token) -> ProvideResult<Instance> {
        let (owner, bindings) = self
            .owning_bindings(token)?
            .ok_or_else(|| ProvideError::missing_binding(token))?;

        if bindings.len() > 1 {
            return Err(ProvideError::AmbiguousBinding {
                identifier: token.to_string(),
                count: bindings.len(),
            });
        }

        tracing::trace!("Resolving {} from container {}", token, self.id());
        bindings[0].resolve(&owner, self)
    }

    /// Resolve the instance bound to `token` as a `T`
    pub fn get_as<T: Send + Sync + 'static>(&self, token: &Token) -> ProvideResult<Arc<T>> {
        downcast(token, self.get(token)?)
    }

    /// Resolve `token`, or `None` when nothing is bound to it
    pub fn try_get(&self, token: &Token) -> ProvideResult<Option<Instance>> {
        match self.get(token) {
            Ok(instance) => Ok(Some(instance)),
            Err(ProvideError::MissingBinding { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Resolve every instance bound to `token`, in binding order
    pub fn get_all(&self, token: &Token) -> ProvideResult<Vec<Instance>> {
        let (owner, bindings) = self
            .owning_bindings(token)?
            .ok_or_else(|| ProvideError::missing_binding(token))?;

        bindings
            .iter()
            .map(|binding| binding.resolve(&owner, self))
            .collect()
    }

    /// Resolve every instance bound to `token` as a `T`
    pub fn get_all_as<T: Send + Sync + 'static>(&self, token: &Token) -> ProvideResult<Vec<Arc<T>>> {
        self.get_all(token)?
            .into_iter()
            .map(|instance| downcast(token, instance))
            .collect()
    }
}

fn downcast<T: Send + Sync + 'static>(token: &Token, instance: Instance) -> ProvideResult<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| ProvideError::TypeMismatch {
            identifier: token.to_string(),
            expected: std::any::type_name::<T>(),
        })
}

impl Default for Container {
    fn default() -> Self {
        Self::new(ContainerOptions::default())
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.inner.id)
            .field("default_scope", &self.inner.options.default_scope)
            .field("bindings", &self.binding_count().ok())
            .field("parent", &self.parent().map(|parent| parent.id()))
            .finish()
    }
}
