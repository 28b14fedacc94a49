use std::env;

/// Source of the active environment name
///
/// Environment-bound conditions compare against the value returned here.
/// It is read once per registration; a later change does not re-evaluate
/// registrations that already happened.
pub trait EnvironmentSource: Send + Sync {
    /// Current environment name, `None` when unset
    fn current(&self) -> Option<String>;
}

/// Reads the environment name from a process variable
#[derive(Debug, Clone)]
pub struct ProcessEnvironment {
    key: String,
}

impl ProcessEnvironment {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Name of the variable being read
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl EnvironmentSource for ProcessEnvironment {
    fn current(&self) -> Option<String> {
        match env::var(&self.key) {
            Ok(value) => Some(value),
            Err(env::VarError::NotPresent) => None,
            Err(env::VarError::NotUnicode(_)) => {
                tracing::warn!("Environment variable '{}' is not valid unicode", self.key);
                None
            }
        }
    }
}

/// Pinned environment name
#[derive(Debug, Clone, Default)]
pub struct FixedEnvironment(Option<String>);

impl FixedEnvironment {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Some(name.into()))
    }

    /// An environment with no name set
    pub fn unset() -> Self {
        Self(None)
    }
}

impl EnvironmentSource for FixedEnvironment {
    fn current(&self) -> Option<String> {
        self.0.clone()
    }
}
