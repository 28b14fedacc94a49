use std::sync::Arc;

use crate::config::{EnvironmentSource, ProcessEnvironment, ProvideConfig};

/// Condition deciding whether a registration takes place
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Condition {
    #[default]
    Always,
    Never,
    /// Only when the active environment name equals the given one
    WhenEnvironmentEquals(String),
}

impl Condition {
    pub fn when_env(name: impl Into<String>) -> Self {
        Condition::WhenEnvironmentEquals(name.into())
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        if value {
            Condition::Always
        } else {
            Condition::Never
        }
    }
}

impl From<&str> for Condition {
    fn from(environment: &str) -> Self {
        Condition::WhenEnvironmentEquals(environment.to_string())
    }
}

impl From<String> for Condition {
    fn from(environment: String) -> Self {
        Condition::WhenEnvironmentEquals(environment)
    }
}

/// Evaluates registration conditions against an environment source
#[derive(Clone)]
pub struct ConditionEvaluator {
    environment: Arc<dyn EnvironmentSource>,
}

impl ConditionEvaluator {
    pub fn new(environment: Arc<dyn EnvironmentSource>) -> Self {
        Self { environment }
    }

    /// Read the environment from the process variable named in `config`
    pub fn from_config(config: &ProvideConfig) -> Self {
        Self::new(Arc::new(ProcessEnvironment::new(config.environment_key.clone())))
    }

    /// Check whether a registration with this condition should be bound
    ///
    /// An absent condition always binds. An environment condition never
    /// matches when no environment name is set.
    pub fn should_bind(&self, condition: Option<&Condition>) -> bool {
        match condition {
            None | Some(Condition::Always) => true,
            Some(Condition::Never) => false,
            Some(Condition::WhenEnvironmentEquals(expected)) => {
                self.environment.current().as_deref() == Some(expected.as_str())
            }
        }
    }
}

impl std::fmt::Debug for ConditionEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionEvaluator")
            .field("environment", &self.environment.current())
            .finish()
    }
}
