//! Named callbacks for declarative definitions.

use crate::builder::ConfigurationError;
use crate::core::{Action, ActionResult, Context, EventId, Guard, StateId};
use crate::graph::ErrorMatcher;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

/// Maps names used in a [`MachineDefinition`] to resolved callbacks.
///
/// Names are resolved once, while the definition is applied to a builder.
///
/// [`MachineDefinition`]: crate::definition::MachineDefinition
pub struct CallbackRegistry<S: StateId, E: EventId, O: 'static> {
    actions: HashMap<String, Action<S, E, O>>,
    guards: HashMap<String, Guard<S, E, O>>,
    error_matchers: HashMap<String, ErrorMatcher>,
}

impl<S: StateId, E: EventId, O: 'static> CallbackRegistry<S, E, O> {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
            guards: HashMap::new(),
            error_matchers: HashMap::new(),
        }
    }

    pub fn with_action(mut self, name: impl Into<String>, action: Action<S, E, O>) -> Self {
        self.actions.insert(name.into(), action);
        self
    }

    /// Register a closure as a named action.
    pub fn with_action_fn<F>(self, name: impl Into<String>, work: F) -> Self
    where
        F: Fn(&mut Context<'_, S, E, O>) -> ActionResult + Send + Sync + 'static,
    {
        self.with_action(name, Action::new(work))
    }

    pub fn with_guard(mut self, name: impl Into<String>, guard: Guard<S, E, O>) -> Self {
        self.guards.insert(name.into(), guard);
        self
    }

    /// Register a closure as a named guard.
    pub fn with_guard_fn<F>(self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Context<'_, S, E, O>) -> bool + Send + Sync + 'static,
    {
        self.with_guard(name, Guard::new(predicate))
    }

    /// Register a matcher for failures of type `T`.
    pub fn with_error<T: StdError + 'static>(self, name: impl Into<String>) -> Self {
        self.with_error_matcher(name, ErrorMatcher::of::<T>())
    }

    pub fn with_error_matcher(mut self, name: impl Into<String>, matcher: ErrorMatcher) -> Self {
        self.error_matchers.insert(name.into(), matcher);
        self
    }

    pub fn action(&self, name: &str) -> Result<&Action<S, E, O>, ConfigurationError> {
        lookup(&self.actions, "action", name)
    }

    pub fn guard(&self, name: &str) -> Result<&Guard<S, E, O>, ConfigurationError> {
        lookup(&self.guards, "guard", name)
    }

    pub fn error_matcher(&self, name: &str) -> Result<&ErrorMatcher, ConfigurationError> {
        lookup(&self.error_matchers, "error matcher", name)
    }
}

fn lookup<'r, T>(
    entries: &'r HashMap<String, T>,
    kind: &'static str,
    name: &str,
) -> Result<&'r T, ConfigurationError> {
    entries.get(name).ok_or_else(|| ConfigurationError::UnknownCallback {
        kind,
        name: name.to_string(),
    })
}

impl<S: StateId, E: EventId, O: 'static> Default for CallbackRegistry<S, E, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateId, E: EventId, O: 'static> fmt::Debug for CallbackRegistry<S, E, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<_> = self.actions.keys().collect();
        let mut guards: Vec<_> = self.guards.keys().collect();
        let mut error_matchers: Vec<_> = self.error_matchers.keys().collect();
        actions.sort();
        guards.sort();
        error_matchers.sort();
        f.debug_struct("CallbackRegistry")
            .field("actions", &actions)
            .field("guards", &guards)
            .field("error_matchers", &error_matchers)
            .finish()
    }
}
