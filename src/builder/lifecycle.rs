//! Configurer for lifecycle actions.

use crate::builder::error::ConfigurationError;
use crate::core::{Action, ActionResult, Context, EventId, LifecycleEvent, StateId};
use std::collections::HashMap;

/// Binds actions to lifecycle events.
///
/// At most one action is bound per lifecycle event; adding another one for
/// the same event replaces it.
pub struct LifecycleActionConfigurer<'g, S: StateId, E: EventId, O: 'static> {
    actions: &'g mut HashMap<LifecycleEvent, Action<S, E, O>>,
    event: Option<LifecycleEvent>,
    action: Option<Action<S, E, O>>,
}

impl<'g, S: StateId, E: EventId, O: 'static> LifecycleActionConfigurer<'g, S, E, O> {
    pub(crate) fn new(actions: &'g mut HashMap<LifecycleEvent, Action<S, E, O>>) -> Self {
        Self {
            actions,
            event: None,
            action: None,
        }
    }

    pub fn on(&mut self, event: LifecycleEvent) -> &mut Self {
        self.event = Some(event);
        self
    }

    pub fn execute(&mut self, action: Action<S, E, O>) -> &mut Self {
        self.action = Some(action);
        self
    }

    pub fn execute_fn<F>(&mut self, work: F) -> &mut Self
    where
        F: Fn(&mut Context<'_, S, E, O>) -> ActionResult + Send + Sync + 'static,
    {
        self.execute(Action::new(work))
    }

    pub fn add(&mut self) -> Result<(), ConfigurationError> {
        let event = self.event.take();
        let action = self.action.take();

        let event = event.ok_or(ConfigurationError::MissingLifecycleEvent)?;
        let action = action.ok_or(ConfigurationError::MissingLifecycleAction)?;
        if self.actions.insert(event, action).is_some() {
            tracing::debug!(lifecycle = event.name(), "Replacing lifecycle action");
        }
        Ok(())
    }
}
