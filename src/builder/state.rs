//! Configurer for registering states.

use crate::builder::error::ConfigurationError;
use crate::core::{Action, ActionResult, Context, EventId, StateId};
use crate::graph::{StateGraph, StateNode};

/// Registers states one at a time.
///
/// Obtained through [`StateMachineBuilder::states`]. Fields are reset after
/// every [`add`](Self::add), so one configurer registers many states.
///
/// [`StateMachineBuilder::states`]: crate::builder::StateMachineBuilder::states
pub struct StateConfigurer<'g, S: StateId, E: EventId, O: 'static> {
    graph: &'g mut StateGraph<S, E, O>,
    id: Option<S>,
    on_entry: Option<Action<S, E, O>>,
    exit_validator: Option<Action<S, E, O>>,
}

impl<'g, S: StateId, E: EventId, O: 'static> StateConfigurer<'g, S, E, O> {
    pub(crate) fn new(graph: &'g mut StateGraph<S, E, O>) -> Self {
        Self {
            graph,
            id: None,
            on_entry: None,
            exit_validator: None,
        }
    }

    /// Set the state identifier (required).
    pub fn with_id(&mut self, id: S) -> &mut Self {
        self.id = Some(id);
        self
    }

    /// Action run whenever a non-reflexive transition enters this state.
    pub fn on_entry(&mut self, action: Action<S, E, O>) -> &mut Self {
        self.on_entry = Some(action);
        self
    }

    /// Add an on-entry action using a closure.
    pub fn on_entry_fn<F>(&mut self, work: F) -> &mut Self
    where
        F: Fn(&mut Context<'_, S, E, O>) -> ActionResult + Send + Sync + 'static,
    {
        self.on_entry(Action::new(work))
    }

    /// Action run before any event-triggered or automatic transition leaves
    /// this state. A `ValidationError` from it abandons the attempt.
    pub fn exit_validator(&mut self, action: Action<S, E, O>) -> &mut Self {
        self.exit_validator = Some(action);
        self
    }

    /// Add an exit validator using a closure.
    pub fn exit_validator_fn<F>(&mut self, work: F) -> &mut Self
    where
        F: Fn(&mut Context<'_, S, E, O>) -> ActionResult + Send + Sync + 'static,
    {
        self.exit_validator(Action::new(work))
    }

    /// Register the configured state and reset the configurer.
    pub fn add(&mut self) -> Result<(), ConfigurationError> {
        let id = self.id.take();
        let on_entry = self.on_entry.take();
        let exit_validator = self.exit_validator.take();

        let id = id.ok_or(ConfigurationError::MissingStateId)?;
        self.graph.register(StateNode::new(id, on_entry, exit_validator))
    }
}
