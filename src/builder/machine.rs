//! Builder for constructing state machines.

use crate::builder::error::ConfigurationError;
use crate::builder::lifecycle::LifecycleActionConfigurer;
use crate::builder::state::StateConfigurer;
use crate::builder::transition::TransitionConfigurer;
use crate::core::{Action, EventId, LifecycleEvent, StateId};
use crate::engine::StateMachine;
use crate::graph::StateGraph;
use crate::transaction::{NoTransaction, TransactionBoundary};
use std::collections::HashMap;
use std::sync::Arc;

/// Builder for constructing state machines with a fluent API.
///
/// The initial and final states are registered when the builder is created.
/// States must be registered before transitions refer to them.
///
/// # Example
///
/// ```rust
/// use statework::builder::StateMachineBuilder;
/// use statework::core::LifecycleEvent;
/// use statework::{event_enum, state_enum};
///
/// state_enum! {
///     enum Door { Installed, Closed, Open, Removed }
/// }
/// event_enum! {
///     enum Handle { Push, Pull }
/// }
///
/// struct Frame { door: Door }
///
/// let machine = StateMachineBuilder::new(Door::Installed, Door::Removed, |f: &Frame| f.door)
///     .states(|s| {
///         s.with_id(Door::Closed).add()?;
///         s.with_id(Door::Open).add()
///     })?
///     .transitions(|t| {
///         t.from_initial().to(Door::Closed).add()?;
///         t.from([Door::Closed]).to(Door::Open).on_event(Handle::Push).add()?;
///         t.from([Door::Open]).to(Door::Closed).on_event(Handle::Pull).add()
///     })?
///     .lifecycle_actions(|l| {
///         l.on(LifecycleEvent::SuccessfulStateChange)
///             .execute_fn(|ctx| {
///                 if let Some(change) = ctx.state_change().cloned() {
///                     ctx.subject_mut().door = change.to;
///                 }
///                 Ok(())
///             })
///             .add()
///     })?
///     .build()?;
///
/// let mut frame = Frame { door: Door::Installed };
/// machine.proceed(&mut frame)?;
/// assert_eq!(frame.door, Door::Closed);
///
/// machine.send_event(&Handle::Push, &mut frame, None)?;
/// assert_eq!(frame.door, Door::Open);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct StateMachineBuilder<S: StateId, E: EventId, O: 'static> {
    graph: StateGraph<S, E, O>,
    lifecycle_actions: HashMap<LifecycleEvent, Action<S, E, O>>,
    transactions: Arc<dyn TransactionBoundary>,
    current_state: Arc<dyn Fn(&O) -> S + Send + Sync>,
}

impl<S: StateId, E: EventId, O: 'static> StateMachineBuilder<S, E, O> {
    /// Create a builder.
    ///
    /// `current_state` reads the subject's state; it must be side-effect free.
    pub fn new<F>(initial: S, final_state: S, current_state: F) -> Self
    where
        F: Fn(&O) -> S + Send + Sync + 'static,
    {
        Self {
            graph: StateGraph::new(initial, final_state),
            lifecycle_actions: HashMap::new(),
            transactions: Arc::new(NoTransaction),
            current_state: Arc::new(current_state),
        }
    }

    /// Register states. Stops at the first configuration error.
    pub fn states<F>(mut self, configure: F) -> Result<Self, ConfigurationError>
    where
        F: FnOnce(&mut StateConfigurer<'_, S, E, O>) -> Result<(), ConfigurationError>,
    {
        configure(&mut StateConfigurer::new(&mut self.graph))?;
        Ok(self)
    }

    /// Add transitions between registered states.
    pub fn transitions<F>(mut self, configure: F) -> Result<Self, ConfigurationError>
    where
        F: FnOnce(&mut TransitionConfigurer<'_, S, E, O>) -> Result<(), ConfigurationError>,
    {
        configure(&mut TransitionConfigurer::new(&mut self.graph))?;
        Ok(self)
    }

    /// Bind actions to lifecycle events.
    pub fn lifecycle_actions<F>(mut self, configure: F) -> Result<Self, ConfigurationError>
    where
        F: FnOnce(&mut LifecycleActionConfigurer<'_, S, E, O>) -> Result<(), ConfigurationError>,
    {
        configure(&mut LifecycleActionConfigurer::new(&mut self.lifecycle_actions))?;
        Ok(self)
    }

    /// Use a transaction boundary. Defaults to [`NoTransaction`].
    pub fn transactions(mut self, boundary: impl TransactionBoundary + 'static) -> Self {
        self.transactions = Arc::new(boundary);
        self
    }

    pub(crate) fn graph_mut(&mut self) -> &mut StateGraph<S, E, O> {
        &mut self.graph
    }

    pub(crate) fn lifecycle_actions_mut(&mut self) -> &mut HashMap<LifecycleEvent, Action<S, E, O>> {
        &mut self.lifecycle_actions
    }

    /// Build the state machine.
    pub fn build(self) -> Result<StateMachine<S, E, O>, ConfigurationError> {
        if self.graph.initial() == self.graph.final_state() {
            return Err(ConfigurationError::InitialIsFinal(
                self.graph.initial().name().to_string(),
            ));
        }

        tracing::debug!(
            states = self.graph.len(),
            lifecycle_actions = self.lifecycle_actions.len(),
            "State machine built"
        );
        Ok(StateMachine::new(
            self.graph,
            self.lifecycle_actions,
            self.transactions,
            self.current_state,
        ))
    }
}
