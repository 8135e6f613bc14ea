//! Transition resolution and execution.

use crate::builder::ConfigurationError;
use crate::core::{
    Action, ActionError, BoxError, Context, EventId, LifecycleEvent, Payload, ProcessingError,
    StateChange, StateId,
};
use crate::engine::error::EngineError;
use crate::graph::{StateGraph, Transition};
use crate::transaction::TransactionBoundary;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Reads the current state of a subject.
pub type StateAccessor<S, O> = Arc<dyn Fn(&O) -> S + Send + Sync>;

/// An immutable, shareable state machine.
///
/// Built by [`StateMachineBuilder`](crate::builder::StateMachineBuilder).
/// Every call runs to completion synchronously, including chained automatic
/// transitions and error recovery. Only configuration defects are returned
/// as errors; callback failures are routed to error transitions or to the
/// `ProcessingError` lifecycle action.
///
/// The machine never writes the subject's state. Transition actions or the
/// `SuccessfulStateChange` lifecycle action do that.
pub struct StateMachine<S: StateId, E: EventId, O: 'static> {
    graph: StateGraph<S, E, O>,
    lifecycle_actions: HashMap<LifecycleEvent, Action<S, E, O>>,
    transactions: Arc<dyn TransactionBoundary>,
    current_state: StateAccessor<S, O>,
}

/// One round of the resolution protocol: candidates out of `source`.
struct Attempt<'m, S: StateId, E: EventId, O: 'static> {
    source: S,
    candidates: Vec<&'m Transition<S, E, O>>,
    recovering: bool,
}

enum Outcome<S> {
    /// A transition fired and ended in this state
    Moved(S),
    /// Nothing fired
    Stopped,
}

enum Failure {
    Configuration(ConfigurationError),
    Technical(BoxError),
}

impl From<ConfigurationError> for Failure {
    fn from(error: ConfigurationError) -> Self {
        Failure::Configuration(error)
    }
}

impl From<ActionError> for Failure {
    fn from(error: ActionError) -> Self {
        Failure::Technical(error.into_boxed())
    }
}

impl<S: StateId, E: EventId, O: 'static> StateMachine<S, E, O> {
    pub(crate) fn new(
        graph: StateGraph<S, E, O>,
        lifecycle_actions: HashMap<LifecycleEvent, Action<S, E, O>>,
        transactions: Arc<dyn TransactionBoundary>,
        current_state: StateAccessor<S, O>,
    ) -> Self {
        Self {
            graph,
            lifecycle_actions,
            transactions,
            current_state,
        }
    }

    /// Send an event to a subject.
    pub fn send_event(
        &self,
        event: &E,
        subject: &mut O,
        payload: Option<Payload>,
    ) -> Result<(), EngineError> {
        let mut context = Context::new(subject);
        self.send_event_in(&mut context, event, payload)
    }

    /// Send an event using a caller-supplied context.
    ///
    /// The context's lifecycle data is empty when this returns.
    pub fn send_event_in(
        &self,
        context: &mut Context<'_, S, E, O>,
        event: &E,
        payload: Option<Payload>,
    ) -> Result<(), EngineError> {
        let span = tracing::info_span!(
            "send_event",
            call_id = %context.call_id(),
            event = event.name()
        );
        let _guard = span.enter();

        self.transactions.create_transaction();
        let result = self.dispatch_event(context, event, payload);
        self.transactions.close_transaction(false);
        context.clear_data();

        result.map_err(EngineError::from)
    }

    /// Send an event identified by name.
    pub fn send_event_by_name(
        &self,
        name: &str,
        subject: &mut O,
        payload: Option<Payload>,
    ) -> Result<(), EngineError> {
        let event = self
            .event_from_name(name)
            .ok_or_else(|| EngineError::UnresolvedName {
                kind: "event",
                name: name.to_string(),
            })?;
        self.send_event(&event, subject, payload)
    }

    /// Fire an automatic transition from the subject's current state, if any.
    ///
    /// Used to resume a chain that was interrupted out of band.
    pub fn proceed(&self, subject: &mut O) -> Result<(), EngineError> {
        let mut context = Context::new(subject);
        self.proceed_in(&mut context)
    }

    pub fn proceed_in(&self, context: &mut Context<'_, S, E, O>) -> Result<(), EngineError> {
        let span = tracing::info_span!("proceed", call_id = %context.call_id());
        let _guard = span.enter();

        let result = self.current_state(context).and_then(|source| {
            let candidates = self.graph.require(&source)?.automatic_transitions().collect();
            self.resolve(context, Attempt {
                source,
                candidates,
                recovering: false,
            })
        });
        context.clear_data();

        result.map_err(EngineError::from)
    }

    /// Events with a transition out of `state`. Empty for unregistered states.
    pub fn possible_events_for_state(&self, state: &S) -> Vec<E> {
        self.graph
            .node(state)
            .map(|node| node.possible_events())
            .unwrap_or_default()
    }

    pub fn has_automatic_transitions(&self, state: &S) -> Result<bool, EngineError> {
        Ok(self.graph.require(state)?.has_automatic_transitions())
    }

    pub fn states(&self) -> impl Iterator<Item = &S> + '_ {
        self.graph.states()
    }

    pub fn initial_state(&self) -> &S {
        self.graph.initial()
    }

    pub fn final_state(&self) -> &S {
        self.graph.final_state()
    }

    pub fn state_from_name(&self, name: &str) -> Option<&S> {
        self.graph.state_from_name(name)
    }

    pub fn event_from_name(&self, name: &str) -> Option<E> {
        self.graph.event_from_name(name)
    }

    pub fn graph(&self) -> &StateGraph<S, E, O> {
        &self.graph
    }

    fn dispatch_event(
        &self,
        context: &mut Context<'_, S, E, O>,
        event: &E,
        payload: Option<Payload>,
    ) -> Result<(), ConfigurationError> {
        context.data_mut().set_event_received(payload);
        tracing::info!("Event received");
        if let Err(error) = self.fire(LifecycleEvent::EventReceived, context) {
            return self.lifecycle_failed(context, error);
        }

        let source = self.current_state(context)?;
        let candidates = self.graph.require(&source)?.transitions_for_event(event);
        if candidates.is_empty() {
            tracing::info!(state = source.name(), "No transition for event");
            context.data_mut().set_unknown_event(event.clone());
            if let Err(error) = self.fire(LifecycleEvent::UnknownEvent, context) {
                return self.lifecycle_failed(context, error);
            }
            return Ok(());
        }

        self.resolve(
            context,
            Attempt {
                source,
                candidates,
                recovering: false,
            },
        )
    }

    /// Runs attempts until nothing fires, following automatic transitions
    /// after each success and error transitions after each failure.
    fn resolve<'m>(
        &'m self,
        context: &mut Context<'_, S, E, O>,
        mut attempt: Attempt<'m, S, E, O>,
    ) -> Result<(), ConfigurationError> {
        loop {
            if attempt.candidates.is_empty() {
                return Ok(());
            }

            self.transactions.create_transaction();
            attempt = match self.execute(context, &attempt) {
                Ok(Outcome::Moved(target)) => {
                    context.clear_data();
                    self.transactions.close_transaction(false);
                    let candidates = self.graph.require(&target)?.automatic_transitions().collect();
                    Attempt {
                        source: target,
                        candidates,
                        recovering: false,
                    }
                }
                Ok(Outcome::Stopped) => {
                    self.transactions.close_transaction(false);
                    return Ok(());
                }
                Err(Failure::Configuration(error)) => {
                    self.transactions.close_transaction(true);
                    context.clear_data();
                    return Err(error);
                }
                Err(Failure::Technical(error)) => {
                    tracing::error!(
                        state = attempt.source.name(),
                        error = %error,
                        recovering = attempt.recovering,
                        "Transition failed"
                    );
                    self.transactions.close_transaction(true);
                    context.clear_data();
                    if attempt.recovering {
                        self.report_processing_error(context, &attempt.source, &error);
                        return Ok(());
                    }
                    match self.recovery(context, attempt.source.clone(), &error)? {
                        Some(next) => next,
                        None => return Ok(()),
                    }
                }
            };
        }
    }

    fn execute(
        &self,
        context: &mut Context<'_, S, E, O>,
        attempt: &Attempt<'_, S, E, O>,
    ) -> Result<Outcome<S>, Failure> {
        if !attempt.recovering {
            let validator = self.graph.require(&attempt.source)?.exit_validator();
            if let Some(validator) = validator {
                match validator.execute(context) {
                    Ok(()) => {}
                    Err(ActionError::Validation(rejection)) => {
                        tracing::info!(
                            state = attempt.source.name(),
                            code = %rejection.code,
                            "Exit validation rejected the transition"
                        );
                        context.data_mut().set_validation_error(rejection);
                        self.fire(LifecycleEvent::ValidationError, context)
                            .map_err(Failure::Technical)?;
                        return Ok(Outcome::Stopped);
                    }
                    Err(ActionError::Technical(error)) => return Err(Failure::Technical(error)),
                }
            }
        }

        let Some(transition) = self.select(context, attempt)? else {
            tracing::debug!(state = attempt.source.name(), "No guard passed");
            return Ok(Outcome::Stopped);
        };

        if let Some(action) = transition.action() {
            action.execute(context)?;
        }

        let target = transition.target().clone();
        if target == attempt.source {
            tracing::debug!(state = target.name(), "Reflexive transition executed");
            return Ok(Outcome::Moved(target));
        }

        if let Some(on_entry) = self.graph.require(&target)?.on_entry() {
            on_entry.execute(context)?;
        }
        context
            .data_mut()
            .set_state_change(StateChange::new(attempt.source.clone(), target.clone()));
        self.fire(LifecycleEvent::SuccessfulStateChange, context)
            .map_err(Failure::Technical)?;
        tracing::info!(
            from = attempt.source.name(),
            to = target.name(),
            "Transition executed"
        );

        Ok(Outcome::Moved(target))
    }

    /// The single candidate whose guard passes.
    fn select<'m>(
        &self,
        context: &Context<'_, S, E, O>,
        attempt: &Attempt<'m, S, E, O>,
    ) -> Result<Option<&'m Transition<S, E, O>>, ConfigurationError> {
        let passing: Vec<_> = attempt
            .candidates
            .iter()
            .copied()
            .filter(|t| t.guard().check(context))
            .collect();
        tracing::debug!(
            state = attempt.source.name(),
            candidates = attempt.candidates.len(),
            passing = passing.len(),
            "Guards evaluated"
        );

        match passing.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(*only)),
            many => Err(ConfigurationError::AmbiguousTransition {
                state: attempt.source.name().to_string(),
                passing: many.len(),
            }),
        }
    }

    /// The recovery attempt for a failure out of `source`, or `None` after
    /// reporting a processing error when no error transition matches.
    fn recovery(
        &self,
        context: &mut Context<'_, S, E, O>,
        source: S,
        error: &BoxError,
    ) -> Result<Option<Attempt<'_, S, E, O>>, ConfigurationError> {
        let candidates = self.graph.require(&source)?.error_transitions_for(error);
        if candidates.is_empty() {
            tracing::warn!(
                state = source.name(),
                error = %error,
                "No error transition matches the failure"
            );
            self.report_processing_error(context, &source, error);
            return Ok(None);
        }

        tracing::info!(state = source.name(), "Recovering through error transition");
        Ok(Some(Attempt {
            source,
            candidates,
            recovering: true,
        }))
    }

    fn lifecycle_failed(
        &self,
        context: &mut Context<'_, S, E, O>,
        error: BoxError,
    ) -> Result<(), ConfigurationError> {
        tracing::error!(error = %error, "Lifecycle action failed");
        self.transactions.close_transaction(true);
        context.clear_data();

        let source = self.current_state(context)?;
        match self.recovery(context, source, &error)? {
            Some(attempt) => self.resolve(context, attempt),
            None => Ok(()),
        }
    }

    fn report_processing_error(&self, context: &mut Context<'_, S, E, O>, state: &S, error: &BoxError) {
        context.data_mut().set_processing_error(ProcessingError {
            state: state.clone(),
            message: error.to_string(),
        });
        if let Err(hook_error) = self.fire(LifecycleEvent::ProcessingError, context) {
            tracing::error!(error = %hook_error, "Processing error action failed");
        }
        context.clear_data();
    }

    fn fire(&self, event: LifecycleEvent, context: &mut Context<'_, S, E, O>) -> Result<(), BoxError> {
        match self.lifecycle_actions.get(&event) {
            Some(action) => {
                tracing::debug!(lifecycle = event.name(), "Running lifecycle action");
                action.execute(context).map_err(ActionError::into_boxed)
            }
            None => Ok(()),
        }
    }

    fn current_state(&self, context: &Context<'_, S, E, O>) -> Result<S, ConfigurationError> {
        let state = (self.current_state)(context.subject());
        self.graph.require(&state)?;
        Ok(state)
    }
}

impl<S: StateId, E: EventId, O: 'static> fmt::Debug for StateMachine<S, E, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lifecycle: Vec<_> = self.lifecycle_actions.keys().collect();
        lifecycle.sort();
        f.debug_struct("StateMachine")
            .field("graph", &self.graph)
            .field("lifecycle_actions", &lifecycle)
            .finish_non_exhaustive()
    }
}
