//! Configurer for adding transitions between registered states.

use crate::builder::error::ConfigurationError;
use crate::core::{Action, ActionResult, Context, EventId, Guard, StateId};
use crate::graph::{ErrorMatcher, StateGraph, Transition, Trigger};
use std::error::Error as StdError;

/// Where a configured transition starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SourceMode<S> {
    States(Vec<S>),
    /// Every registered state except initial, final and the listed ones
    AllExcept(Vec<S>),
    Initial,
}

/// Where a configured transition ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TargetMode<S> {
    State(S),
    /// Reflexive: the target is the source
    SelfState,
    Final,
}

/// Adds transitions to the graph.
///
/// Obtained through [`StateMachineBuilder::transitions`]. One call to
/// [`add`](Self::add) creates one transition per resolved source state and
/// resets the configurer.
///
/// A transition is triggered by an event ([`on_event`](Self::on_event)), by
/// a technical failure ([`on_error`](Self::on_error)) or, with neither set,
/// automatically.
///
/// [`StateMachineBuilder::transitions`]: crate::builder::StateMachineBuilder::transitions
pub struct TransitionConfigurer<'g, S: StateId, E: EventId, O: 'static> {
    graph: &'g mut StateGraph<S, E, O>,
    source: Option<SourceMode<S>>,
    target: Option<TargetMode<S>>,
    event: Option<E>,
    error: Option<ErrorMatcher>,
    guard: Option<Guard<S, E, O>>,
    action: Option<Action<S, E, O>>,
}

impl<'g, S: StateId, E: EventId, O: 'static> TransitionConfigurer<'g, S, E, O> {
    pub(crate) fn new(graph: &'g mut StateGraph<S, E, O>) -> Self {
        Self {
            graph,
            source: None,
            target: None,
            event: None,
            error: None,
            guard: None,
            action: None,
        }
    }

    /// Start from each of the given states.
    pub fn from(&mut self, states: impl IntoIterator<Item = S>) -> &mut Self {
        self.source = Some(SourceMode::States(states.into_iter().collect()));
        self
    }

    /// Start from every registered state except initial and final.
    pub fn from_all(&mut self) -> &mut Self {
        self.source = Some(SourceMode::AllExcept(Vec::new()));
        self
    }

    /// Leave states out of a [`from_all`](Self::from_all) source. Implies `from_all`.
    pub fn excluding(&mut self, states: impl IntoIterator<Item = S>) -> &mut Self {
        let mut excluded = match self.source.take() {
            Some(SourceMode::AllExcept(excluded)) => excluded,
            _ => Vec::new(),
        };
        excluded.extend(states);
        self.source = Some(SourceMode::AllExcept(excluded));
        self
    }

    pub fn from_initial(&mut self) -> &mut Self {
        self.source = Some(SourceMode::Initial);
        self
    }

    pub fn to(&mut self, state: S) -> &mut Self {
        self.target = Some(TargetMode::State(state));
        self
    }

    /// Make the transition reflexive.
    pub fn to_self(&mut self) -> &mut Self {
        self.target = Some(TargetMode::SelfState);
        self
    }

    pub fn to_final(&mut self) -> &mut Self {
        self.target = Some(TargetMode::Final);
        self
    }

    pub fn on_event(&mut self, event: E) -> &mut Self {
        self.event = Some(event);
        self
    }

    /// Recover from technical failures of type `T`.
    pub fn on_error<T: StdError + 'static>(&mut self) -> &mut Self {
        self.error = Some(ErrorMatcher::of::<T>());
        self
    }

    /// Recover from every technical failure.
    pub fn on_any_error(&mut self) -> &mut Self {
        self.error = Some(ErrorMatcher::any());
        self
    }

    pub fn on_error_matching(&mut self, matcher: ErrorMatcher) -> &mut Self {
        self.error = Some(matcher);
        self
    }

    /// Add a guard using a closure.
    pub fn when<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&Context<'_, S, E, O>) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    pub fn guard(&mut self, guard: Guard<S, E, O>) -> &mut Self {
        self.guard = Some(guard);
        self
    }

    pub fn action(&mut self, action: Action<S, E, O>) -> &mut Self {
        self.action = Some(action);
        self
    }

    /// Add an action using a closure.
    pub fn action_fn<F>(&mut self, work: F) -> &mut Self
    where
        F: Fn(&mut Context<'_, S, E, O>) -> ActionResult + Send + Sync + 'static,
    {
        self.action(Action::new(work))
    }

    /// Validate the configured transition, add it from every source state
    /// and reset the configurer.
    pub fn add(&mut self) -> Result<(), ConfigurationError> {
        let source = self.source.take();
        let target = self.target.take();
        let event = self.event.take();
        let error = self.error.take();
        let guard = self.guard.take().unwrap_or_default();
        let action = self.action.take();

        let trigger = match (event, error) {
            (Some(_), Some(_)) => return Err(ConfigurationError::ConflictingTriggers),
            (Some(event), None) => Trigger::Event(event),
            (None, Some(matcher)) => Trigger::Error(matcher),
            (None, None) => Trigger::Automatic,
        };
        let source = source.ok_or(ConfigurationError::MissingSource)?;
        let target = target.ok_or(ConfigurationError::MissingTarget)?;

        let sources = self.resolve_sources(source)?;
        let mut resolved = Vec::with_capacity(sources.len());
        for from in sources {
            let to = self.resolve_target(&target, &from)?;
            resolved.push((from, to));
        }

        for (from, to) in resolved {
            if let Some(node) = self.graph.node_mut(&from) {
                node.add_transition(Transition::new(
                    to,
                    trigger.clone(),
                    action.clone(),
                    guard.clone(),
                ));
            }
        }
        Ok(())
    }

    fn resolve_sources(&self, source: SourceMode<S>) -> Result<Vec<S>, ConfigurationError> {
        let sources = match source {
            SourceMode::States(states) => states,
            SourceMode::AllExcept(excluded) => self
                .graph
                .states()
                .filter(|s| *s != self.graph.initial() && *s != self.graph.final_state())
                .filter(|s| !excluded.contains(*s))
                .cloned()
                .collect(),
            SourceMode::Initial => vec![self.graph.initial().clone()],
        };

        for state in &sources {
            self.graph.require(state)?;
            if state == self.graph.final_state() {
                return Err(ConfigurationError::TransitionFromFinal(
                    state.name().to_string(),
                ));
            }
        }
        Ok(sources)
    }

    fn resolve_target(&self, target: &TargetMode<S>, from: &S) -> Result<S, ConfigurationError> {
        let to = match target {
            TargetMode::State(state) => state.clone(),
            TargetMode::SelfState => from.clone(),
            TargetMode::Final => self.graph.final_state().clone(),
        };
        self.graph.require(&to)?;
        if &to == self.graph.initial() {
            return Err(ConfigurationError::TransitionToInitial(to.name().to_string()));
        }
        Ok(to)
    }
}
