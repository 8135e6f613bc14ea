//! States of the graph.

use crate::core::{Action, BoxError, EventId, StateId};
use crate::graph::transition::Transition;
use std::fmt;

/// A configured state together with its outgoing transitions.
pub struct StateNode<S: StateId, E: EventId, O: 'static> {
    pub(crate) id: S,
    pub(crate) on_entry: Option<Action<S, E, O>>,
    pub(crate) exit_validator: Option<Action<S, E, O>>,
    pub(crate) transitions: Vec<Transition<S, E, O>>,
}

impl<S: StateId, E: EventId, O: 'static> StateNode<S, E, O> {
    pub(crate) fn new(
        id: S,
        on_entry: Option<Action<S, E, O>>,
        exit_validator: Option<Action<S, E, O>>,
    ) -> Self {
        Self {
            id,
            on_entry,
            exit_validator,
            transitions: Vec::new(),
        }
    }

    pub(crate) fn add_transition(&mut self, transition: Transition<S, E, O>) {
        self.transitions.push(transition);
    }

    pub fn id(&self) -> &S {
        &self.id
    }

    pub fn on_entry(&self) -> Option<&Action<S, E, O>> {
        self.on_entry.as_ref()
    }

    pub fn exit_validator(&self) -> Option<&Action<S, E, O>> {
        self.exit_validator.as_ref()
    }

    /// Outgoing transitions in configuration order.
    pub fn transitions(&self) -> &[Transition<S, E, O>] {
        &self.transitions
    }

    pub fn transitions_for_event(&self, event: &E) -> Vec<&Transition<S, E, O>> {
        self.transitions
            .iter()
            .filter(|t| t.listens_to(event))
            .collect()
    }

    pub fn automatic_transitions(&self) -> impl Iterator<Item = &Transition<S, E, O>> + '_ {
        self.transitions.iter().filter(|t| t.is_automatic())
    }

    /// Error transitions that recover from the given failure.
    pub fn error_transitions_for(&self, error: &BoxError) -> Vec<&Transition<S, E, O>> {
        self.transitions
            .iter()
            .filter(|t| t.recovers_from(error))
            .collect()
    }

    pub fn has_automatic_transitions(&self) -> bool {
        self.transitions.iter().any(Transition::is_automatic)
    }

    /// Events that trigger a transition out of this state, in configuration
    /// order.
    ///
    /// This is the set of events the state reacts to, not a list of
    /// transitions: guarded alternatives for the same event yield one entry.
    pub fn possible_events(&self) -> Vec<E> {
        let mut events: Vec<E> = Vec::new();
        for event in self.transitions.iter().filter_map(Transition::event) {
            if !events.contains(event) {
                events.push(event.clone());
            }
        }
        events
    }
}

impl<S: StateId, E: EventId, O: 'static> fmt::Debug for StateNode<S, E, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateNode")
            .field("id", &self.id)
            .field("has_on_entry", &self.on_entry.is_some())
            .field("has_exit_validator", &self.exit_validator.is_some())
            .field("transitions", &self.transitions)
            .finish()
    }
}
