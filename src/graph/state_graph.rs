//! The complete graph of a machine.

use crate::builder::ConfigurationError;
use crate::core::{EventId, StateId};
use crate::graph::node::StateNode;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// All states of a machine, keyed by identifier.
///
/// The initial and final states are registered as placeholders up front.
/// Each placeholder may be redefined once to attach callbacks; every other
/// identifier may be registered only once.
pub struct StateGraph<S: StateId, E: EventId, O: 'static> {
    initial: S,
    final_state: S,
    nodes: HashMap<S, StateNode<S, E, O>>,
    order: Vec<S>,
    placeholders: HashSet<S>,
}

impl<S: StateId, E: EventId, O: 'static> StateGraph<S, E, O> {
    pub(crate) fn new(initial: S, final_state: S) -> Self {
        let mut graph = Self {
            initial: initial.clone(),
            final_state: final_state.clone(),
            nodes: HashMap::new(),
            order: Vec::new(),
            placeholders: HashSet::new(),
        };
        for id in [initial, final_state] {
            if !graph.nodes.contains_key(&id) {
                graph.placeholders.insert(id.clone());
                graph.order.push(id.clone());
                graph.nodes.insert(id.clone(), StateNode::new(id, None, None));
            }
        }
        graph
    }

    pub(crate) fn register(&mut self, node: StateNode<S, E, O>) -> Result<(), ConfigurationError> {
        if self.placeholders.remove(&node.id) {
            if let Some(existing) = self.nodes.get_mut(&node.id) {
                existing.on_entry = node.on_entry;
                existing.exit_validator = node.exit_validator;
            }
            return Ok(());
        }
        if self.nodes.contains_key(&node.id) {
            return Err(ConfigurationError::DuplicateState(node.id.name().to_string()));
        }
        self.order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub(crate) fn node_mut(&mut self, id: &S) -> Option<&mut StateNode<S, E, O>> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn require(&self, id: &S) -> Result<&StateNode<S, E, O>, ConfigurationError> {
        self.nodes
            .get(id)
            .ok_or_else(|| ConfigurationError::UnknownState(id.name().to_string()))
    }

    pub fn initial(&self) -> &S {
        &self.initial
    }

    pub fn final_state(&self) -> &S {
        &self.final_state
    }

    pub fn node(&self, id: &S) -> Option<&StateNode<S, E, O>> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &S) -> bool {
        self.nodes.contains_key(id)
    }

    /// Registered states in registration order, initial and final first.
    pub fn states(&self) -> impl Iterator<Item = &S> + '_ {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn state_from_name(&self, name: &str) -> Option<&S> {
        self.order.iter().find(|s| s.name() == name)
    }

    /// Resolves an event name against the whole event type.
    ///
    /// Events some transition listens to are matched by `name()` first;
    /// any other name is deserialized as the event's serialized form.
    pub fn event_from_name(&self, name: &str) -> Option<E> {
        self.order
            .iter()
            .filter_map(|s| self.nodes.get(s))
            .flat_map(|node| node.transitions.iter())
            .filter_map(|t| t.event())
            .find(|e| e.name() == name)
            .cloned()
            .or_else(|| serde_json::from_value(serde_json::Value::String(name.to_string())).ok())
    }
}

impl<S: StateId, E: EventId, O: 'static> fmt::Debug for StateGraph<S, E, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateGraph")
            .field("initial", &self.initial)
            .field("final_state", &self.final_state)
            .field("states", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Action, Guard};
    use crate::graph::{Transition, Trigger};
    use crate::{event_enum, state_enum};

    state_enum! {
        enum TestState { None, Open, Closed, Done }
    }

    event_enum! {
        enum TestEvent { Close }
    }

    type TestGraph = StateGraph<TestState, TestEvent, ()>;

    #[test]
    fn initial_and_final_are_registered_first() {
        let graph = TestGraph::new(TestState::None, TestState::Done);
        let states: Vec<_> = graph.states().copied().collect();
        assert_eq!(states, vec![TestState::None, TestState::Done]);
    }

    #[test]
    fn placeholder_can_be_redefined_once() {
        let mut graph = TestGraph::new(TestState::None, TestState::Done);
        let entry = Action::noop();

        graph
            .register(StateNode::new(TestState::Done, Some(entry), None))
            .unwrap();
        assert!(graph.node(&TestState::Done).unwrap().on_entry().is_some());

        let again = graph.register(StateNode::new(TestState::Done, None, None));
        assert!(matches!(again, Err(ConfigurationError::DuplicateState(name)) if name == "Done"));
    }

    #[test]
    fn user_states_are_unique() {
        let mut graph = TestGraph::new(TestState::None, TestState::Done);
        graph
            .register(StateNode::new(TestState::Open, None, None))
            .unwrap();

        let duplicate = graph.register(StateNode::new(TestState::Open, None, None));
        assert!(matches!(duplicate, Err(ConfigurationError::DuplicateState(_))));
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn require_reports_unknown_state() {
        let graph = TestGraph::new(TestState::None, TestState::Done);
        let result = graph.require(&TestState::Closed);
        assert!(matches!(result, Err(ConfigurationError::UnknownState(name)) if name == "Closed"));
    }

    #[test]
    fn event_names_resolve_against_the_event_type() {
        let mut graph = TestGraph::new(TestState::None, TestState::Done);
        graph
            .register(StateNode::new(TestState::Open, None, None))
            .unwrap();

        assert_eq!(graph.state_from_name("Open"), Some(&TestState::Open));
        assert_eq!(graph.state_from_name("Closed"), None);
        assert_eq!(graph.event_from_name("Close"), Some(TestEvent::Close));
        assert_eq!(graph.event_from_name("Shred"), None);

        graph
            .node_mut(&TestState::Open)
            .unwrap()
            .add_transition(Transition::new(
                TestState::Done,
                Trigger::Event(TestEvent::Close),
                None,
                Guard::always(),
            ));
        assert_eq!(graph.event_from_name("Close"), Some(TestEvent::Close));
    }
}
