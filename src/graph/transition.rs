//! Transitions and what triggers them.

use crate::core::{Action, BoxError, EventId, Guard, StateId};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

type MatchFn = dyn Fn(&(dyn StdError + Send + Sync + 'static)) -> bool + Send + Sync;

/// Selects the technical failures an error transition recovers from.
///
/// # Example
///
/// ```rust
/// use statework::graph::ErrorMatcher;
/// use statework::core::BoxError;
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("payment gateway unavailable")]
/// struct GatewayDown;
///
/// let matcher = ErrorMatcher::of::<GatewayDown>();
/// let failure: BoxError = Box::new(GatewayDown);
/// assert!(matcher.matches(&failure));
///
/// let other: BoxError = "timeout".into();
/// assert!(!matcher.matches(&other));
/// assert!(ErrorMatcher::any().matches(&other));
/// ```
#[derive(Clone)]
pub struct ErrorMatcher {
    name: Arc<str>,
    predicate: Arc<MatchFn>,
}

impl ErrorMatcher {
    /// Match failures whose concrete type is `T`.
    pub fn of<T: StdError + 'static>() -> Self {
        Self {
            name: Arc::from(std::any::type_name::<T>()),
            predicate: Arc::new(|error| error.is::<T>()),
        }
    }

    /// Match every technical failure.
    pub fn any() -> Self {
        Self::custom("any", |_| true)
    }

    /// Match failures accepted by an arbitrary predicate.
    pub fn custom<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&(dyn StdError + Send + Sync + 'static)) -> bool + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, error: &BoxError) -> bool {
        (self.predicate)(error.as_ref())
    }
}

impl fmt::Debug for ErrorMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorMatcher").field(&self.name).finish()
    }
}

/// What makes a transition a candidate.
#[derive(Clone, Debug)]
pub enum Trigger<E: EventId> {
    /// Fires when the event is sent
    Event(E),
    /// Fires as recovery when a matching technical failure occurred
    Error(ErrorMatcher),
    /// Fires without external stimulus
    Automatic,
}

/// An outgoing edge of a state.
///
/// Transitions are immutable once added to the graph.
pub struct Transition<S: StateId, E: EventId, O: 'static> {
    pub(crate) target: S,
    pub(crate) trigger: Trigger<E>,
    pub(crate) action: Option<Action<S, E, O>>,
    pub(crate) guard: Guard<S, E, O>,
}

impl<S: StateId, E: EventId, O: 'static> Transition<S, E, O> {
    pub(crate) fn new(
        target: S,
        trigger: Trigger<E>,
        action: Option<Action<S, E, O>>,
        guard: Guard<S, E, O>,
    ) -> Self {
        Self {
            target,
            trigger,
            action,
            guard,
        }
    }

    pub fn target(&self) -> &S {
        &self.target
    }

    pub fn trigger(&self) -> &Trigger<E> {
        &self.trigger
    }

    pub fn action(&self) -> Option<&Action<S, E, O>> {
        self.action.as_ref()
    }

    pub fn guard(&self) -> &Guard<S, E, O> {
        &self.guard
    }

    pub fn event(&self) -> Option<&E> {
        match &self.trigger {
            Trigger::Event(event) => Some(event),
            _ => None,
        }
    }

    pub fn is_automatic(&self) -> bool {
        matches!(self.trigger, Trigger::Automatic)
    }

    pub fn is_error_transition(&self) -> bool {
        matches!(self.trigger, Trigger::Error(_))
    }

    pub fn listens_to(&self, event: &E) -> bool {
        self.event() == Some(event)
    }

    pub fn recovers_from(&self, error: &BoxError) -> bool {
        match &self.trigger {
            Trigger::Error(matcher) => matcher.matches(error),
            _ => false,
        }
    }
}

impl<S: StateId, E: EventId, O: 'static> Clone for Transition<S, E, O> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            trigger: self.trigger.clone(),
            action: self.action.clone(),
            guard: self.guard.clone(),
        }
    }
}

impl<S: StateId, E: EventId, O: 'static> fmt::Debug for Transition<S, E, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("target", &self.target)
            .field("trigger", &self.trigger)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event_enum, state_enum};

    state_enum! {
        enum TestState { Start, End }
    }

    event_enum! {
        enum TestEvent { Go, Stop }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("io failed")]
    struct IoFailure;

    #[derive(Debug, thiserror::Error)]
    #[error("parse failed")]
    struct ParseFailure;

    type TestTransition = Transition<TestState, TestEvent, ()>;

    fn transition(trigger: Trigger<TestEvent>) -> TestTransition {
        Transition::new(TestState::End, trigger, None, Guard::always())
    }

    #[test]
    fn event_transition_listens_to_its_event_only() {
        let t = transition(Trigger::Event(TestEvent::Go));

        assert!(t.listens_to(&TestEvent::Go));
        assert!(!t.listens_to(&TestEvent::Stop));
        assert!(!t.is_automatic());
        assert!(!t.is_error_transition());
    }

    #[test]
    fn automatic_transition_has_no_trigger() {
        let t = transition(Trigger::Automatic);

        assert!(t.is_automatic());
        assert!(t.event().is_none());
        assert!(!t.listens_to(&TestEvent::Go));
    }

    #[test]
    fn error_transition_matches_failure_type() {
        let t = transition(Trigger::Error(ErrorMatcher::of::<IoFailure>()));

        let io: BoxError = Box::new(IoFailure);
        let parse: BoxError = Box::new(ParseFailure);

        assert!(t.is_error_transition());
        assert!(t.recovers_from(&io));
        assert!(!t.recovers_from(&parse));
    }

    #[test]
    fn any_matcher_accepts_every_failure() {
        let t = transition(Trigger::Error(ErrorMatcher::any()));
        let parse: BoxError = Box::new(ParseFailure);
        let message: BoxError = "plain message".into();

        assert!(t.recovers_from(&parse));
        assert!(t.recovers_from(&message));
    }

    #[test]
    fn custom_matcher_uses_predicate() {
        let matcher = ErrorMatcher::custom("mentions-timeout", |e| e.to_string().contains("timeout"));
        let hit: BoxError = "upstream timeout".into();
        let miss: BoxError = "refused".into();

        assert_eq!(matcher.name(), "mentions-timeout");
        assert!(matcher.matches(&hit));
        assert!(!matcher.matches(&miss));
    }
}
