//! Side-effecting callbacks run by the engine.
//!
//! Actions are run as transition actions, on-entry actions, exit validators
//! and lifecycle actions. They report failures through [`ActionError`]:
//! a [`ValidationError`] is a deliberate business rejection, anything else is
//! a technical failure that the engine tries to recover from.

use crate::core::context::Context;
use crate::core::state::{EventId, StateId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Boxed technical failure raised by a callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Outcome of running an action.
pub type ActionResult = Result<(), ActionError>;

/// Caller-defined rejection raised by an exit validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Caller-defined identifier of the rejection
    pub code: String,
    /// Optional human readable detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationError {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "Errorcode: {} ({})", self.code, message),
            None => write!(f, "Errorcode: {}", self.code),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Failure reported by an action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Business rejection; only meaningful when raised by an exit validator
    #[error("Validation failed: {0}")]
    Validation(ValidationError),

    /// Any other failure
    #[error(transparent)]
    Technical(BoxError),
}

impl ActionError {
    /// Wrap any error (or message) as a technical failure.
    pub fn technical(error: impl Into<BoxError>) -> Self {
        ActionError::Technical(error.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ActionError::Validation(_))
    }

    /// Erase the distinction between rejection and technical failure.
    pub fn into_boxed(self) -> BoxError {
        match self {
            ActionError::Validation(rejection) => Box::new(rejection),
            ActionError::Technical(error) => error,
        }
    }
}

impl From<ValidationError> for ActionError {
    fn from(error: ValidationError) -> Self {
        ActionError::Validation(error)
    }
}

type ActionFn<S, E, O> = dyn Fn(&mut Context<'_, S, E, O>) -> ActionResult + Send + Sync;

/// A callback over the per-call [`Context`].
///
/// Actions are cheap to clone; clones share the same callback, so one action
/// can be attached to many transitions.
///
/// # Example
///
/// ```rust
/// use statework::core::{Action, ActionError, Context};
/// use statework::{event_enum, state_enum};
///
/// state_enum! {
///     enum Light { Off, On }
/// }
/// event_enum! {
///     enum Switch { Flip }
/// }
///
/// struct Lamp { state: Light, flips: u32 }
///
/// let count = Action::new(|ctx: &mut Context<'_, Light, Switch, Lamp>| {
///     ctx.subject_mut().flips += 1;
///     Ok(())
/// });
/// let reject: Action<Light, Switch, Lamp> =
///     Action::new(|_ctx| Err(ActionError::technical("bulb burnt out")));
/// ```
pub struct Action<S: StateId, E: EventId, O: 'static> {
    work: Arc<ActionFn<S, E, O>>,
}

impl<S: StateId, E: EventId, O: 'static> Action<S, E, O> {
    pub fn new<F>(work: F) -> Self
    where
        F: Fn(&mut Context<'_, S, E, O>) -> ActionResult + Send + Sync + 'static,
    {
        Self {
            work: Arc::new(work),
        }
    }

    /// Action that does nothing and always succeeds.
    pub fn noop() -> Self {
        Self::new(|_| Ok(()))
    }

    /// Start an ordered composition of actions.
    pub fn chain() -> ChainedAction<S, E, O> {
        ChainedAction::new()
    }

    pub fn execute(&self, context: &mut Context<'_, S, E, O>) -> ActionResult {
        (self.work)(context)
    }
}

impl<S: StateId, E: EventId, O: 'static> Clone for Action<S, E, O> {
    fn clone(&self) -> Self {
        Self {
            work: Arc::clone(&self.work),
        }
    }
}

impl<S: StateId, E: EventId, O: 'static> fmt::Debug for Action<S, E, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action")
    }
}

/// Fixed, ordered composition of actions.
///
/// Members run in insertion order; the first failure stops the chain and is
/// returned unchanged.
pub struct ChainedAction<S: StateId, E: EventId, O: 'static> {
    actions: Vec<Action<S, E, O>>,
}

impl<S: StateId, E: EventId, O: 'static> ChainedAction<S, E, O> {
    fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Append an existing action.
    pub fn then(mut self, action: Action<S, E, O>) -> Self {
        self.actions.push(action);
        self
    }

    /// Append a closure.
    pub fn then_do<F>(self, work: F) -> Self
    where
        F: Fn(&mut Context<'_, S, E, O>) -> ActionResult + Send + Sync + 'static,
    {
        self.then(Action::new(work))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Freeze the chain into a single action.
    pub fn build(self) -> Action<S, E, O> {
        let actions = self.actions;
        Action::new(move |context: &mut Context<'_, S, E, O>| {
            for action in &actions {
                action.execute(context)?;
            }
            Ok(())
        })
    }
}

impl<S: StateId, E: EventId, O: 'static> From<ChainedAction<S, E, O>> for Action<S, E, O> {
    fn from(chain: ChainedAction<S, E, O>) -> Self {
        chain.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event_enum, state_enum};

    state_enum! {
        enum TestState { Idle, Busy }
    }

    event_enum! {
        enum TestEvent { Go }
    }

    #[derive(Default)]
    struct Subject {
        trace: Vec<&'static str>,
    }

    type TestContext<'a> = Context<'a, TestState, TestEvent, Subject>;

    fn push(label: &'static str) -> Action<TestState, TestEvent, Subject> {
        Action::new(move |ctx: &mut TestContext<'_>| {
            ctx.subject_mut().trace.push(label);
            Ok(())
        })
    }

    #[test]
    fn action_runs_against_subject() {
        let mut subject = Subject::default();
        let mut ctx = Context::new(&mut subject);

        push("one").execute(&mut ctx).unwrap();

        assert_eq!(subject.trace, vec!["one"]);
    }

    #[test]
    fn chained_action_runs_in_order() {
        let chain = Action::chain()
            .then(push("first"))
            .then_do(|ctx: &mut TestContext<'_>| {
                ctx.subject_mut().trace.push("second");
                Ok(())
            })
            .then(push("third"));
        assert_eq!(chain.len(), 3);

        let mut subject = Subject::default();
        let mut ctx = Context::new(&mut subject);
        chain.build().execute(&mut ctx).unwrap();

        assert_eq!(subject.trace, vec!["first", "second", "third"]);
    }

    #[test]
    fn chained_action_stops_at_first_failure() {
        let action: Action<_, _, _> = Action::chain()
            .then(push("first"))
            .then_do(|_ctx| Err(ActionError::technical("broken")))
            .then(push("never"))
            .into();

        let mut subject = Subject::default();
        let mut ctx = Context::new(&mut subject);
        let result = action.execute(&mut ctx);

        assert!(matches!(result, Err(ActionError::Technical(_))));
        assert_eq!(subject.trace, vec!["first"]);
    }

    #[test]
    fn validation_error_converts_into_action_error() {
        let error: ActionError = ValidationError::new("E-42").into();
        assert!(error.is_validation());
        assert_eq!(error.to_string(), "Validation failed: Errorcode: E-42");
    }

    #[test]
    fn technical_error_keeps_source_message() {
        let error = ActionError::technical("disk full");
        assert!(!error.is_validation());
        assert_eq!(error.to_string(), "disk full");
    }
}
