//! Guard predicates for choosing between candidate transitions.
//!
//! Guards are side-effect-free boolean functions over the per-call
//! [`Context`]. For any sent event at most one candidate's guard may pass;
//! the engine treats more than one passing guard as a configuration defect.

use crate::core::context::Context;
use crate::core::state::{EventId, StateId};
use std::fmt;
use std::sync::Arc;

type GuardFn<S, E, O> = dyn Fn(&Context<'_, S, E, O>) -> bool + Send + Sync;

/// Predicate that decides whether a candidate transition fires.
///
/// # Example
///
/// ```rust
/// use statework::core::{Context, Guard};
/// use statework::{event_enum, state_enum};
///
/// state_enum! {
///     enum Stage { Draft, Review }
/// }
/// event_enum! {
///     enum Command { Submit }
/// }
///
/// struct Document { pages: u32 }
///
/// let has_content = Guard::new(|ctx: &Context<'_, Stage, Command, Document>| {
///     ctx.subject().pages > 0
/// });
///
/// let mut empty = Document { pages: 0 };
/// assert!(!has_content.check(&Context::new(&mut empty)));
///
/// let mut filled = Document { pages: 3 };
/// assert!(has_content.check(&Context::new(&mut filled)));
/// ```
pub struct Guard<S: StateId, E: EventId, O: 'static> {
    predicate: Arc<GuardFn<S, E, O>>,
}

impl<S: StateId, E: EventId, O: 'static> Guard<S, E, O> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic for a given context and must not
    /// have side effects; it can be evaluated for transitions that never fire.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Context<'_, S, E, O>) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Guard that always passes. Used when a transition configures none.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Evaluate the guard against a context.
    pub fn check(&self, context: &Context<'_, S, E, O>) -> bool {
        (self.predicate)(context)
    }
}

impl<S: StateId, E: EventId, O: 'static> Clone for Guard<S, E, O> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S: StateId, E: EventId, O: 'static> Default for Guard<S, E, O> {
    fn default() -> Self {
        Self::always()
    }
}

impl<S: StateId, E: EventId, O: 'static> fmt::Debug for Guard<S, E, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ValidationError;
    use crate::{event_enum, state_enum};

    state_enum! {
        enum TestState { Initial, Processing }
    }

    event_enum! {
        enum TestEvent { Go }
    }

    struct Counter {
        value: i32,
    }

    type TestContext<'a> = Context<'a, TestState, TestEvent, Counter>;

    #[test]
    fn guard_reads_subject() {
        let positive = Guard::new(|ctx: &TestContext<'_>| ctx.subject().value > 0);

        let mut subject = Counter { value: 1 };
        assert!(positive.check(&Context::new(&mut subject)));

        let mut subject = Counter { value: -1 };
        assert!(!positive.check(&Context::new(&mut subject)));
    }

    #[test]
    fn default_guard_always_passes() {
        let guard: Guard<TestState, TestEvent, Counter> = Guard::default();
        let mut subject = Counter { value: 0 };
        assert!(guard.check(&Context::new(&mut subject)));
    }

    #[test]
    fn guard_can_inspect_lifecycle_data() {
        let no_rejection = Guard::new(|ctx: &TestContext<'_>| !ctx.has_validation_error());

        let mut subject = Counter { value: 0 };
        let mut ctx = Context::new(&mut subject);
        assert!(no_rejection.check(&ctx));

        ctx.data_mut().set_validation_error(ValidationError::new("E-1"));
        assert!(!no_rejection.check(&ctx));
    }

    #[test]
    fn guard_is_deterministic() {
        let guard = Guard::new(|ctx: &TestContext<'_>| ctx.subject().value % 2 == 0);
        let mut subject = Counter { value: 4 };
        let ctx = Context::new(&mut subject);

        assert_eq!(guard.check(&ctx), guard.check(&ctx));
    }

    #[test]
    fn cloned_guards_share_the_predicate() {
        let guard = Guard::new(|ctx: &TestContext<'_>| ctx.subject().value == 3);
        let cloned = guard.clone();
        let mut subject = Counter { value: 3 };
        let ctx = Context::new(&mut subject);

        assert!(guard.check(&ctx));
        assert!(cloned.check(&ctx));
    }
}
