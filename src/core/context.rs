//! Per-call scratchpad shared by all callbacks of one engine call.

use crate::core::action::ValidationError;
use crate::core::lifecycle::{
    LifecycleData, LifecycleEvent, LifecyclePayload, Payload, ProcessingError, StateChange,
};
use crate::core::state::{EventId, StateId};
use std::any::Any;
use std::fmt;
use uuid::Uuid;

/// State shared between the callbacks of one public engine call.
///
/// A context borrows the subject for the duration of the call and records
/// lifecycle payloads while the matching phase runs. The engine clears the
/// lifecycle data at every transition boundary, so nothing leaks from one
/// transition into the next.
pub struct Context<'a, S: StateId, E: EventId, O> {
    subject: &'a mut O,
    call_id: Uuid,
    data: LifecycleData<S, E>,
}

impl<'a, S: StateId, E: EventId, O> Context<'a, S, E, O> {
    pub fn new(subject: &'a mut O) -> Self {
        Self {
            subject,
            call_id: Uuid::new_v4(),
            data: LifecycleData::new(),
        }
    }

    pub fn subject(&self) -> &O {
        self.subject
    }

    pub fn subject_mut(&mut self) -> &mut O {
        self.subject
    }

    /// Identifier of the call this context belongs to. Appears in log spans.
    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    pub fn lifecycle_data(&self) -> &LifecycleData<S, E> {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut LifecycleData<S, E> {
        &mut self.data
    }

    pub(crate) fn clear_data(&mut self) {
        self.data.clear();
    }

    /// Payload stored for a lifecycle event, if any.
    pub fn data_for(&self, event: LifecycleEvent) -> Option<LifecyclePayload<'_, S, E>> {
        self.data.get(event)
    }

    /// Payload of the most recent lifecycle event that carries data.
    pub fn most_recent_data(&self) -> Option<LifecyclePayload<'_, S, E>> {
        self.data.most_recent()
    }

    /// The data sent along with the event, if it has type `T`.
    pub fn event_data<T: Any>(&self) -> Option<&T> {
        let payload = self.data.event_received()?;
        let typed = payload.downcast_ref::<T>();
        if typed.is_none() {
            tracing::warn!(
                expected = std::any::type_name::<T>(),
                "Event data has a different type than requested"
            );
        }
        typed
    }

    /// Replace the data of the received event. Overwrites any previous payload.
    pub fn set_event_data<T: Any + Send>(&mut self, data: T) {
        self.data.set_event_received(Some(Box::new(data) as Payload));
    }

    pub fn unknown_event(&self) -> Option<&E> {
        self.data.unknown_event()
    }

    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.data.validation_error()
    }

    pub fn has_validation_error(&self) -> bool {
        self.data.validation_error().is_some()
    }

    pub fn state_change(&self) -> Option<&StateChange<S>> {
        self.data.state_change()
    }

    pub fn processing_error(&self) -> Option<&ProcessingError<S>> {
        self.data.processing_error()
    }
}

impl<S: StateId, E: EventId, O: fmt::Debug> fmt::Debug for Context<'_, S, E, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("subject", &self.subject)
            .field("call_id", &self.call_id)
            .field("data", &self.data)
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
        enum TestEvent { Finish }
    }

    #[derive(Debug, Default)]
    struct Subject {
        touched: bool,
    }

    type TestContext<'a> = Context<'a, TestState, TestEvent, Subject>;

    #[test]
    fn new_context_has_no_lifecycle_data() {
        let mut subject = Subject::default();
        let ctx: TestContext<'_> = Context::new(&mut subject);

        assert!(ctx.lifecycle_data().is_empty());
        assert!(!ctx.has_validation_error());
        assert!(ctx.most_recent_data().is_none());
    }

    #[test]
    fn subject_is_mutable_through_context() {
        let mut subject = Subject::default();
        {
            let mut ctx: TestContext<'_> = Context::new(&mut subject);
            ctx.subject_mut().touched = true;
            assert!(ctx.subject().touched);
        }
        assert!(subject.touched);
    }

    #[test]
    fn event_data_is_typed() {
        let mut subject = Subject::default();
        let mut ctx: TestContext<'_> = Context::new(&mut subject);
        ctx.set_event_data(42u64);

        assert_eq!(ctx.event_data::<u64>(), Some(&42));
        assert_eq!(ctx.event_data::<String>(), None);
    }

    #[test]
    fn set_event_data_overwrites() {
        let mut subject = Subject::default();
        let mut ctx: TestContext<'_> = Context::new(&mut subject);
        ctx.set_event_data("first".to_string());
        ctx.set_event_data("second".to_string());

        assert_eq!(ctx.event_data::<String>().map(String::as_str), Some("second"));
    }

    #[test]
    fn clear_data_resets_every_slot() {
        let mut subject = Subject::default();
        let mut ctx: TestContext<'_> = Context::new(&mut subject);
        ctx.set_event_data(1u8);
        ctx.data_mut().set_unknown_event(TestEvent::Finish);
        ctx.data_mut()
            .set_state_change(StateChange::new(TestState::Start, TestState::End));

        ctx.clear_data();

        assert!(ctx.lifecycle_data().is_empty());
        assert!(ctx.unknown_event().is_none());
        assert!(ctx.state_change().is_none());
    }

    #[test]
    fn call_ids_differ_between_contexts() {
        let mut first = Subject::default();
        let mut second = Subject::default();
        let a: TestContext<'_> = Context::new(&mut first);
        let b: TestContext<'_> = Context::new(&mut second);

        assert_ne!(a.call_id(), b.call_id());
    }
}
