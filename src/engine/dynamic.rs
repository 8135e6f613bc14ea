//! Type-erased entry points.
//!
//! Hosts that keep machines for different subject types side by side (for
//! example in a registry keyed by name) can hold them as
//! `Box<dyn DynStateMachine>`. Events, states and subjects are then passed
//! as `dyn Any` and checked against the machine's types on every call.

use crate::core::{EventId, Payload, StateId};
use crate::engine::error::EngineError;
use crate::engine::machine::StateMachine;
use std::any::{type_name, Any};

/// Object-safe view of a [`StateMachine`].
pub trait DynStateMachine: Send + Sync {
    /// Send an event. Fails with `TypeMismatch` if `event` or `subject` has
    /// the wrong type.
    fn send_event_dyn(
        &self,
        event: &dyn Any,
        subject: &mut dyn Any,
        payload: Option<Payload>,
    ) -> Result<(), EngineError>;

    fn send_event_by_name_dyn(
        &self,
        name: &str,
        subject: &mut dyn Any,
        payload: Option<Payload>,
    ) -> Result<(), EngineError>;

    fn proceed_dyn(&self, subject: &mut dyn Any) -> Result<(), EngineError>;

    /// Names of the events with a transition out of `state`.
    fn possible_event_names(&self, state: &dyn Any) -> Result<Vec<String>, EngineError>;

    fn has_automatic_transitions_dyn(&self, state: &dyn Any) -> Result<bool, EngineError>;

    fn initial_state_name(&self) -> &str;

    fn final_state_name(&self) -> &str;
}

fn downcast<'a, T: Any>(value: &'a dyn Any, role: &'static str) -> Result<&'a T, EngineError> {
    value.downcast_ref::<T>().ok_or(EngineError::TypeMismatch {
        role,
        expected: type_name::<T>(),
    })
}

fn downcast_mut<'a, T: Any>(value: &'a mut dyn Any, role: &'static str) -> Result<&'a mut T, EngineError> {
    value.downcast_mut::<T>().ok_or(EngineError::TypeMismatch {
        role,
        expected: type_name::<T>(),
    })
}

impl<S: StateId, E: EventId, O: 'static> DynStateMachine for StateMachine<S, E, O> {
    fn send_event_dyn(
        &self,
        event: &dyn Any,
        subject: &mut dyn Any,
        payload: Option<Payload>,
    ) -> Result<(), EngineError> {
        let subject = downcast_mut::<O>(subject, "subject")?;
        let event = downcast::<E>(event, "event")?;
        self.send_event(event, subject, payload)
    }

    fn send_event_by_name_dyn(
        &self,
        name: &str,
        subject: &mut dyn Any,
        payload: Option<Payload>,
    ) -> Result<(), EngineError> {
        let subject = downcast_mut::<O>(subject, "subject")?;
        self.send_event_by_name(name, subject, payload)
    }

    fn proceed_dyn(&self, subject: &mut dyn Any) -> Result<(), EngineError> {
        let subject = downcast_mut::<O>(subject, "subject")?;
        self.proceed(subject)
    }

    fn possible_event_names(&self, state: &dyn Any) -> Result<Vec<String>, EngineError> {
        let state = downcast::<S>(state, "state")?;
        Ok(self
            .possible_events_for_state(state)
            .iter()
            .map(|event| event.name().to_string())
            .collect())
    }

    fn has_automatic_transitions_dyn(&self, state: &dyn Any) -> Result<bool, EngineError> {
        let state = downcast::<S>(state, "state")?;
        self.has_automatic_transitions(state)
    }

    fn initial_state_name(&self) -> &str {
        self.initial_state().name()
    }

    fn final_state_name(&self) -> &str {
        self.final_state().name()
    }
}
