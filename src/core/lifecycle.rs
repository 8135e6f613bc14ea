//! Lifecycle events and the data recorded for them during a call.
//!
//! Lifecycle events are the fixed execution phases a machine passes through
//! while handling a call. Each phase has one statically known payload type,
//! stored in [`LifecycleData`] while the phase's action runs.

use crate::core::action::ValidationError;
use crate::core::state::{EventId, StateId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Opaque caller data attached to a sent event.
pub type Payload = Box<dyn Any + Send>;

/// Execution phases that lifecycle actions can be registered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleEvent {
    /// An event was sent. Payload: the caller's event data.
    EventReceived,
    /// No transition of the current state listens to the sent event. Payload: the event.
    UnknownEvent,
    /// An exit validator rejected leaving the current state. Payload: [`ValidationError`].
    ValidationError,
    /// A non-reflexive transition completed. Payload: [`StateChange`].
    SuccessfulStateChange,
    /// A failure could not be recovered. Payload: [`ProcessingError`].
    ProcessingError,
}

impl LifecycleEvent {
    /// All lifecycle events in the order they can occur within one transition.
    pub const ORDERED: [LifecycleEvent; 5] = [
        LifecycleEvent::EventReceived,
        LifecycleEvent::UnknownEvent,
        LifecycleEvent::ValidationError,
        LifecycleEvent::SuccessfulStateChange,
        LifecycleEvent::ProcessingError,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::EventReceived => "EVENT_RECEIVED",
            Self::UnknownEvent => "UNKNOWN_EVENT",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::SuccessfulStateChange => "SUCCESSFUL_STATE_CHANGE",
            Self::ProcessingError => "PROCESSING_ERROR",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Record of a completed, non-reflexive state change.
///
/// The engine does not write the subject's state itself; a
/// `SuccessfulStateChange` lifecycle action typically reads this record and
/// stores `to` on the subject.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateChange<S: StateId> {
    /// The state that was left
    pub from: S,
    /// The state that was entered
    pub to: S,
    /// When the change was recorded
    pub at: DateTime<Utc>,
}

impl<S: StateId> StateChange<S> {
    pub fn new(from: S, to: S) -> Self {
        Self {
            from,
            to,
            at: Utc::now(),
        }
    }
}

/// Description of a failure that could not be recovered by an error transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ProcessingError<S: StateId> {
    /// State the subject was in when processing failed
    pub state: S,
    /// Rendered failure
    pub message: String,
}

/// Borrowed view of a single lifecycle payload.
#[derive(Debug)]
pub enum LifecyclePayload<'a, S: StateId, E: EventId> {
    EventReceived(&'a (dyn Any + Send)),
    UnknownEvent(&'a E),
    ValidationError(&'a ValidationError),
    SuccessfulStateChange(&'a StateChange<S>),
    ProcessingError(&'a ProcessingError<S>),
}

/// Per-call mapping from lifecycle event to its payload.
///
/// Every lifecycle event owns exactly one slot of its own payload type, so a
/// payload can never be stored under the wrong event.
pub struct LifecycleData<S: StateId, E: EventId> {
    event_received: Option<Payload>,
    unknown_event: Option<E>,
    validation_error: Option<ValidationError>,
    state_change: Option<StateChange<S>>,
    processing_error: Option<ProcessingError<S>>,
}

impl<S: StateId, E: EventId> Default for LifecycleData<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateId, E: EventId> LifecycleData<S, E> {
    pub fn new() -> Self {
        Self {
            event_received: None,
            unknown_event: None,
            validation_error: None,
            state_change: None,
            processing_error: None,
        }
    }

    /// Payload stored for `event`, if any.
    pub fn get(&self, event: LifecycleEvent) -> Option<LifecyclePayload<'_, S, E>> {
        match event {
            LifecycleEvent::EventReceived => self
                .event_received
                .as_deref()
                .map(LifecyclePayload::EventReceived),
            LifecycleEvent::UnknownEvent => {
                self.unknown_event.as_ref().map(LifecyclePayload::UnknownEvent)
            }
            LifecycleEvent::ValidationError => self
                .validation_error
                .as_ref()
                .map(LifecyclePayload::ValidationError),
            LifecycleEvent::SuccessfulStateChange => self
                .state_change
                .as_ref()
                .map(LifecyclePayload::SuccessfulStateChange),
            LifecycleEvent::ProcessingError => self
                .processing_error
                .as_ref()
                .map(LifecyclePayload::ProcessingError),
        }
    }

    /// Whether a payload is stored for `event`.
    pub fn contains(&self, event: LifecycleEvent) -> bool {
        self.get(event).is_some()
    }

    /// Payload of the latest lifecycle event (in [`LifecycleEvent::ORDERED`]) that carries data.
    pub fn most_recent(&self) -> Option<LifecyclePayload<'_, S, E>> {
        LifecycleEvent::ORDERED
            .iter()
            .rev()
            .find_map(|event| self.get(*event))
    }

    pub fn is_empty(&self) -> bool {
        LifecycleEvent::ORDERED
            .iter()
            .all(|event| !self.contains(*event))
    }

    /// Number of lifecycle events currently carrying data.
    pub fn len(&self) -> usize {
        LifecycleEvent::ORDERED
            .iter()
            .filter(|event| self.contains(**event))
            .count()
    }

    pub fn event_received(&self) -> Option<&(dyn Any + Send)> {
        self.event_received.as_deref()
    }

    pub fn unknown_event(&self) -> Option<&E> {
        self.unknown_event.as_ref()
    }

    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.validation_error.as_ref()
    }

    pub fn state_change(&self) -> Option<&StateChange<S>> {
        self.state_change.as_ref()
    }

    pub fn processing_error(&self) -> Option<&ProcessingError<S>> {
        self.processing_error.as_ref()
    }

    /// Overwrites the event payload. `None` leaves the slot untouched.
    pub(crate) fn set_event_received(&mut self, payload: Option<Payload>) {
        if payload.is_some() {
            self.event_received = payload;
        }
    }

    pub(crate) fn set_unknown_event(&mut self, event: E) {
        self.unknown_event = Some(event);
    }

    pub(crate) fn set_validation_error(&mut self, error: ValidationError) {
        self.validation_error = Some(error);
    }

    pub(crate) fn set_state_change(&mut self, change: StateChange<S>) {
        self.state_change = Some(change);
    }

    pub(crate) fn set_processing_error(&mut self, error: ProcessingError<S>) {
        self.processing_error = Some(error);
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }
}

impl<S: StateId, E: EventId> fmt::Debug for LifecycleData<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleData")
            .field("event_received", &self.event_received.is_some())
            .field("unknown_event", &self.unknown_event)
            .field("validation_error", &self.validation_error)
            .field("state_change", &self.state_change)
            .field("processing_error", &self.processing_error)
            .finish()
    }
}
