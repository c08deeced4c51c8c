use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use super::kind::{EventStatus, EventType};
use super::value::{Payload, Value};
use crate::error::ValidationError;

// NOTE: Correlation Model
//
// Events form a flat, append-only sequence. `parent_id` is a back-reference
// (relation + lookup), never ownership: the execution tree is rebuilt from the
// flat sequence at inspection time and is never persisted. A parent that is
// missing from the sequence demotes the child to a root.
//
// `id` values are allocated by the logger from a per-session counter, so they
// are unique and ordered by creation. Loaded data may violate both properties;
// the engine tolerates that.

/// Identifier of an event, unique within one logger session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One immutable record of an agent action or state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID (monotonic within a session)
    pub id: EventId,

    /// Logger session that produced the event
    pub session_id: Uuid,

    /// Creation time (UTC), non-decreasing within a session
    pub timestamp: DateTime<Utc>,

    pub event_type: EventType,

    pub status: EventStatus,

    /// Logically enclosing event; None for top-level events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<EventId>,

    /// Elapsed time of the span this event closes
    #[serde(
        default,
        rename = "duration_ns",
        skip_serializing_if = "Option::is_none",
        with = "crate::util::duration_nanos"
    )]
    pub duration: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_summary: Option<Payload>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_summary: Option<Payload>,

    /// Human-readable error; set exactly when status is failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Open annotation bag (step names, tool names, retry counters, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Payload>,
}

impl Event {
    pub fn is_failure(&self) -> bool {
        self.status == EventStatus::Failure
    }

    /// A `termination` event with failure status.
    pub fn is_terminal_failure(&self) -> bool {
        self.event_type == EventType::Termination && self.is_failure()
    }

    pub fn input_value(&self, key: &str) -> Option<&Value> {
        self.input_summary.as_ref().and_then(|p| p.get(key))
    }

    pub fn output_value(&self, key: &str) -> Option<&Value> {
        self.output_summary.as_ref().and_then(|p| p.get(key))
    }

    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.as_ref().and_then(|p| p.get(key))
    }
}

/// Caller-supplied part of an event, before the logger assigns identity
/// and time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub event_type: EventType,
    pub status: EventStatus,
    pub parent_id: Option<EventId>,
    pub duration: Option<Duration>,
    pub input_summary: Option<Payload>,
    pub output_summary: Option<Payload>,
    pub error: Option<String>,
    pub metadata: Option<Payload>,
}

impl NewEvent {
    pub fn new(event_type: EventType, status: EventStatus) -> Self {
        Self {
            event_type,
            status,
            parent_id: None,
            duration: None,
            input_summary: None,
            output_summary: None,
            error: None,
            metadata: None,
        }
    }

    pub fn parent(mut self, parent_id: EventId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn parent_opt(mut self, parent_id: Option<EventId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn input(mut self, input: Payload) -> Self {
        self.input_summary = Some(input);
        self
    }

    pub fn output(mut self, output: Payload) -> Self {
        self.output_summary = Some(output);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn metadata(mut self, metadata: Payload) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Check the status/error pairing and span fields.
    ///
    /// Parent resolution depends on logger state and is checked there.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.status, &self.error) {
            (EventStatus::Failure, None) => return Err(ValidationError::FailureWithoutError),
            (status, Some(_)) if status != EventStatus::Failure => {
                return Err(ValidationError::ErrorWithoutFailure { status });
            }
            _ => {}
        }

        if self.status == EventStatus::Started && self.duration.is_some() {
            return Err(ValidationError::DurationOnOpenSpan);
        }

        let payloads = [
            ("input_summary", &self.input_summary),
            ("output_summary", &self.output_summary),
            ("metadata", &self.metadata),
        ];
        for (field, payload) in payloads {
            if payload
                .as_ref()
                .is_some_and(|p| !p.values().all(Value::is_finite))
            {
                return Err(ValidationError::NonFiniteNumber { field });
            }
        }

        Ok(())
    }

    /// Stamp identity and time onto the draft.
    pub fn into_event(self, id: EventId, session_id: Uuid, timestamp: DateTime<Utc>) -> Event {
        Event {
            id,
            session_id,
            timestamp,
            event_type: self.event_type,
            status: self.status,
            parent_id: self.parent_id,
            duration: self.duration,
            input_summary: self.input_summary,
            output_summary: self.output_summary,
            error: self.error,
            metadata: self.metadata,
        }
    }
}
