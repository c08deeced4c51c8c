use argus_types::{Event, EventId, NewEvent, ValidationError};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Append-only recorder for one agent session.
///
/// Id allocation, timestamping and the append happen under one lock, so
/// concurrent callers never see duplicate ids and timestamps never go
/// backwards in emission order. There is no global instance: construct a
/// logger and pass it to whatever needs to record.
pub struct EventLogger {
    session_id: Uuid,
    state: Mutex<LoggerState>,
}

struct LoggerState {
    next_id: u64,
    last_timestamp: Option<DateTime<Utc>>,
    events: Vec<Event>,
    known: HashSet<EventId>,
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLogger {
    /// Logger with a fresh random session id.
    pub fn new() -> Self {
        Self::with_session(Uuid::new_v4())
    }

    pub fn with_session(session_id: Uuid) -> Self {
        Self {
            session_id,
            state: Mutex::new(LoggerState {
                next_id: 1,
                last_timestamp: None,
                events: Vec::new(),
                known: HashSet::new(),
            }),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    // A panic while holding the lock cannot leave the state half-written:
    // every mutation below happens after the last fallible step.
    fn lock(&self) -> MutexGuard<'_, LoggerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Validate, stamp and append an event, returning the stored record.
    ///
    /// Fails fast on inconsistent status/error pairs, on NaN or infinite
    /// payload numbers, and on a parent that this logger has not recorded.
    pub fn log_event(&self, draft: NewEvent) -> Result<Event, ValidationError> {
        draft.validate()?;

        let mut state = self.lock();

        if let Some(parent) = draft.parent_id
            && !state.known.contains(&parent)
        {
            return Err(ValidationError::UnknownParent(parent));
        }

        let id = EventId::new(state.next_id);
        let now = Utc::now();
        let timestamp = match state.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };

        let event = draft.into_event(id, self.session_id, timestamp);

        state.next_id += 1;
        state.last_timestamp = Some(timestamp);
        state.known.insert(id);
        state.events.push(event.clone());

        tracing::trace!(
            id = %id,
            event_type = %event.event_type,
            status = %event.status,
            "event logged"
        );

        Ok(event)
    }

    /// Snapshot of all events in emission order.
    pub fn get_events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().events.is_empty()
    }

    /// Drop recorded events. Ids keep counting up, so events logged after a
    /// clear never reuse an id from before it.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.events.clear();
        state.known.clear();
    }
}
