use argus_types::{Event, EventId, EventStatus, EventType, NewEvent, Payload, ValidationError};
use std::fmt;
use std::time::Instant;

use crate::logger::EventLogger;
use crate::Result;

const DROPPED_ERROR: &str = "scope exited before completion";
const PANICKED_ERROR: &str = "scope panicked before completion";

/// Scoped instrumentation for a block of agent code.
///
/// Starting the tracer logs a `started` event; the returned [`TraceScope`]
/// logs exactly one closing event, parented to the started event and
/// carrying the measured duration, however the scope ends.
///
/// ```no_run
/// use argus_runtime::{EventLogger, Tracer};
/// use argus_types::{EventType, payload};
///
/// let logger = EventLogger::new();
/// let count = Tracer::new(&logger, EventType::ToolCall)
///     .input(payload([("query", "rust tracing")]))
///     .run(|scope| {
///         let results: Vec<String> = Vec::new();
///         scope.set_output(payload([("results_count", results.len())]));
///         Ok::<_, std::io::Error>(results.len())
///     })
///     .unwrap();
/// ```
pub struct Tracer<'l> {
    logger: &'l EventLogger,
    event_type: EventType,
    parent_id: Option<EventId>,
    input: Option<Payload>,
    metadata: Option<Payload>,
}

impl<'l> Tracer<'l> {
    pub fn new(logger: &'l EventLogger, event_type: EventType) -> Self {
        Self {
            logger,
            event_type,
            parent_id: None,
            input: None,
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

    /// Input summary, recorded on the started event.
    pub fn input(mut self, input: Payload) -> Self {
        self.input = Some(input);
        self
    }

    /// Metadata, recorded on both the started and the closing event.
    pub fn metadata(mut self, metadata: Payload) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Log the `started` event and open the scope.
    pub fn start(self) -> std::result::Result<TraceScope<'l>, ValidationError> {
        let mut draft = NewEvent::new(self.event_type, EventStatus::Started)
            .parent_opt(self.parent_id);
        draft.input_summary = self.input;
        draft.metadata = self.metadata.clone();

        let started = self.logger.log_event(draft)?;

        Ok(TraceScope {
            logger: self.logger,
            started,
            clock: Instant::now(),
            metadata: self.metadata,
            output: None,
            closed: false,
        })
    }

    /// Run `f` inside a scope and close it from the result: `Ok` logs a
    /// success, `Err` logs a failure with the error's display text.
    ///
    /// The outer `Result` reports logging problems; the inner one is `f`'s
    /// own result, passed through untouched.
    pub fn run<T, E, F>(self, f: F) -> Result<std::result::Result<T, E>>
    where
        E: fmt::Display,
        F: FnOnce(&mut TraceScope<'l>) -> std::result::Result<T, E>,
    {
        let mut scope = self.start()?;
        let outcome = f(&mut scope);

        match &outcome {
            Ok(_) => scope.succeed()?,
            Err(err) => scope.fail(err.to_string())?,
        };

        Ok(outcome)
    }
}

/// Open span created by [`Tracer::start`].
///
/// Close it with [`succeed`](Self::succeed) or [`fail`](Self::fail).
/// Dropping it unclosed (early return, `?`, panic) logs a failure.
pub struct TraceScope<'l> {
    logger: &'l EventLogger,
    started: Event,
    clock: Instant,
    metadata: Option<Payload>,
    output: Option<Payload>,
    closed: bool,
}

impl TraceScope<'_> {
    /// Id of the started event, for parenting nested events.
    pub fn id(&self) -> EventId {
        self.started.id
    }

    pub fn started(&self) -> &Event {
        &self.started
    }

    /// Output summary for the closing event. Only recorded on success.
    pub fn set_output(&mut self, output: Payload) {
        self.output = Some(output);
    }

    pub fn succeed(mut self) -> std::result::Result<Event, ValidationError> {
        self.close(EventStatus::Success, None)
    }

    pub fn fail(mut self, error: impl Into<String>) -> std::result::Result<Event, ValidationError> {
        self.close(EventStatus::Failure, Some(error.into()))
    }

    fn close(
        &mut self,
        status: EventStatus,
        error: Option<String>,
    ) -> std::result::Result<Event, ValidationError> {
        self.closed = true;

        let mut draft = NewEvent::new(self.started.event_type, status)
            .parent(self.started.id)
            .duration(self.clock.elapsed());
        draft.metadata = self.metadata.take();
        draft.error = error;
        if status == EventStatus::Success {
            draft.output_summary = self.output.take();
        }

        self.logger.log_event(draft)
    }
}

impl Drop for TraceScope<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        let error = if std::thread::panicking() {
            PANICKED_ERROR
        } else {
            DROPPED_ERROR
        };
        tracing::debug!(id = %self.started.id, error, "closing abandoned trace scope");

        if let Err(err) = self.close(EventStatus::Failure, Some(error.to_string())) {
            tracing::warn!(id = %self.started.id, %err, "failed to close trace scope");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_types::payload;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[test]
    fn test_succeed_logs_pair() {
        let logger = EventLogger::new();
        let mut scope = Tracer::new(&logger, EventType::ToolCall)
            .input(payload([("query", "rust")]))
            .metadata(payload([("tool", "search")]))
            .start()
            .unwrap();
        scope.set_output(payload([("results_count", 2)]));
        let closer = scope.succeed().unwrap();

        let events = logger.get_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].status, EventStatus::Started);
        assert_eq!(events[0].duration, None);
        assert_eq!(closer.status, EventStatus::Success);
        assert_eq!(closer.parent_id, Some(events[0].id));
        assert!(closer.duration.is_some());
        assert_eq!(closer.input_summary, None);
        assert_eq!(closer.output_summary, Some(payload([("results_count", 2)])));
        assert_eq!(closer.metadata, Some(payload([("tool", "search")])));
    }

    #[test]
    fn test_fail_records_error_not_output() {
        let logger = EventLogger::new();
        let mut scope = Tracer::new(&logger, EventType::LlmCall).start().unwrap();
        scope.set_output(payload([("partial", true)]));
        let closer = scope.fail("rate limited").unwrap();

        assert_eq!(closer.status, EventStatus::Failure);
        assert_eq!(closer.error.as_deref(), Some("rate limited"));
        assert_eq!(closer.output_summary, None);
    }

    #[test]
    fn test_run_maps_result() {
        let logger = EventLogger::new();

        let ok = Tracer::new(&logger, EventType::Decision)
            .run(|scope| {
                scope.set_output(payload([("selected_count", 3)]));
                Ok::<_, String>(3)
            })
            .unwrap();
        assert_eq!(ok, Ok(3));

        let err = Tracer::new(&logger, EventType::ToolCall)
            .run(|_| Err::<(), _>("connection refused"))
            .unwrap();
        assert_eq!(err, Err("connection refused"));

        let events = logger.get_events();
        let statuses: Vec<_> = events.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                EventStatus::Started,
                EventStatus::Success,
                EventStatus::Started,
                EventStatus::Failure
            ]
        );
        assert_eq!(events[3].error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_drop_without_close_logs_failure() {
        let logger = EventLogger::new();

        fn lookup(logger: &EventLogger, key: Option<&str>) -> Option<usize> {
            let _scope = Tracer::new(logger, EventType::ToolCall).start().ok()?;
            let key = key?;
            Some(key.len())
        }
        assert_eq!(lookup(&logger, None), None);

        let events = logger.get_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].status, EventStatus::Failure);
        assert_eq!(events[1].error.as_deref(), Some(DROPPED_ERROR));
        assert_eq!(events[1].parent_id, Some(events[0].id));
    }

    #[test]
    fn test_panic_inside_scope_logs_failure() {
        let logger = EventLogger::new();

        let result = catch_unwind(AssertUnwindSafe(|| {
            let _scope = Tracer::new(&logger, EventType::LlmCall).start().unwrap();
            panic!("model crashed");
        }));
        assert!(result.is_err());

        let events = logger.get_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].error.as_deref(), Some(PANICKED_ERROR));
    }

    #[test]
    fn test_unknown_parent_is_rejected_at_start() {
        let logger = EventLogger::new();
        let result = Tracer::new(&logger, EventType::ToolCall)
            .parent(EventId::new(5))
            .start();

        assert!(matches!(result, Err(ValidationError::UnknownParent(_))));
        assert!(logger.is_empty());
    }
}
