//! Canned traces for tests.
//!
//! Every fixture uses the same session id and a fixed clock (one event every
//! 500ms from 2025-12-14T09:00:00Z), so rendered output is reproducible.

use anyhow::Result;
use argus_types::{Event, EventId, EventStatus, EventType, NewEvent, Value, payload};
use chrono::{DateTime, TimeDelta, Utc};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

pub const FIXTURE_SESSION: Uuid = Uuid::from_u128(0x6172_6775_7300_4000_8000_0000_0000_0001);

/// 2025-12-14T09:00:00Z
pub const FIXTURE_EPOCH_SECS: i64 = 1_765_702_800;

pub const FIXTURE_STEP_MS: i64 = 500;

/// Stamps ids (from 1) and clock ticks onto drafts, skipping validation so
/// malformed traces can be built too.
pub struct TraceBuilder {
    start: DateTime<Utc>,
    events: Vec<Event>,
}

impl Default for TraceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self {
            start: DateTime::from_timestamp(FIXTURE_EPOCH_SECS, 0).unwrap(),
            events: Vec::new(),
        }
    }

    pub fn push(mut self, draft: NewEvent) -> Self {
        let n = self.events.len();
        let id = EventId::new(n as u64 + 1);
        let timestamp = self.start + TimeDelta::milliseconds(FIXTURE_STEP_MS * n as i64);
        self.events
            .push(draft.into_event(id, FIXTURE_SESSION, timestamp));
        self
    }

    pub fn build(self) -> Vec<Event> {
        self.events
    }
}

fn draft(kind: EventType, status: EventStatus, parent: Option<u64>) -> NewEvent {
    NewEvent::new(kind, status).parent_opt(parent.map(EventId::new))
}

/// The canonical empty-output failure:
///
/// ```text
/// 1 decision(started)
/// 2 tool_call(started, parent=1)
/// 3 tool_call(success, parent=1, count=0)
/// 4 decision(success, parent=1, count=0)
/// 5 termination(failure, parent=1, "list index out of range")
/// ```
///
/// Root cause and warning are event 3; the chain is 3, 4, 5.
pub fn empty_output_scenario() -> Vec<Event> {
    TraceBuilder::new()
        .push(draft(EventType::Decision, EventStatus::Started, None))
        .push(
            draft(EventType::ToolCall, EventStatus::Started, Some(1))
                .input(payload([("query", "agent observability tools")])),
        )
        .push(
            draft(EventType::ToolCall, EventStatus::Success, Some(1))
                .output(payload([("count", 0)])),
        )
        .push(
            draft(EventType::Decision, EventStatus::Success, Some(1))
                .output(payload([("count", 0)])),
        )
        .push(
            draft(EventType::Termination, EventStatus::Failure, Some(1))
                .error("list index out of range"),
        )
        .build()
}

/// A search tool failing on every attempt until the retry ceiling (3) is
/// reached:
///
/// ```text
///  1 decision(started)
///  2 tool_call(started, parent=1)
///  3 tool_call(failure, parent=1)
///  4 retry(retrying, parent=1, retry_count=1)
///  5 tool_call(failure, parent=1)
///  6 retry(retrying, parent=1, retry_count=2)
///  7 tool_call(failure, parent=1)
///  8 retry(retrying, parent=1, retry_count=3)
///  9 tool_call(failure, parent=1)
/// 10 termination(failure, parent=1)
/// ```
///
/// Root cause is event 8, warning is event 4.
pub fn retry_exhaustion_scenario() -> Vec<Event> {
    let timeout = || {
        draft(EventType::ToolCall, EventStatus::Failure, Some(1))
            .error("search backend timed out")
    };
    let retry = |n: i64| {
        draft(EventType::Retry, EventStatus::Retrying, Some(1)).metadata(payload([
            ("retry_count", Value::from(n)),
            ("max_retries", Value::from(3)),
            ("tool", Value::from("web_search")),
        ]))
    };

    TraceBuilder::new()
        .push(draft(EventType::Decision, EventStatus::Started, None))
        .push(
            draft(EventType::ToolCall, EventStatus::Started, Some(1))
                .input(payload([("query", "agent observability tools")]))
                .metadata(payload([("tool", "web_search")])),
        )
        .push(timeout())
        .push(retry(1))
        .push(timeout())
        .push(retry(2))
        .push(timeout())
        .push(retry(3))
        .push(timeout())
        .push(
            draft(EventType::Termination, EventStatus::Failure, Some(1))
                .error("search unavailable after 3 retries"),
        )
        .build()
}

/// A complete run with every span closed and no failure.
pub fn success_scenario() -> Vec<Event> {
    TraceBuilder::new()
        .push(
            draft(EventType::Decision, EventStatus::Started, None)
                .input(payload([("question", "What is agent observability?")]))
                .metadata(payload([("step", "run_agent")])),
        )
        .push(draft(EventType::LlmCall, EventStatus::Started, Some(1)))
        .push(
            draft(EventType::LlmCall, EventStatus::Success, Some(2))
                .duration(Duration::from_millis(120))
                .output(payload([(
                    "queries",
                    Value::from(vec!["agent tracing", "llm observability"]),
                )])),
        )
        .push(
            draft(EventType::ToolCall, EventStatus::Started, Some(1))
                .input(payload([("query", "agent tracing")]))
                .metadata(payload([("tool", "web_search")])),
        )
        .push(
            draft(EventType::ToolCall, EventStatus::Success, Some(4))
                .duration(Duration::from_millis(340))
                .output(payload([("results_count", 3)])),
        )
        .push(draft(EventType::Decision, EventStatus::Started, Some(1)))
        .push(
            draft(EventType::Decision, EventStatus::Success, Some(6))
                .output(payload([("selected_count", 2)])),
        )
        .push(draft(EventType::Termination, EventStatus::Success, Some(1)))
        .push(draft(EventType::Decision, EventStatus::Success, Some(1)))
        .build()
}

/// Write events as JSON Lines, one record per line.
pub fn write_jsonl(path: &Path, events: &[Event]) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    for event in events {
        serde_json::to_writer(&mut file, event)?;
        file.write_all(b"\n")?;
    }
    Ok(())
}
