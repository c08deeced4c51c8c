use argus_types::{Event, EventId, EventStatus};
use serde::Serialize;
use std::collections::HashSet;

use crate::span::SpanRole;
use crate::tree::ExecutionTree;

/// Category of structural problem found in a trace.
///
/// Traces written by a single logger never contain these; they show up in
/// hand-edited, merged or truncated files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Id already used by an earlier event.
    DuplicateId,
    /// parent_id does not resolve to an earlier event.
    DanglingParent,
    /// Timestamp earlier than the previous event's.
    TimestampRegression,
    /// `started` event with no matching closer.
    UnterminatedSpan,
    /// error set without failure status, or the reverse.
    StatusMismatch,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::DuplicateId => write!(f, "duplicate_id"),
            IssueKind::DanglingParent => write!(f, "dangling_parent"),
            IssueKind::TimestampRegression => write!(f, "timestamp_regression"),
            IssueKind::UnterminatedSpan => write!(f, "unterminated_span"),
            IssueKind::StatusMismatch => write!(f, "status_mismatch"),
        }
    }
}

/// One problem, located by the event's 1-based position in the trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceIssue {
    pub kind: IssueKind,
    pub position: usize,
    pub event_id: EventId,
    pub message: String,
}

impl std::fmt::Display for TraceIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} [{}] {}", self.position, self.kind, self.message)
    }
}

/// Check a trace for structural problems.
///
/// Issues come back ordered by position, then kind.
pub fn check_trace(events: &[Event]) -> Vec<TraceIssue> {
    let mut issues = Vec::new();
    let mut seen: HashSet<EventId> = HashSet::with_capacity(events.len());

    for (index, event) in events.iter().enumerate() {
        let position = index + 1;
        let issue = |kind, message: String| TraceIssue {
            kind,
            position,
            event_id: event.id,
            message,
        };

        if seen.contains(&event.id) {
            issues.push(issue(
                IssueKind::DuplicateId,
                format!("id {} already used by an earlier event", event.id),
            ));
        }

        if let Some(parent) = event.parent_id
            && !seen.contains(&parent)
        {
            let message = if parent == event.id {
                format!("event {} names itself as parent", event.id)
            } else if events[index + 1..].iter().any(|e| e.id == parent) {
                format!("parent {} appears later in the trace", parent)
            } else {
                format!("parent {} not in trace", parent)
            };
            issues.push(issue(IssueKind::DanglingParent, message));
        }

        if index > 0 && event.timestamp < events[index - 1].timestamp {
            issues.push(issue(
                IssueKind::TimestampRegression,
                format!(
                    "timestamp {} is earlier than the previous event",
                    event.timestamp.to_rfc3339()
                ),
            ));
        }

        match (event.status, &event.error) {
            (EventStatus::Failure, None) => issues.push(issue(
                IssueKind::StatusMismatch,
                "failure status without an error message".to_string(),
            )),
            (status, Some(_)) if status != EventStatus::Failure => issues.push(issue(
                IssueKind::StatusMismatch,
                format!("error message on an event with status {}", status),
            )),
            _ => {}
        }

        seen.insert(event.id);
    }

    let tree = ExecutionTree::build(events);
    for node in tree.nodes() {
        if node.span == SpanRole::Open {
            issues.push(TraceIssue {
                kind: IssueKind::UnterminatedSpan,
                position: node.id.ordinal(),
                event_id: node.event.id,
                message: format!("{} started but never closed", node.event.event_type),
            });
        }
    }

    issues.sort_by_key(|i| (i.position, i.kind));
    if !issues.is_empty() {
        tracing::debug!(issues = issues.len(), "trace check found problems");
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_types::{EventType, NewEvent};
    use chrono::{TimeZone, Utc};

    fn at(id: u64, second: u32, draft: NewEvent) -> Event {
        draft.into_event(
            EventId::new(id),
            uuid::Uuid::nil(),
            Utc.with_ymd_and_hms(2025, 12, 14, 9, 0, second).unwrap(),
        )
    }

    fn kinds(issues: &[TraceIssue]) -> Vec<(usize, IssueKind)> {
        issues.iter().map(|i| (i.position, i.kind)).collect()
    }

    #[test]
    fn test_clean_trace() {
        let events = vec![
            at(1, 0, NewEvent::new(EventType::ToolCall, EventStatus::Started)),
            at(
                2,
                1,
                NewEvent::new(EventType::ToolCall, EventStatus::Success).parent(EventId::new(1)),
            ),
        ];
        assert!(check_trace(&events).is_empty());
    }

    #[test]
    fn test_reports_each_problem() {
        let mut mismatched = at(4, 3, NewEvent::new(EventType::Decision, EventStatus::Success));
        mismatched.error = Some("stale error".to_string());

        let events = vec![
            at(1, 5, NewEvent::new(EventType::LlmCall, EventStatus::Started)),
            at(1, 6, NewEvent::new(EventType::Decision, EventStatus::Success)),
            at(
                3,
                2,
                NewEvent::new(EventType::ToolCall, EventStatus::Success).parent(EventId::new(42)),
            ),
            mismatched,
        ];

        let issues = check_trace(&events);
        assert_eq!(
            kinds(&issues),
            vec![
                (1, IssueKind::UnterminatedSpan),
                (2, IssueKind::DuplicateId),
                (3, IssueKind::DanglingParent),
                (3, IssueKind::TimestampRegression),
                (4, IssueKind::StatusMismatch),
            ]
        );
        assert_eq!(issues[2].message, "parent 42 not in trace");
        assert_eq!(issues[2].to_string(), "#3 [dangling_parent] parent 42 not in trace");
    }

    #[test]
    fn test_forward_parent_is_named() {
        let events = vec![
            at(
                1,
                0,
                NewEvent::new(EventType::ToolCall, EventStatus::Success).parent(EventId::new(2)),
            ),
            at(2, 1, NewEvent::new(EventType::Decision, EventStatus::Success)),
        ];

        let issues = check_trace(&events);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "parent 2 appears later in the trace");
    }
}
