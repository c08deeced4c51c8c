use argus_types::Event;
use serde::Serialize;

use crate::tree::{NodeId, TreeNode};

/// How a node takes part in a started/closed span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum SpanRole {
    /// Not part of a span
    Instant,
    /// `started` event that nothing closed
    Open,
    /// `started` event closed by a later event
    Opened { closed_by: NodeId },
    /// Terminal-status event that closes an earlier `started` event
    Closes { opened_by: NodeId },
}

impl SpanRole {
    pub fn is_open(&self) -> bool {
        matches!(self, SpanRole::Open)
    }
}

/// Find the still-open span that `event` closes, if any.
///
/// Two pairings are recognised, checked in this order:
/// - the closer is a child of the `started` event (scoped instrumentation
///   logs the closing event under the opener);
/// - the closer immediately follows the `started` event among the same
///   parent's children.
///
/// Either way the opener must have the same event type.
pub(crate) fn find_open_span(
    nodes: &[TreeNode<'_>],
    event: &Event,
    parent: Option<NodeId>,
    previous_sibling: Option<NodeId>,
) -> Option<NodeId> {
    if !event.status.is_terminal() {
        return None;
    }

    let opens = |candidate: NodeId| {
        let node = &nodes[candidate.index()];
        node.span.is_open() && node.event.event_type == event.event_type
    };

    parent
        .filter(|&p| opens(p))
        .or_else(|| previous_sibling.filter(|&s| opens(s)))
}

#[cfg(test)]
mod tests {
    use crate::tree::{ExecutionTree, NodeId};
    use argus_types::{Event, EventId, EventStatus, EventType, NewEvent};
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use std::time::Duration;

    use super::SpanRole;

    fn at(
        secs: i64,
        id: u64,
        kind: EventType,
        status: EventStatus,
        parent: Option<u64>,
    ) -> Event {
        let base = Utc.with_ymd_and_hms(2025, 12, 14, 0, 0, 0).unwrap();
        NewEvent::new(kind, status)
            .parent_opt(parent.map(EventId::new))
            .into_event(
                EventId::new(id),
                uuid::Uuid::nil(),
                base + ChronoDuration::seconds(secs),
            )
    }

    #[test]
    fn test_sibling_pairing() {
        let events = vec![
            at(0, 1, EventType::Decision, EventStatus::Started, None),
            at(1, 2, EventType::ToolCall, EventStatus::Started, Some(1)),
            at(3, 3, EventType::ToolCall, EventStatus::Success, Some(1)),
        ];
        let tree = ExecutionTree::build(&events);

        assert_eq!(
            tree.node(NodeId::new(1)).span,
            SpanRole::Opened {
                closed_by: NodeId::new(2)
            }
        );
        assert_eq!(
            tree.node(NodeId::new(2)).span,
            SpanRole::Closes {
                opened_by: NodeId::new(1)
            }
        );
        assert_eq!(
            tree.span_duration(NodeId::new(1)),
            Some(Duration::from_secs(2))
        );
        assert_eq!(tree.node(NodeId::new(0)).span, SpanRole::Open);
    }

    #[test]
    fn test_child_closer_pairing() {
        let events = vec![
            at(0, 1, EventType::Decision, EventStatus::Started, None),
            at(1, 2, EventType::LlmCall, EventStatus::Success, Some(1)),
            at(5, 3, EventType::Decision, EventStatus::Success, Some(1)),
        ];
        let tree = ExecutionTree::build(&events);

        assert_eq!(
            tree.node(NodeId::new(0)).span,
            SpanRole::Opened {
                closed_by: NodeId::new(2)
            }
        );
        assert_eq!(tree.node(NodeId::new(1)).span, SpanRole::Instant);
        assert_eq!(
            tree.span_duration(NodeId::new(0)),
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_recorded_duration_wins() {
        let mut events = vec![
            at(0, 1, EventType::ToolCall, EventStatus::Started, None),
            at(9, 2, EventType::ToolCall, EventStatus::Success, Some(1)),
        ];
        events[1].duration = Some(Duration::from_millis(250));
        let tree = ExecutionTree::build(&events);

        assert_eq!(
            tree.span_duration(NodeId::new(0)),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_type_mismatch_does_not_close() {
        let events = vec![
            at(0, 1, EventType::ToolCall, EventStatus::Started, None),
            at(1, 2, EventType::LlmCall, EventStatus::Success, None),
        ];
        let tree = ExecutionTree::build(&events);

        assert_eq!(tree.node(NodeId::new(0)).span, SpanRole::Open);
        assert_eq!(tree.node(NodeId::new(1)).span, SpanRole::Instant);
    }

    #[test]
    fn test_non_adjacent_sibling_does_not_close() {
        let events = vec![
            at(0, 1, EventType::ToolCall, EventStatus::Started, None),
            at(1, 2, EventType::LlmCall, EventStatus::Started, None),
            at(2, 3, EventType::ToolCall, EventStatus::Success, None),
        ];
        let tree = ExecutionTree::build(&events);

        assert_eq!(tree.node(NodeId::new(0)).span, SpanRole::Open);
        assert_eq!(tree.node(NodeId::new(2)).span, SpanRole::Instant);
    }

    #[test]
    fn test_closed_span_is_not_closed_twice() {
        let events = vec![
            at(0, 1, EventType::ToolCall, EventStatus::Started, None),
            at(1, 2, EventType::ToolCall, EventStatus::Success, Some(1)),
            at(2, 3, EventType::ToolCall, EventStatus::Success, Some(1)),
        ];
        let tree = ExecutionTree::build(&events);

        assert_eq!(
            tree.node(NodeId::new(1)).span,
            SpanRole::Closes {
                opened_by: NodeId::new(0)
            }
        );
        assert_eq!(tree.node(NodeId::new(2)).span, SpanRole::Instant);
    }
}
