use std::collections::HashSet;

use crate::span::SpanRole;
use crate::tree::{ExecutionTree, NodeId};

/// Events that can have fed into a terminal failure.
///
/// For a nested terminal that is every event of the terminal's own tree.
/// For a root-level terminal it is the root-level events plus the closers
/// of root-level spans; other roots and their nested work stay out.
pub struct CausalScope<'t, 'a> {
    tree: &'t ExecutionTree<'a>,
    ancestors: HashSet<NodeId>,
}

impl<'t, 'a> CausalScope<'t, 'a> {
    pub fn new(tree: &'t ExecutionTree<'a>, terminal: NodeId) -> Self {
        Self {
            tree,
            ancestors: tree.ancestors(terminal).collect(),
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        let Some(node) = self.tree.get(id) else {
            return false;
        };

        if self.ancestors.is_empty() {
            return match node.span {
                SpanRole::Closes { opened_by } => self.tree.node(opened_by).parent.is_none(),
                _ => node.parent.is_none(),
            };
        }

        self.ancestors.contains(&id) || self.tree.ancestors(id).any(|a| self.ancestors.contains(&a))
    }

    /// Ancestors of the terminal and their direct children (root-level
    /// events for a root-level terminal).
    pub fn on_path(&self, id: NodeId) -> bool {
        let Some(node) = self.tree.get(id) else {
            return false;
        };
        match node.parent {
            Some(parent) => self.ancestors.contains(&parent) || self.ancestors.contains(&id),
            None => self.ancestors.is_empty() || self.ancestors.contains(&id),
        }
    }
}

/// Ordered path of events from the warning signal to the terminal failure.
///
/// Contains the warning, then each event emitted between the two whose
/// parent lies on the terminal's ancestor path (root-level events when the
/// terminal is itself a root) or which is itself such an ancestor, then the
/// terminal. Without a warning the chain is the terminal alone.
pub fn failure_chain(
    tree: &ExecutionTree<'_>,
    warning: Option<NodeId>,
    terminal: NodeId,
) -> Vec<NodeId> {
    let Some(warning) = warning.filter(|w| *w < terminal) else {
        return vec![terminal];
    };

    let scope = CausalScope::new(tree, terminal);

    let mut chain = vec![warning];
    chain.extend(
        (warning.index() + 1..terminal.index())
            .map(NodeId::new)
            .filter(|&id| scope.on_path(id)),
    );
    chain.push(terminal);
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_types::{Event, EventId, EventStatus, EventType, NewEvent};
    use chrono::Utc;

    fn event(id: u64, kind: EventType, parent: Option<u64>) -> Event {
        NewEvent::new(kind, EventStatus::Success)
            .parent_opt(parent.map(EventId::new))
            .into_event(EventId::new(id), uuid::Uuid::nil(), Utc::now())
    }

    fn indices(chain: &[NodeId]) -> Vec<usize> {
        chain.iter().map(NodeId::index).collect()
    }

    #[test]
    fn test_chain_follows_terminal_scope() {
        // 0 root
        // ├─ 1 tool (warning)
        // │  └─ 2 nested detail (off path)
        // ├─ 3 decision
        // └─ 4 terminal
        let events = vec![
            event(1, EventType::Decision, None),
            event(2, EventType::ToolCall, Some(1)),
            event(3, EventType::LlmCall, Some(2)),
            event(4, EventType::Decision, Some(1)),
            event(5, EventType::Termination, Some(1)),
        ];
        let tree = ExecutionTree::build(&events);

        let chain = failure_chain(&tree, Some(NodeId::new(1)), NodeId::new(4));
        assert_eq!(indices(&chain), vec![1, 3, 4]);
    }

    #[test]
    fn test_chain_includes_later_ancestors() {
        let events = vec![
            event(1, EventType::ToolCall, None),
            event(2, EventType::Decision, None),
            event(3, EventType::Termination, Some(2)),
        ];
        let tree = ExecutionTree::build(&events);

        let chain = failure_chain(&tree, Some(NodeId::new(0)), NodeId::new(2));
        assert_eq!(indices(&chain), vec![0, 1, 2]);
    }

    #[test]
    fn test_root_terminal_uses_root_level() {
        let events = vec![
            event(1, EventType::ToolCall, None),
            event(2, EventType::LlmCall, Some(1)),
            event(3, EventType::Decision, None),
            event(4, EventType::Termination, None),
        ];
        let tree = ExecutionTree::build(&events);

        let chain = failure_chain(&tree, Some(NodeId::new(0)), NodeId::new(3));
        assert_eq!(indices(&chain), vec![0, 2, 3]);
    }

    #[test]
    fn test_without_warning() {
        let events = vec![event(1, EventType::Termination, None)];
        let tree = ExecutionTree::build(&events);

        assert_eq!(indices(&failure_chain(&tree, None, NodeId::new(0))), vec![0]);
    }

    #[test]
    fn test_scope_of_nested_terminal_is_its_tree() {
        // 0 root A
        // └─ 1 tool
        // 2 root B
        // ├─ 3 tool
        // │  └─ 4 nested
        // └─ 5 terminal
        let events = vec![
            event(1, EventType::Decision, None),
            event(2, EventType::ToolCall, Some(1)),
            event(3, EventType::Decision, None),
            event(4, EventType::ToolCall, Some(3)),
            event(5, EventType::LlmCall, Some(4)),
            event(6, EventType::Termination, Some(3)),
        ];
        let tree = ExecutionTree::build(&events);
        let scope = CausalScope::new(&tree, NodeId::new(5));

        let inside: Vec<usize> = (0..5).filter(|&i| scope.contains(NodeId::new(i))).collect();
        assert_eq!(inside, vec![2, 3, 4]);
        assert!(!scope.contains(NodeId::new(42)));
    }

    #[test]
    fn test_scope_of_root_terminal_is_root_level() {
        let events = vec![
            event(1, EventType::Decision, None),
            event(2, EventType::ToolCall, Some(1)),
            event(3, EventType::LlmCall, None),
            event(4, EventType::Termination, None),
        ];
        let tree = ExecutionTree::build(&events);
        let scope = CausalScope::new(&tree, NodeId::new(3));

        let inside: Vec<usize> = (0..3).filter(|&i| scope.contains(NodeId::new(i))).collect();
        assert_eq!(inside, vec![0, 2]);
    }
}
