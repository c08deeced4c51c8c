use argus_types::{Event, EventId};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::span::{SpanRole, find_open_span};

/// Position of a node in the tree, equal to the event's position in the
/// input sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Zero-based position in emission order.
    pub fn index(&self) -> usize {
        self.0
    }

    /// One-based position, as shown to users (`#3`).
    pub fn ordinal(&self) -> usize {
        self.0 + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode<'a> {
    pub id: NodeId,
    pub event: &'a Event,
    /// Resolved parent; None for roots, including events whose parent_id
    /// could not be resolved.
    pub parent: Option<NodeId>,
    /// Children in emission order
    pub children: Vec<NodeId>,
    pub depth: usize,
    pub span: SpanRole,
}

impl TreeNode<'_> {
    /// parent_id was set but did not resolve to an earlier event.
    pub fn is_orphan(&self) -> bool {
        self.event.parent_id.is_some() && self.parent.is_none()
    }
}

/// Forest of execution trees derived from a flat event sequence.
///
/// Borrowed from the input; rebuilt for every inspection and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionTree<'a> {
    nodes: Vec<TreeNode<'a>>,
    roots: Vec<NodeId>,
}

impl<'a> ExecutionTree<'a> {
    /// Build the forest in a single pass over events in emission order.
    ///
    /// A parent must appear before its children; a parent that is missing,
    /// appears later, or is the event itself demotes the event to a root.
    /// When ids collide the first occurrence owns the id for lookups.
    pub fn build(events: &'a [Event]) -> Self {
        let mut nodes: Vec<TreeNode<'a>> = Vec::with_capacity(events.len());
        let mut roots = Vec::new();
        let mut index: HashMap<EventId, NodeId> = HashMap::with_capacity(events.len());

        for (position, event) in events.iter().enumerate() {
            let id = NodeId(position);
            let parent = event.parent_id.and_then(|pid| index.get(&pid).copied());

            let (depth, previous_sibling) = match parent {
                Some(p) => (nodes[p.0].depth + 1, nodes[p.0].children.last().copied()),
                None => (0, roots.last().copied()),
            };

            let mut span = if event.status.is_terminal() {
                SpanRole::Instant
            } else {
                SpanRole::Open
            };

            if let Some(opener) = find_open_span(&nodes, event, parent, previous_sibling) {
                nodes[opener.0].span = SpanRole::Opened { closed_by: id };
                span = SpanRole::Closes { opened_by: opener };
            }

            nodes.push(TreeNode {
                id,
                event,
                parent,
                children: Vec::new(),
                depth,
                span,
            });

            match parent {
                Some(p) => nodes[p.0].children.push(id),
                None => roots.push(id),
            }

            index.entry(event.id).or_insert(id);
        }

        tracing::debug!(
            events = nodes.len(),
            roots = roots.len(),
            "built execution tree"
        );

        Self { nodes, roots }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn nodes(&self) -> &[TreeNode<'a>] {
        &self.nodes
    }

    /// Panics if `id` did not come from this tree.
    pub fn node(&self, id: NodeId) -> &TreeNode<'a> {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode<'a>> {
        self.nodes.get(id.0)
    }

    pub fn event(&self, id: NodeId) -> &'a Event {
        self.nodes[id.0].event
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, 'a> {
        Ancestors {
            tree: self,
            next: self.get(id).and_then(|n| n.parent),
        }
    }

    /// Depth-first, pre-order traversal: roots in emission order, each
    /// followed by its subtree.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }

        order
    }

    /// First `termination` event that failed.
    pub fn terminal_failure(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.event.is_terminal_failure())
            .map(|n| n.id)
    }

    /// Elapsed time of the span opened by `id`.
    ///
    /// Prefers the duration recorded on the closing event and falls back to
    /// the timestamp difference. None for open spans and for closers that
    /// precede their opener in time.
    pub fn span_duration(&self, id: NodeId) -> Option<Duration> {
        let node = self.get(id)?;
        match node.span {
            SpanRole::Opened { closed_by } => {
                let closer = self.event(closed_by);
                closer.duration.or_else(|| {
                    closer
                        .timestamp
                        .signed_duration_since(node.event.timestamp)
                        .to_std()
                        .ok()
                })
            }
            _ => None,
        }
    }
}

pub struct Ancestors<'t, 'a> {
    tree: &'t ExecutionTree<'a>,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_, '_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.node(current).parent;
        Some(current)
    }
}
