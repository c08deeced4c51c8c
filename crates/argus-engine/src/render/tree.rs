use argus_types::{Event, EventStatus};

use super::{RenderOptions, format_duration};
use crate::analysis::signals::{self, DEFAULT_COUNT_KEYS};
use crate::span::SpanRole;
use crate::tree::{ExecutionTree, TreeNode};

/// One line per event in depth-first order, indented two spaces per level,
/// each optionally followed by detail lines.
pub fn render_tree(tree: &ExecutionTree<'_>, options: &RenderOptions) -> Vec<String> {
    let mut lines = Vec::with_capacity(tree.len());

    for id in tree.walk() {
        let node = tree.node(id);
        let indent = "  ".repeat(node.depth);

        let mut line = format!(
            "{}#{} {} {}",
            indent,
            id.ordinal(),
            node.event.event_type,
            status_label(node.event.status)
        );
        line.push_str(&span_label(tree, node));

        let hints = hints(node);
        if !hints.is_empty() {
            line.push_str(" | ");
            line.push_str(&hints.join(", "));
        }
        lines.push(line);

        for detail in details(node.event, options) {
            lines.push(format!("{}    -> {}", indent, detail));
        }
    }

    lines
}

fn status_label(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Started => "started",
        EventStatus::Success => "ok",
        EventStatus::Failure => "FAILED",
        EventStatus::Retrying => "retrying",
    }
}

fn span_label(tree: &ExecutionTree<'_>, node: &TreeNode<'_>) -> String {
    match node.span {
        SpanRole::Open => " [open]".to_string(),
        SpanRole::Opened { closed_by } => match tree.span_duration(node.id) {
            Some(duration) => format!(
                " [closed by #{}, {}]",
                closed_by.ordinal(),
                format_duration(duration)
            ),
            None => format!(" [closed by #{}]", closed_by.ordinal()),
        },
        SpanRole::Closes { opened_by } => format!(" [closes #{}]", opened_by.ordinal()),
        SpanRole::Instant => node
            .event
            .duration
            .map(|d| format!(" [{}]", format_duration(d)))
            .unwrap_or_default(),
    }
}

fn hints(node: &TreeNode<'_>) -> Vec<String> {
    let event = node.event;
    let mut hints = Vec::new();

    for key in ["step", "tool"] {
        if let Some(value) = event.metadata_value(key) {
            hints.push(format!("{}: {}", key, value));
        }
    }
    if let Some(n) = signals::retry_count(event) {
        hints.push(format!("retry: {}", n));
    }
    if let Some((key, n)) = signals::output_count(event, &DEFAULT_COUNT_KEYS) {
        hints.push(format!("{}: {}", key, n));
    }
    if let Some(n) = event.input_value("total_results") {
        hints.push(format!("total_results: {}", n));
    }
    if node.is_orphan()
        && let Some(parent) = event.parent_id
    {
        hints.push(format!("parent {} not in trace", parent));
    }

    hints
}

fn details(event: &Event, options: &RenderOptions) -> Vec<String> {
    let mut details = Vec::new();

    if let Some(error) = &event.error {
        details.push(format!("error: {}", error));
    }
    if !options.show_payloads {
        return details;
    }

    for key in ["question", "query"] {
        if let Some(value) = event.input_value(key) {
            details.push(format!("{}: {}", key, value));
        }
    }
    if let Some(queries) = event.output_value("queries") {
        details.push(format!("queries: {}", queries));
    }
    if let Some(selected) = event.output_value("selected_count") {
        details.push(format!("selected: {}", selected));
    }

    details
}
