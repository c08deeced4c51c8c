use chrono::SecondsFormat;

use super::event_label;
use crate::analysis::signals::{self, DEFAULT_COUNT_KEYS};
use crate::analysis::{AnalysisResult, EventRef};
use crate::tree::ExecutionTree;

/// Labelled sections: what failed, why, assumption violated, early warning,
/// failure chain.
pub fn render_analysis(tree: &ExecutionTree<'_>, analysis: &AnalysisResult) -> Vec<String> {
    let Some(terminal) = &analysis.terminal_failure else {
        return render_success(tree, analysis);
    };

    let mut lines = vec!["WHAT FAILED:".to_string()];
    let error = tree
        .event(terminal.node)
        .error
        .as_deref()
        .unwrap_or("unknown error");
    lines.push(format!("  {}: {}", event_label(terminal), error));

    lines.push(String::new());
    lines.push("WHY IT FAILED:".to_string());
    match &analysis.explanation {
        Some(explanation) => lines.push(format!("  {}", explanation)),
        None => lines.push("  No root cause could be determined".to_string()),
    }
    if let (Some(root), Some(rule)) = (&analysis.root_cause, &analysis.rule) {
        lines.push(format!("  Root cause: {} [rule: {}]", event_label(root), rule));
    }

    lines.push(String::new());
    lines.push("ASSUMPTION VIOLATED:".to_string());
    match &analysis.assumption_violated {
        Some(assumption) => lines.push(format!("  {}", assumption)),
        None => lines.push("  Unknown: no structural pattern matched this failure".to_string()),
    }

    lines.push(String::new());
    lines.push("EARLY WARNING SIGNAL:".to_string());
    match &analysis.warning_signal {
        Some(warning) => {
            let at = tree
                .event(warning.node)
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true);
            lines.push(format!("  {} at {}", event_label(warning), at));
        }
        None => lines.push("  No early warning identified".to_string()),
    }

    lines.push(String::new());
    lines.extend(render_chain(tree, &analysis.failure_chain));
    lines
}

fn render_success(tree: &ExecutionTree<'_>, analysis: &AnalysisResult) -> Vec<String> {
    let mut lines = vec!["No failures detected in this trace".to_string()];

    if !analysis.failure_events.is_empty() {
        lines.push(format!(
            "Note: {} failure event(s) recorded without a failed termination",
            analysis.failure_events.len()
        ));
        for failure in &analysis.failure_events {
            let error = tree
                .event(failure.node)
                .error
                .as_deref()
                .unwrap_or("unknown error");
            lines.push(format!("  - {}: {}", event_label(failure), error));
        }
    }

    lines.push(String::new());
    lines.extend(render_chain(tree, &analysis.failure_chain));
    lines
}

fn render_chain(tree: &ExecutionTree<'_>, chain: &[EventRef]) -> Vec<String> {
    let mut lines = vec!["FAILURE CHAIN:".to_string()];
    if chain.is_empty() {
        lines.push("  (empty)".to_string());
        return lines;
    }

    for (i, item) in chain.iter().enumerate() {
        let event = tree.event(item.node);
        let mut notes = Vec::new();
        if let Some((key, n)) = signals::output_count(event, &DEFAULT_COUNT_KEYS) {
            notes.push(format!("{}: {}", key, n));
        }
        if let Some(error) = &event.error {
            notes.push(format!("error: {}", error));
        }

        let mut line = format!("  {}. {}", i + 1, event_label(item));
        if !notes.is_empty() {
            line.push_str(" | ");
            line.push_str(&notes.join(", "));
        }
        lines.push(line);
    }

    lines
}
