//! Deterministic text rendering of execution trees and analysis results.
//!
//! Every function here is pure: the same input always yields the same
//! lines. No color, no clock, no environment lookups.

mod analysis;
mod compare;
mod tree;

pub use analysis::render_analysis;
pub use compare::render_comparison;
pub use tree::render_tree;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::analysis::{AnalysisResult, EventRef};
use crate::tree::ExecutionTree;

const RULE: &str = "============================================================";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Show selected input/output fields under each event
    #[serde(default = "default_show_payloads")]
    pub show_payloads: bool,
}

fn default_show_payloads() -> bool {
    true
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_payloads: default_show_payloads(),
        }
    }
}

/// Tree view followed by the analysis, each under a header.
pub fn render_report(
    tree: &ExecutionTree<'_>,
    analysis: &AnalysisResult,
    options: &RenderOptions,
) -> Vec<String> {
    let mut lines = vec!["EXECUTION TRACE".to_string(), RULE.to_string()];
    if tree.is_empty() {
        lines.push("(no events recorded)".to_string());
    } else {
        lines.extend(render_tree(tree, options));
    }

    lines.push(String::new());
    lines.push("ROOT-CAUSE ANALYSIS".to_string());
    lines.push(RULE.to_string());
    lines.extend(render_analysis(tree, analysis));
    lines
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 1.0 {
        format!("{:.1}ms", secs * 1000.0)
    } else {
        format!("{:.3}s", secs)
    }
}

pub(crate) fn event_label(event: &EventRef) -> String {
    format!(
        "#{} {} ({})",
        event.node.ordinal(),
        event.event_type,
        event.status
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(1500)), "1.5ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.500s");
        assert_eq!(format_duration(Duration::ZERO), "0.0ms");
    }
}
