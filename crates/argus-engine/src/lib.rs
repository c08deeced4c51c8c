// Engine module - Core inspection logic (tree reconstruction, analysis, rendering)
// This layer sits between recorded events (types) and the runtime/CLI surfaces

pub mod analysis;
pub mod compare;
pub mod diagnostics;
pub mod render;
pub mod span;
pub mod tree;

pub use analysis::{AnalysisResult, Analyzer, AnalyzerConfig, EventRef, RootCauseRule, RuleKind};
pub use compare::{Outcome, TraceComparison, TraceSummary, compare};
pub use diagnostics::{IssueKind, TraceIssue, check_trace};
pub use render::{RenderOptions, render_analysis, render_comparison, render_report, render_tree};
pub use span::SpanRole;
pub use tree::{ExecutionTree, NodeId, TreeNode};

use argus_types::Event;
use serde::Serialize;

// Façade API - Stable public interface for the runtime and CLI layers

/// Build tree, analyze, render, in one configured pipeline.
#[derive(Default)]
pub struct Inspector {
    analyzer: Analyzer,
    render: RenderOptions,
}

/// Everything one inspection derives from a trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectionReport {
    pub total_events: usize,
    pub roots: usize,
    pub analysis: AnalysisResult,
    pub issues: Vec<TraceIssue>,
    /// Rendered text, one entry per line
    pub lines: Vec<String>,
}

impl InspectionReport {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Inspector {
    pub fn new(config: AnalyzerConfig, render: RenderOptions) -> Self {
        Self {
            analyzer: Analyzer::new(config),
            render,
        }
    }

    /// Use a caller-built analyzer, e.g. one with extra rules.
    pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn report(&self, events: &[Event]) -> InspectionReport {
        let tree = ExecutionTree::build(events);
        let analysis = self.analyzer.analyze(&tree);
        let lines = render_report(&tree, &analysis, &self.render);

        InspectionReport {
            total_events: tree.len(),
            roots: tree.roots().len(),
            analysis,
            issues: check_trace(events),
            lines,
        }
    }

    /// Rendered tree and analysis, lines joined with `\n`.
    pub fn inspect(&self, events: &[Event]) -> String {
        let tree = ExecutionTree::build(events);
        let analysis = self.analyzer.analyze(&tree);
        render_report(&tree, &analysis, &self.render).join("\n")
    }

    pub fn compare(&self, before: &[Event], after: &[Event]) -> TraceComparison {
        compare(before, after, &self.analyzer)
    }
}

/// Inspect with default analyzer and render settings.
pub fn inspect(events: &[Event]) -> String {
    Inspector::default().inspect(events)
}
