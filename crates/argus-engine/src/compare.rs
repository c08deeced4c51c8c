//! Before/after comparison of two traces, used to judge whether an
//! intervention changed the outcome.

use argus_types::{Event, EventType};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::{Analyzer, RuleKind};
use crate::tree::ExecutionTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Failure => write!(f, "failure"),
        }
    }
}

/// Headline figures of one trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSummary {
    pub total_events: usize,
    pub counts_by_type: BTreeMap<EventType, usize>,
    /// Failure-status events, terminal or not
    pub failure_events: usize,
    pub outcome: Outcome,
    pub rule: Option<RuleKind>,
    pub chain_len: usize,
    pub terminal_error: Option<String>,
}

impl TraceSummary {
    pub fn from_events(events: &[Event], analyzer: &Analyzer) -> Self {
        let tree = ExecutionTree::build(events);
        let analysis = analyzer.analyze(&tree);

        let mut counts_by_type = BTreeMap::new();
        for event in events {
            *counts_by_type.entry(event.event_type).or_insert(0) += 1;
        }

        Self {
            total_events: events.len(),
            counts_by_type,
            failure_events: analysis.failure_events.len(),
            outcome: if analysis.has_failure() {
                Outcome::Failure
            } else {
                Outcome::Success
            },
            rule: analysis.rule,
            chain_len: analysis.failure_chain.len(),
            terminal_error: analysis
                .terminal_failure
                .and_then(|t| tree.event(t.node).error.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceComparison {
    pub before: TraceSummary,
    pub after: TraceSummary,
}

impl TraceComparison {
    /// The failing run now succeeds.
    pub fn is_fixed(&self) -> bool {
        self.before.outcome == Outcome::Failure && self.after.outcome == Outcome::Success
    }

    /// The succeeding run now fails.
    pub fn is_regressed(&self) -> bool {
        self.before.outcome == Outcome::Success && self.after.outcome == Outcome::Failure
    }

    /// Per-type count change (after minus before), for every type seen in
    /// either trace.
    pub fn count_deltas(&self) -> BTreeMap<EventType, i64> {
        let mut deltas = BTreeMap::new();
        for (&kind, &n) in &self.after.counts_by_type {
            *deltas.entry(kind).or_insert(0) += n as i64;
        }
        for (&kind, &n) in &self.before.counts_by_type {
            *deltas.entry(kind).or_insert(0) -= n as i64;
        }
        deltas
    }
}

pub fn compare(before: &[Event], after: &[Event], analyzer: &Analyzer) -> TraceComparison {
    TraceComparison {
        before: TraceSummary::from_events(before, analyzer),
        after: TraceSummary::from_events(after, analyzer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_testing::fixtures;

    #[test]
    fn test_guard_fixes_empty_output_failure() {
        let before = fixtures::empty_output_scenario();
        let after = fixtures::success_scenario();

        let comparison = compare(&before, &after, &Analyzer::default());

        assert!(comparison.is_fixed());
        assert!(!comparison.is_regressed());
        assert_eq!(comparison.before.rule, Some(RuleKind::EmptyOutputPropagation));
        assert_eq!(comparison.before.chain_len, 3);
        assert_eq!(comparison.after.rule, None);
        assert_eq!(comparison.after.chain_len, 0);
    }

    #[test]
    fn test_count_deltas_cover_both_sides() {
        let before = fixtures::empty_output_scenario();
        let comparison = compare(&before, &[], &Analyzer::default());

        let deltas = comparison.count_deltas();
        assert_eq!(deltas.get(&EventType::Termination), Some(&-1));
        assert_eq!(comparison.after.total_events, 0);
        assert_eq!(comparison.after.outcome, Outcome::Success);
    }
}
