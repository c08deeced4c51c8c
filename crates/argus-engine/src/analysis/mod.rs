mod chain;
pub mod rules;
pub mod signals;

pub use chain::failure_chain;
pub use rules::{
    EmptyOutputPropagation, Finding, RetryExhaustion, RootCauseRule, RuleKind,
    UnclassifiedFailure,
};

use argus_types::{EventId, EventStatus, EventType};
use serde::{Deserialize, Serialize};

use crate::tree::{ExecutionTree, NodeId};

/// Tunables for the root-cause heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Retry ceiling used when a retry event does not carry its own
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Output keys that report a collection size, in lookup order
    #[serde(default = "default_count_keys")]
    pub count_keys: Vec<String>,
}

fn default_max_retries() -> u32 {
    3
}

fn default_count_keys() -> Vec<String> {
    signals::DEFAULT_COUNT_KEYS
        .iter()
        .map(|k| k.to_string())
        .collect()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            count_keys: default_count_keys(),
        }
    }
}

/// Reference to an analysed event: its tree position plus the identity it
/// carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventRef {
    pub node: NodeId,
    pub id: EventId,
    pub event_type: EventType,
    pub status: EventStatus,
}

impl EventRef {
    pub fn new(tree: &ExecutionTree<'_>, node: NodeId) -> Self {
        let event = tree.event(node);
        Self {
            node,
            id: event.id,
            event_type: event.event_type,
            status: event.status,
        }
    }
}

/// Answer to "what failed, why, and what was the earliest sign".
///
/// Derived per inspection and never persisted. Absent fields mean the
/// analysis could not determine them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// First failed `termination` event; None means the run succeeded
    pub terminal_failure: Option<EventRef>,
    pub rule: Option<RuleKind>,
    pub root_cause: Option<EventRef>,
    /// Why the run failed, in prose
    pub explanation: Option<String>,
    pub assumption_violated: Option<String>,
    pub warning_signal: Option<EventRef>,
    /// From the warning signal (or the terminal failure) to the terminal failure
    pub failure_chain: Vec<EventRef>,
    /// Every failure-status event in the trace, terminal or not
    pub failure_events: Vec<EventRef>,
}

impl AnalysisResult {
    pub fn has_failure(&self) -> bool {
        self.terminal_failure.is_some()
    }

    fn success(failure_events: Vec<EventRef>) -> Self {
        Self {
            terminal_failure: None,
            rule: None,
            root_cause: None,
            explanation: None,
            assumption_violated: None,
            warning_signal: None,
            failure_chain: Vec::new(),
            failure_events,
        }
    }
}

/// Ordered root-cause rules plus the unclassified-failure fallback.
pub struct Analyzer {
    config: AnalyzerConfig,
    rules: Vec<Box<dyn RootCauseRule>>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl Analyzer {
    /// Analyzer with the built-in rules, in priority order.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            rules: vec![Box::new(EmptyOutputPropagation), Box::new(RetryExhaustion)],
        }
    }

    /// Append a rule after the existing ones (still ahead of the fallback).
    pub fn with_rule(mut self, rule: impl RootCauseRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn rule_kinds(&self) -> Vec<RuleKind> {
        self.rules.iter().map(|r| r.kind()).collect()
    }

    pub fn analyze(&self, tree: &ExecutionTree<'_>) -> AnalysisResult {
        let failure_events: Vec<EventRef> = tree
            .nodes()
            .iter()
            .filter(|n| n.event.is_failure())
            .map(|n| EventRef::new(tree, n.id))
            .collect();

        let Some(terminal) = tree.terminal_failure() else {
            return AnalysisResult::success(failure_events);
        };

        let finding = self
            .rules
            .iter()
            .find_map(|rule| {
                rule.evaluate(tree, terminal, &self.config)
                    .filter(|finding| finding_is_valid(tree, terminal, finding))
            })
            .unwrap_or_else(|| UnclassifiedFailure::finding(tree, terminal));

        tracing::debug!(
            rule = %finding.rule,
            root_cause = finding.root_cause.ordinal(),
            "root cause identified"
        );

        let chain = failure_chain(tree, finding.warning, terminal)
            .into_iter()
            .map(|id| EventRef::new(tree, id))
            .collect();

        AnalysisResult {
            terminal_failure: Some(EventRef::new(tree, terminal)),
            rule: Some(finding.rule),
            root_cause: Some(EventRef::new(tree, finding.root_cause)),
            explanation: Some(finding.explanation),
            assumption_violated: finding.assumption,
            warning_signal: finding.warning.map(|id| EventRef::new(tree, id)),
            failure_chain: chain,
            failure_events,
        }
    }
}

// A finding must point at events of this tree, with any warning at or
// before the terminal. Anything else is treated as no match.
fn finding_is_valid(tree: &ExecutionTree<'_>, terminal: NodeId, finding: &Finding) -> bool {
    let root_ok = tree.get(finding.root_cause).is_some();
    let warning_ok = finding
        .warning
        .is_none_or(|w| w <= terminal && tree.get(w).is_some());

    if !(root_ok && warning_ok) {
        tracing::warn!(
            rule = %finding.rule,
            root_cause = finding.root_cause.ordinal(),
            warning = ?finding.warning.map(|w| w.ordinal()),
            "ignoring finding that points outside the trace"
        );
    }
    root_ok && warning_ok
}

/// Analyze with the default configuration.
pub fn analyze(tree: &ExecutionTree<'_>) -> AnalysisResult {
    Analyzer::default().analyze(tree)
}
