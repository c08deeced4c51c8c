use argus_types::{EventStatus, EventType};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use super::AnalyzerConfig;
use super::chain::CausalScope;
use super::signals::{self, output_count};
use crate::span::SpanRole;
use crate::tree::{ExecutionTree, NodeId};

/// Which heuristic produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    EmptyOutputPropagation,
    RetryExhaustion,
    UnclassifiedFailure,
    /// Rules registered by callers
    #[serde(untagged)]
    Custom(&'static str),
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::EmptyOutputPropagation => "empty_output_propagation",
            RuleKind::RetryExhaustion => "retry_exhaustion",
            RuleKind::UnclassifiedFailure => "unclassified_failure",
            RuleKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Causal explanation produced by a matching rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub rule: RuleKind,
    pub root_cause: NodeId,
    pub explanation: String,
    /// None when the rule cannot name the violated assumption
    pub assumption: Option<String>,
    /// None when no earlier warning sign exists
    pub warning: Option<NodeId>,
}

/// One root-cause heuristic.
///
/// Rules are evaluated in a fixed order against the terminal failure and
/// the first `Some` wins. A rule must not panic on malformed traces.
pub trait RootCauseRule: Send + Sync {
    fn kind(&self) -> RuleKind;

    fn evaluate(
        &self,
        tree: &ExecutionTree<'_>,
        terminal: NodeId,
        config: &AnalyzerConfig,
    ) -> Option<Finding>;
}

/// An empty collection result that flowed, unchecked, into the terminal
/// failure.
///
/// Walks backward from the terminal failure. The nearest zero count opens a
/// run; the run extends backward over further zero counts and events
/// without a count, and ends at the first positive count. The earliest event
/// of the run is where the empty data entered. Only events in the
/// terminal's causal scope are walked; other roots are independent work.
pub struct EmptyOutputPropagation;

impl RootCauseRule for EmptyOutputPropagation {
    fn kind(&self) -> RuleKind {
        RuleKind::EmptyOutputPropagation
    }

    fn evaluate(
        &self,
        tree: &ExecutionTree<'_>,
        terminal: NodeId,
        config: &AnalyzerConfig,
    ) -> Option<Finding> {
        let scope = CausalScope::new(tree, terminal);
        let mut origin: Option<(NodeId, &str)> = None;

        for index in (0..terminal.index()).rev() {
            let id = NodeId::new(index);
            if !scope.contains(id) {
                continue;
            }
            match output_count(tree.event(id), &config.count_keys) {
                Some((key, 0)) => origin = Some((id, key)),
                Some(_) if origin.is_some() => break,
                _ => {}
            }
        }

        let (root, key) = origin?;
        let event_type = tree.event(root).event_type;

        Some(Finding {
            rule: self.kind(),
            root_cause: root,
            explanation: format!(
                "{} #{} returned an empty result ({} = 0) that propagated to the terminal failure",
                event_type,
                root.ordinal(),
                key
            ),
            assumption: Some(format!(
                "agent assumed non-empty output from {} and did not validate before use",
                event_type
            )),
            warning: Some(root),
        })
    }
}

/// A run of retries under one parent that hit the retry ceiling without a
/// success in between and was followed by a failure.
///
/// A success-status sibling resets the run. A span closer belongs to the
/// scope its opener was emitted in, so a successful attempt recorded as a
/// started/success pair resets the retries around it. The ceiling is the configured
/// `max_retries` unless the last retry carries its own `max_retries`
/// metadata; the attempt count is the run length or the highest
/// `retry_count` seen, whichever is larger. The latest exhausted run wins.
pub struct RetryExhaustion;

fn retry_ceiling(tree: &ExecutionTree<'_>, run: &[NodeId], config: &AnalyzerConfig) -> u64 {
    run.last()
        .and_then(|&id| signals::max_retries(tree.event(id)))
        .unwrap_or(u64::from(config.max_retries))
        .max(1)
}

fn is_exhausted(tree: &ExecutionTree<'_>, run: &[NodeId], config: &AnalyzerConfig) -> bool {
    let attempts = run
        .iter()
        .filter_map(|&id| signals::retry_count(tree.event(id)))
        .max()
        .unwrap_or(0)
        .max(run.len() as u64);
    !run.is_empty() && attempts >= retry_ceiling(tree, run, config)
}

impl RootCauseRule for RetryExhaustion {
    fn kind(&self) -> RuleKind {
        RuleKind::RetryExhaustion
    }

    fn evaluate(
        &self,
        tree: &ExecutionTree<'_>,
        terminal: NodeId,
        config: &AnalyzerConfig,
    ) -> Option<Finding> {
        let mut active: HashMap<Option<NodeId>, Vec<NodeId>> = HashMap::new();
        let mut exhausted: Vec<Vec<NodeId>> = Vec::new();

        for index in 0..terminal.index() {
            let node = tree.node(NodeId::new(index));
            let scope = match node.span {
                SpanRole::Closes { opened_by } => tree.node(opened_by).parent,
                _ => node.parent,
            };

            if node.event.event_type == EventType::Retry {
                active.entry(scope).or_default().push(node.id);
                continue;
            }

            match node.event.status {
                EventStatus::Success => {
                    active.remove(&scope);
                }
                EventStatus::Failure => {
                    let done = active
                        .get(&scope)
                        .is_some_and(|run| is_exhausted(tree, run, config));
                    if done && let Some(run) = active.remove(&scope) {
                        exhausted.push(run);
                    }
                }
                _ => {}
            }
        }

        // Runs still open at this point are followed by the terminal failure.
        exhausted.extend(
            active
                .into_values()
                .filter(|run| is_exhausted(tree, run, config)),
        );

        let run = exhausted.into_iter().max_by_key(|run| run.last().copied())?;
        let first = *run.first()?;
        let last = *run.last()?;

        Some(Finding {
            rule: self.kind(),
            root_cause: last,
            explanation: format!(
                "retries exhausted after {} attempt(s) (limit {}) without a successful attempt",
                run.len(),
                retry_ceiling(tree, &run, config)
            ),
            assumption: Some(
                "agent assumed retries would eventually succeed and did not handle a persistent failure"
                    .to_string(),
            ),
            warning: Some(first),
        })
    }
}

/// Fallback: the terminal failure explains itself, with no earlier
/// warning sign.
pub struct UnclassifiedFailure;

impl UnclassifiedFailure {
    pub fn finding(tree: &ExecutionTree<'_>, terminal: NodeId) -> Finding {
        let error = tree
            .event(terminal)
            .error
            .clone()
            .unwrap_or_else(|| "unknown error".to_string());

        Finding {
            rule: RuleKind::UnclassifiedFailure,
            root_cause: terminal,
            explanation: error,
            assumption: None,
            warning: None,
        }
    }
}

impl RootCauseRule for UnclassifiedFailure {
    fn kind(&self) -> RuleKind {
        RuleKind::UnclassifiedFailure
    }

    fn evaluate(
        &self,
        tree: &ExecutionTree<'_>,
        terminal: NodeId,
        _config: &AnalyzerConfig,
    ) -> Option<Finding> {
        Some(Self::finding(tree, terminal))
    }
}
