use crate::compare::{TraceComparison, TraceSummary};

/// Side-by-side outcome of two traces followed by per-type event counts.
pub fn render_comparison(comparison: &TraceComparison) -> Vec<String> {
    let mut lines = vec![
        format!("BEFORE: {}", summary_line(&comparison.before)),
        format!("AFTER:  {}", summary_line(&comparison.after)),
    ];

    let verdict = if comparison.is_fixed() {
        "fixed: the failure no longer occurs".to_string()
    } else if comparison.is_regressed() {
        "regressed: the run now fails".to_string()
    } else {
        format!("unchanged ({})", comparison.after.outcome)
    };
    lines.push(format!("RESULT: {}", verdict));

    lines.push(String::new());
    lines.push("EVENT COUNTS:".to_string());
    for (kind, delta) in comparison.count_deltas() {
        let before = comparison.before.counts_by_type.get(&kind).copied().unwrap_or(0);
        let after = comparison.after.counts_by_type.get(&kind).copied().unwrap_or(0);
        lines.push(format!("  {}: {} -> {} ({:+})", kind, before, after, delta));
    }

    lines
}

fn summary_line(summary: &TraceSummary) -> String {
    let mut line = format!("{}", summary.outcome);
    if let Some(rule) = &summary.rule {
        line.push_str(&format!(" [rule: {}]", rule));
    }
    line.push_str(&format!(
        ", {} events, {} failure event(s), chain length {}",
        summary.total_events, summary.failure_events, summary.chain_len
    ));
    if let Some(error) = &summary.terminal_error {
        line.push_str(&format!(", error: {}", error));
    }
    line
}
