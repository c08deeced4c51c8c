use super::{HandlerContext, load_trace};
use crate::args::OutputFormat;
use anyhow::Result;
use argus_engine::render_comparison;
use serde_json::json;
use std::path::Path;

pub fn handle(ctx: &HandlerContext, before: &Path, after: &Path, format: OutputFormat) -> Result<()> {
    let before_events = load_trace(before)?;
    let after_events = load_trace(after)?;

    let comparison = ctx.config.inspector().compare(&before_events, &after_events);

    match format {
        OutputFormat::Json => {
            let body = json!({
                "before": comparison.before,
                "after": comparison.after,
                "fixed": comparison.is_fixed(),
                "regressed": comparison.is_regressed(),
                "count_deltas": comparison.count_deltas(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            let lines = render_comparison(&comparison);
            ctx.painter.print_lines(lines.iter().map(String::as_str));
        }
    }
    Ok(())
}
