use super::{HandlerContext, load_trace};
use crate::args::OutputFormat;
use anyhow::Result;
use argus_types::Event;
use std::path::Path;

pub fn handle(ctx: &HandlerContext, file: &Path, format: OutputFormat, no_payloads: bool) -> Result<()> {
    let events = load_trace(file)?;
    print_report(ctx, &events, format, no_payloads)
}

/// Tree and root-cause analysis of `events`, as text or JSON.
pub(crate) fn print_report(
    ctx: &HandlerContext,
    events: &[Event],
    format: OutputFormat,
    no_payloads: bool,
) -> Result<()> {
    let mut config = ctx.config.clone();
    if no_payloads {
        config.render.show_payloads = false;
    }

    let report = config.inspector().report(events);
    if !report.issues.is_empty() {
        tracing::warn!(
            issues = report.issues.len(),
            "trace has structural problems; run `argus check` for details"
        );
    }

    match format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => ctx.painter.print_lines(report.lines.iter().map(String::as_str)),
    }
    Ok(())
}
