use super::{HandlerContext, load_trace};
use crate::args::OutputFormat;
use anyhow::Result;
use argus_engine::check_trace;
use serde_json::json;
use std::path::Path;

pub fn handle(ctx: &HandlerContext, file: &Path, format: OutputFormat) -> Result<()> {
    let events = load_trace(file)?;
    let issues = check_trace(&events);

    match format {
        OutputFormat::Json => {
            let body = json!({
                "total_events": events.len(),
                "issues": issues,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            if issues.is_empty() {
                println!("No problems found in {} events", events.len());
            } else {
                let lines: Vec<String> = issues.iter().map(ToString::to_string).collect();
                ctx.painter.print_lines(lines.iter().map(String::as_str));
            }
        }
    }

    if !issues.is_empty() {
        anyhow::bail!("{} problem(s) found in {}", issues.len(), file.display());
    }

    Ok(())
}
