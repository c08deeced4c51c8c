use super::HandlerContext;
use super::inspect::print_report;
use crate::agent::ResearchAgent;
use crate::args::{OutputFormat, Scenario};
use anyhow::{Context, Result};
use argus_runtime::{EventLogger, EventStore, JsonlEventStore};
use std::path::Path;

/// Run the research agent for `scenario` and inspect what it recorded.
///
/// The agent failing is the point of most scenarios, so its error is
/// reported through the trace rather than the exit status.
pub fn handle(
    ctx: &HandlerContext,
    scenario: Scenario,
    save: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let logger = EventLogger::new();
    let (agent, question) = ResearchAgent::for_scenario(&logger, scenario);

    match agent.answer(question) {
        Ok(answer) => tracing::info!(?scenario, answer_length = answer.len(), "agent finished"),
        Err(err) => tracing::info!(?scenario, %err, "agent failed"),
    }

    let events = logger.get_events();

    if let Some(path) = save {
        JsonlEventStore::new(path)
            .save(&events)
            .with_context(|| format!("failed to save trace to {}", path.display()))?;
        if format == OutputFormat::Text {
            eprintln!("Saved {} events to {}", events.len(), path.display());
        }
    }

    print_report(ctx, &events, format, false)
}
