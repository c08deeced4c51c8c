pub mod check;
pub mod compare;
pub mod demo;
pub mod inspect;

use crate::presentation::Painter;
use anyhow::{Context, Result};
use argus_runtime::{Config, EventStore, JsonlEventStore};
use argus_types::Event;
use std::path::Path;

/// Settings shared by every subcommand.
pub struct HandlerContext {
    pub config: Config,
    pub painter: Painter,
}

pub(crate) fn load_trace(path: &Path) -> Result<Vec<Event>> {
    let events = JsonlEventStore::new(path)
        .load()
        .with_context(|| format!("failed to load trace {}", path.display()))?;
    tracing::debug!(path = %path.display(), events = events.len(), "loaded trace");
    Ok(events)
}
