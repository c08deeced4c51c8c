// NOTE: argus CLI layering
//
// args      -> clap definitions only
// commands  -> resolves config and dispatches
// handlers  -> one module per subcommand; loads traces, calls the engine
// presentation -> optional terminal coloring on top of the engine's plain lines
//
// The engine renders plain text. Color is applied here, and only when stdout
// is a terminal, so piped and saved output stays byte-identical to the
// library's.

pub mod agent;
mod args;
mod commands;
mod handlers;
pub mod presentation;

pub use args::{Cli, Commands, LogLevel, OutputFormat, Scenario};
pub use commands::run;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "argus=warn";

/// Install the stderr log subscriber.
///
/// `--log-level` wins over `RUST_LOG`; without either only warnings from
/// the argus crates are shown.
pub fn init_logging(level: Option<LogLevel>) {
    let filter = match level {
        Some(level) => EnvFilter::new(format!("argus={}", level.as_str())),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
