use super::args::{Cli, Commands};
use super::handlers::{self, HandlerContext};
use crate::presentation::Painter;
use anyhow::{Context, Result};
use argus_runtime::{Config, config::CONFIG_FILE, resolve_data_path};
use std::path::Path;

pub fn run(cli: Cli) -> Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => resolve_data_path(cli.data_dir.as_deref())?.join(CONFIG_FILE),
    };
    let config = load_config(&config_path, cli.config.is_some())?;

    let ctx = HandlerContext {
        config,
        painter: Painter::detect(cli.no_color),
    };

    match cli.command {
        Commands::Inspect {
            file,
            format,
            no_payloads,
        } => handlers::inspect::handle(&ctx, &file, format, no_payloads),

        Commands::Check { file, format } => handlers::check::handle(&ctx, &file, format),

        Commands::Compare {
            before,
            after,
            format,
        } => handlers::compare::handle(&ctx, &before, &after, format),

        Commands::Demo {
            scenario,
            save,
            format,
        } => handlers::demo::handle(&ctx, scenario, save.as_deref(), format),
    }
}

// An explicitly named config file must exist; the default one is optional.
fn load_config(path: &Path, explicit: bool) -> Result<Config> {
    if explicit && !path.exists() {
        anyhow::bail!("config file not found: {}", path.display());
    }

    Config::load_from(path).with_context(|| format!("failed to load config from {}", path.display()))
}
