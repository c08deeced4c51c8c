use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "argus")]
#[command(about = "Inspect agent execution traces and explain why runs failed", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory holding argus.toml (default: $ARGUS_PATH, then the XDG data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Config file to use instead of <data-dir>/argus.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log verbosity on stderr (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the execution tree and root-cause analysis of a trace
    Inspect {
        /// JSON Lines trace file
        file: PathBuf,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Hide input/output detail lines
        #[arg(long)]
        no_payloads: bool,
    },

    /// Report structural problems in a trace (exit status 1 if any)
    Check {
        file: PathBuf,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Compare a trace before and after an intervention
    Compare {
        before: PathBuf,
        after: PathBuf,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Run the instrumented research agent and inspect its trace
    Demo {
        #[arg(long, value_enum, default_value = "empty-results")]
        scenario: Scenario,

        /// Also write the recorded trace to this file
        #[arg(long)]
        save: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Search returns results; the run succeeds
    Success,
    /// Search returns nothing and the agent crashes during synthesis
    EmptyResults,
    /// Search is down; retries run out
    RetryExhaustion,
    /// Empty results caught by an input-validation guard
    Guarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
