//! TestWorld pattern for end-to-end CLI tests.
//!
//! Each world owns a temp directory used both for trace files and as the
//! argus data directory, so tests never touch the user's configuration.

use anyhow::Result;
use argus_types::Event;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures;

/// Isolated environment for running the `argus` binary.
///
/// # Example
/// ```no_run
/// use argus_testing::{TestWorld, fixtures};
///
/// let world = TestWorld::new().with_trace("run.jsonl", &fixtures::success_scenario());
/// let result = world.run(&["inspect", "run.jsonl"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    data_dir: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join(".argus");
        std::fs::create_dir_all(&data_dir).expect("Failed to create data dir");

        Self {
            temp_dir,
            data_dir,
            env_vars: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory exported as `ARGUS_PATH` to the binary.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Absolute path of a file inside the world.
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Write a trace as JSON Lines.
    pub fn with_trace(self, name: &str, events: &[Event]) -> Self {
        fixtures::write_jsonl(&self.path(name), events).expect("Failed to write trace");
        self
    }

    /// Write an arbitrary file, e.g. a corrupt trace or a config.
    pub fn with_file(self, name: &str, contents: &str) -> Self {
        std::fs::write(self.path(name), contents).expect("Failed to write file");
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Point a command at this world: cwd, data dir, env vars.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.current_dir(self.temp_dir.path())
            .env("ARGUS_PATH", &self.data_dir)
            .env_remove("RUST_LOG");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Run the `argus` binary with `args` inside this world.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("argus")
            .map_err(|e| anyhow::anyhow!("Failed to find argus binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }
}
