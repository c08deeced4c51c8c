use argus_engine::{AnalyzerConfig, Inspector, RenderOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

pub const CONFIG_FILE: &str = "argus.toml";

/// Resolve the argus data directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. ARGUS_PATH environment variable (with tilde expansion)
/// 3. XDG data directory
/// 4. ~/.argus
pub fn resolve_data_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("ARGUS_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("argus"));
    }

    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".argus"));
    }

    Err(Error::Config(
        "Could not determine data path: no home directory or XDG data directory found".to_string(),
    ))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

/// Contents of `argus.toml`. Every section and key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    #[serde(default)]
    pub render: RenderOptions,
}

impl Config {
    /// Load from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(resolve_data_path(None)?.join(CONFIG_FILE))
    }

    /// Inspector configured from this file.
    pub fn inspector(&self) -> Inspector {
        Inspector::new(self.analyzer.clone(), self.render.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.analyzer.max_retries, 3);
        assert_eq!(config.analyzer.count_keys, vec!["results_count", "count"]);
        assert!(config.render.show_payloads);
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join(CONFIG_FILE);

        let mut config = Config::default();
        config.analyzer.max_retries = 5;
        config.render.show_payloads = false;

        config.save_to(&config_path)?;
        assert!(config_path.exists());

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded, config);

        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join(CONFIG_FILE);
        std::fs::write(&config_path, "[analyzer]\nmax_retries = 2\n")?;

        let config = Config::load_from(&config_path)?;
        assert_eq!(config.analyzer.max_retries, 2);
        assert_eq!(config.analyzer.count_keys, vec!["results_count", "count"]);
        assert!(config.render.show_payloads);

        Ok(())
    }

    #[test]
    fn test_malformed_file_is_config_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join(CONFIG_FILE);
        std::fs::write(&config_path, "[analyzer]\nmax_retries = \"many\"\n")?;

        assert!(matches!(Config::load_from(&config_path), Err(Error::Config(_))));
        Ok(())
    }

    #[test]
    fn test_load_nonexistent_returns_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = Config::load_from(&temp_dir.path().join("nonexistent.toml"))?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn test_explicit_path_wins() -> Result<()> {
        assert_eq!(
            resolve_data_path(Some("/tmp/argus-data"))?,
            PathBuf::from("/tmp/argus-data")
        );
        Ok(())
    }
}
