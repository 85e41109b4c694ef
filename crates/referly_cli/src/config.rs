//! Referly configuration file handling

use anyhow::{Context, Result};
use referly_api::ApiConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no `--config` is given
pub const CONFIG_FILE: &str = "referly.toml";

/// Top-level Referly configuration (referly.toml)
#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ReferlyConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

/// Theme preference persistence
#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct ThemeConfig {
    /// Directory holding `preferences.toml`
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".referly")
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
        }
    }
}

impl ReferlyConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `referly.toml` in the
    /// working directory is used when present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file {} not found", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let fallback = PathBuf::from(CONFIG_FILE);
                if !fallback.exists() {
                    tracing::debug!(file = CONFIG_FILE, "no config file found, using defaults");
                    return Ok(Self::default());
                }
                fallback
            }
        };

        Self::load_file(&config_path)
    }

    fn load_file(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ReferlyConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ReferlyConfig::load(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn sections_are_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[api]\nseed = 42\njitter_ms = 0\n").unwrap();

        let config = ReferlyConfig::load(Some(&path)).unwrap();
        assert_eq!(config.api.seed, Some(42));
        assert_eq!(config.api.base_delay_ms, 300);
        assert_eq!(config.api.jitter_ms, 0);
        assert_eq!(config.theme, ThemeConfig::default());
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[api\n").unwrap();

        let err = ReferlyConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
