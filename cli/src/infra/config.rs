//! Settings file loader.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::Settings;

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "SVCFORGE_CONFIG";

/// Settings stored as YAML on disk.
pub struct YamlSettingsStore {
    path: Option<PathBuf>,
}

impl YamlSettingsStore {
    /// Resolve the path from `SVCFORGE_CONFIG`, else `~/.svcforge/config.yaml`.
    #[must_use]
    pub fn new() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".svcforge").join("config.yaml")));
        Self { path }
    }

    /// Use an explicit path (used in tests).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Load settings; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Settings> {
        let Some(path) = &self.path else {
            return Ok(Settings::default());
        };
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }
}

impl Default for YamlSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}
