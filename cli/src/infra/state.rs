//! Infrastructure implementation of the `ServiceStore` port.
//!
//! `FsServiceStore` keeps one directory per instance under
//! `<data_root>/<type>/<name>`. Files are written atomically (temp file +
//! rename) from `tokio::task::spawn_blocking`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ServiceStore;
use crate::domain::service::{CONFIG_FILE, ENV_FILE};
use crate::domain::{ServiceConfig, naming};

/// Service store rooted at a data directory.
pub struct FsServiceStore {
    data_root: PathBuf,
}

impl FsServiceStore {
    #[must_use]
    pub fn new(data_root: PathBuf) -> Self {
        Self { data_root }
    }

    #[must_use]
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    fn load_sync(path: &Path) -> Result<Option<ServiceConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading service config {}", path.display()))?;
        let config: ServiceConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing service config {}", path.display()))?;
        Ok(Some(config))
    }

    fn list_sync(type_root: &Path) -> Result<Vec<ServiceConfig>> {
        if !type_root.is_dir() {
            return Ok(Vec::new());
        }
        let mut configs = Vec::new();
        let entries = std::fs::read_dir(type_root)
            .with_context(|| format!("reading {}", type_root.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("reading {}", type_root.display()))?;
            if !entry.file_type().is_ok_and(|t| t.is_dir()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if naming::validate_service_name(&name).is_err() {
                continue;
            }
            if let Some(config) = Self::load_sync(&entry.path().join(CONFIG_FILE))? {
                configs.push(config);
            }
        }
        configs.sort_by(|a, b| a.service_name.cmp(&b.service_name));
        Ok(configs)
    }
}

/// Atomic write via temp file then rename, mode 0600.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!("{file_name}.tmp"));
    std::fs::write(&temp_path, content)
        .with_context(|| format!("writing temp file {}", temp_path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
    }

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("finalizing {}", path.display()))
}

fn save_sync(config: &ServiceConfig) -> Result<()> {
    std::fs::create_dir_all(&config.service_root)
        .with_context(|| format!("creating directory {}", config.service_root.display()))?;
    let content = serde_json::to_string_pretty(config).context("serializing service config")?;
    write_atomic(&config.config_file(), &content)?;
    write_atomic(&config.env_file(), &config.env_file_contents())
}

impl ServiceStore for FsServiceStore {
    async fn load(&self, service_type: &str, name: &str) -> Result<Option<ServiceConfig>> {
        let path = naming::service_root(&self.data_root, service_type, name).join(CONFIG_FILE);
        tokio::task::spawn_blocking(move || Self::load_sync(&path))
            .await
            .context("service load task panicked")?
    }

    async fn exists(&self, service_type: &str, name: &str) -> Result<bool> {
        let root = naming::service_root(&self.data_root, service_type, name);
        tokio::task::spawn_blocking(move || root.exists())
            .await
            .context("service exists task panicked")
    }

    async fn save(&self, config: &ServiceConfig) -> Result<()> {
        let config = config.clone();
        tokio::task::spawn_blocking(move || save_sync(&config))
            .await
            .context("service save task panicked")?
    }

    async fn write_env(&self, config: &ServiceConfig) -> Result<()> {
        let path = config.service_root.join(ENV_FILE);
        let content = config.env_file_contents();
        tokio::task::spawn_blocking(move || write_atomic(&path, &content))
            .await
            .context("env file write task panicked")?
    }

    async fn remove(&self, service_type: &str, name: &str) -> Result<()> {
        let root = naming::service_root(&self.data_root, service_type, name);
        tokio::task::spawn_blocking(move || {
            if root.exists() {
                std::fs::remove_dir_all(&root)
                    .with_context(|| format!("removing directory {}", root.display()))?;
            }
            Ok(())
        })
        .await
        .context("service remove task panicked")?
    }

    async fn list(&self, service_type: &str) -> Result<Vec<ServiceConfig>> {
        let type_root = naming::type_root(&self.data_root, service_type);
        tokio::task::spawn_blocking(move || Self::list_sync(&type_root))
            .await
            .context("service list task panicked")?
    }
}
