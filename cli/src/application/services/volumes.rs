//! Volume provisioning: bind-mounted directories or named runtime volumes.
//!
//! Named volumes are idempotent: an existing volume of the computed name is
//! reused as-is.

use anyhow::{Context, Result};
use svcforge_common::Volume;

use crate::application::ports::{LocalFs, Mount, MountKind, VolumeRuntime};
use crate::application::services::check;
use crate::domain::{ServiceConfig, naming};

/// A volume ready to be mounted into service and hook containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedVolume {
    pub alias: String,
    pub container_path: String,
    pub mount: Mount,
}

impl ProvisionedVolume {
    /// `VOLUME_<ALIAS>` variable handed to hooks.
    #[must_use]
    pub fn env_var(&self) -> (String, String) {
        (format!("VOLUME_{}", self.alias), self.container_path.clone())
    }
}

/// Provision one declared volume for a service.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the runtime
/// refuses to create the volume.
pub async fn provision(
    driver: &impl VolumeRuntime,
    local_fs: &impl LocalFs,
    config: &ServiceConfig,
    volume: &Volume,
) -> Result<ProvisionedVolume> {
    let mount = if config.use_volumes {
        let name = naming::volume_name(&config.service_type, &config.service_name, &volume.alias);
        if driver.volume_exists(&name).await? {
            tracing::debug!(volume = %name, "reusing existing volume");
        } else {
            let labels = [
                ("com.svcforge.service-name", config.service_name.as_str()),
                ("com.svcforge.service-type", config.service_type.as_str()),
                ("com.svcforge.volume-alias", volume.alias.as_str()),
                ("com.svcforge.volume-path", volume.container_path.as_str()),
            ]
            .map(|(k, v)| (k.to_string(), v.to_string()));
            check(
                driver.volume_create(&name, &labels).await?,
                &format!("volume create {name}"),
            )?;
        }
        Mount {
            kind: MountKind::Volume,
            source: name,
            destination: volume.container_path.clone(),
        }
    } else {
        let dir = config.service_root.join(&volume.alias);
        local_fs
            .create_dir_all(&dir)
            .with_context(|| format!("creating volume directory for {}", volume.alias))?;
        let source = local_fs.absolute(&dir)?;
        Mount {
            kind: MountKind::Bind,
            source: source.display().to_string(),
            destination: volume.container_path.clone(),
        }
    };

    Ok(ProvisionedVolume {
        alias: volume.alias.clone(),
        container_path: volume.container_path.clone(),
        mount,
    })
}

/// Provision every volume the service declares, in order.
///
/// # Errors
///
/// Stops at the first volume that fails.
pub async fn provision_all(
    driver: &impl VolumeRuntime,
    local_fs: &impl LocalFs,
    config: &ServiceConfig,
) -> Result<Vec<ProvisionedVolume>> {
    let mut provisioned = Vec::with_capacity(config.template.volumes.len());
    for volume in &config.template.volumes {
        provisioned.push(provision(driver, local_fs, config, volume).await?);
    }
    Ok(provisioned)
}
