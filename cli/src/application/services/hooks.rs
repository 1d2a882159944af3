//! Lifecycle hook execution.
//!
//! A declared hook is `bin/<hook>` inside the template directory, run in a
//! disposable container from the template's hook image.

use anyhow::{Context, Result};
use svcforge_common::ServiceTemplate;

use crate::application::ports::{
    ContainerRuntime, LocalFs, Mount, MountKind, ProgressReporter, RunSpec,
};
use crate::application::services::check;
use crate::application::services::volumes::ProvisionedVolume;
use crate::domain::ServiceConfig;

/// In-container path the hook script is mounted at.
pub const HOOK_MOUNT_PATH: &str = "/usr/local/bin/hook";

/// Pipeline points a template may hook into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    PreCreate,
    PostCreate,
    PostStart,
}

impl Hook {
    /// Script file name under `bin/`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PreCreate => "pre-create",
            Self::PostCreate => "post-create",
            Self::PostStart => "post-start",
        }
    }

    #[must_use]
    pub fn is_declared(self, template: &ServiceTemplate) -> bool {
        match self {
            Self::PreCreate => template.hooks.pre_create,
            Self::PostCreate => template.hooks.post_create,
            Self::PostStart => template.hooks.post_start,
        }
    }
}

/// Run `hook` if `template` declares it. Returns whether it ran.
///
/// The hook's stdout is relayed through `reporter`, as is its stderr when
/// it succeeds; a failing hook's stderr is carried by the error.
///
/// # Errors
///
/// Returns an error if the script cannot be made executable, the container
/// cannot be started, or the hook exits non-zero.
pub async fn run_hook(
    driver: &impl ContainerRuntime,
    local_fs: &impl LocalFs,
    template: &ServiceTemplate,
    config: &ServiceConfig,
    volumes: &[ProvisionedVolume],
    hook: Hook,
    reporter: &impl ProgressReporter,
) -> Result<bool> {
    if !hook.is_declared(template) {
        return Ok(false);
    }

    let script = local_fs
        .absolute(&template.hook_path(hook.name()))
        .with_context(|| format!("resolving {} hook path", hook.name()))?;
    local_fs
        .make_executable(&script)
        .with_context(|| format!("making {} hook executable", hook.name()))?;

    let mut mounts = vec![Mount {
        kind: MountKind::Bind,
        source: script.display().to_string(),
        destination: HOOK_MOUNT_PATH.to_string(),
    }];
    mounts.extend(volumes.iter().map(|v| v.mount.clone()));

    let spec = RunSpec {
        image: template.hooks.image.clone(),
        mounts,
        env_file: Some(config.env_file()),
        env: volumes.iter().map(ProvisionedVolume::env_var).collect(),
        command: vec![HOOK_MOUNT_PATH.to_string()],
        ..RunSpec::default()
    };

    tracing::debug!(hook = hook.name(), image = %spec.image, "running hook");
    let output = driver.container_run(&spec).await?;
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        reporter.output(line);
    }
    let output = check(output, &format!("{} hook", hook.name()))?;
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        reporter.output(line);
    }
    Ok(true)
}
