//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;

use crate::domain::ServiceConfig;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Storage backing a mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountKind {
    /// Host directory.
    Bind,
    /// Named runtime volume.
    Volume,
}

/// A mount attached to a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub kind: MountKind,
    pub source: String,
    pub destination: String,
}

impl Mount {
    /// Render as a `--mount` value.
    #[must_use]
    pub fn to_arg(&self) -> String {
        let kind = match self.kind {
            MountKind::Bind => "bind",
            MountKind::Volume => "volume",
        };
        format!(
            "type={kind},source={},destination={}",
            self.source, self.destination
        )
    }
}

/// Parameters for creating the long-running service container.
pub struct ContainerSpec<'a> {
    pub name: &'a str,
    pub image: &'a str,
    pub env_file: &'a Path,
    pub hostname: &'a str,
    /// File the runtime writes the container id to.
    pub cid_file: &'a Path,
    pub use_volumes: bool,
    pub network: Option<&'a str>,
    pub create_flags: &'a [String],
    pub mounts: &'a [Mount],
}

/// Parameters for a disposable, auto-removed container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSpec {
    pub image: String,
    pub mounts: Vec<Mount>,
    pub env_file: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    /// `(container, alias)` links.
    pub links: Vec<(String, String)>,
    pub network: Option<String>,
    pub command: Vec<String>,
}

/// Parameters for building the service image.
pub struct BuildSpec<'a> {
    pub tag: &'a str,
    pub recipe: &'a Path,
    pub context: &'a Path,
    pub build_args: &'a [(String, String)],
    pub flags: &'a [String],
}

/// Live container state as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerState {
    pub name: String,
    pub running: bool,
    pub pid: u32,
}

impl ContainerState {
    /// Running with a live process.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.running && self.pid != 0
    }
}

// ── Runtime Driver Port Traits ────────────────────────────────────────────────

/// Container operations.
#[allow(async_fn_in_trait)]
pub trait ContainerRuntime {
    /// Whether a container with this name exists, running or not.
    async fn container_exists(&self, name: &str) -> Result<bool>;
    /// Inspect a container, returning `None` when it does not exist.
    async fn container_inspect(&self, name: &str) -> Result<Option<ContainerState>>;
    /// Create (but do not start) a container.
    async fn container_create(&self, spec: &ContainerSpec<'_>) -> Result<Output>;
    async fn container_start(&self, name: &str) -> Result<Output>;
    async fn container_stop(&self, name: &str) -> Result<Output>;
    async fn container_remove(&self, name: &str) -> Result<Output>;
    /// Run `argv` inside a running container with inherited stdio.
    async fn container_exec(&self, name: &str, argv: &[String], tty: bool)
    -> Result<ExitStatus>;
    /// Stream container logs to the terminal.
    async fn container_logs(&self, name: &str, follow: bool, tail: Option<u32>)
    -> Result<ExitStatus>;
    /// Run a disposable container to completion and capture its output.
    async fn container_run(&self, spec: &RunSpec) -> Result<Output>;
}

/// Named volume operations.
#[allow(async_fn_in_trait)]
pub trait VolumeRuntime {
    async fn volume_exists(&self, name: &str) -> Result<bool>;
    async fn volume_create(&self, name: &str, labels: &[(String, String)]) -> Result<Output>;
}

/// Network operations.
#[allow(async_fn_in_trait)]
pub trait NetworkRuntime {
    async fn network_exists(&self, name: &str) -> Result<bool>;
    /// Attach a container to a network under the given alias.
    async fn network_connect(&self, network: &str, container: &str, alias: &str)
    -> Result<Output>;
}

/// Image operations.
#[allow(async_fn_in_trait)]
pub trait ImageRuntime {
    async fn image_exists(&self, name: &str) -> Result<bool>;
    async fn image_build(&self, spec: &BuildSpec<'_>) -> Result<Output>;
}

/// Composite trait: any type implementing all four sub-traits is a `RuntimeDriver`.
pub trait RuntimeDriver: ContainerRuntime + VolumeRuntime + NetworkRuntime + ImageRuntime {}

/// Blanket implementation: any type implementing all four sub-traits is a `RuntimeDriver`.
impl<T> RuntimeDriver for T where T: ContainerRuntime + VolumeRuntime + NetworkRuntime + ImageRuntime
{}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations apply their configured default timeout, if any.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Relay one line printed by a hook container.
    fn output(&self, line: &str);
}

// ── State and Filesystem Ports ────────────────────────────────────────────────

/// Persistence of per-service configuration.
#[allow(async_fn_in_trait)]
pub trait ServiceStore {
    /// Load a service's configuration, returning `None` if it has none.
    async fn load(&self, service_type: &str, name: &str) -> Result<Option<ServiceConfig>>;
    /// Whether a service root is present, readable configuration or not.
    async fn exists(&self, service_type: &str, name: &str) -> Result<bool>;
    /// Create the service root and write both the configuration and the env file.
    async fn save(&self, config: &ServiceConfig) -> Result<()>;
    /// Rewrite only the env file from the configuration's environment.
    async fn write_env(&self, config: &ServiceConfig) -> Result<()>;
    /// Remove a service root and everything under it. Absent roots are fine.
    async fn remove(&self, service_type: &str, name: &str) -> Result<()>;
    /// Every provisioned instance of a service type, by name.
    async fn list(&self, service_type: &str) -> Result<Vec<ServiceConfig>>;
}

/// Local filesystem operations used by provisioning.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Absolute form of `path`, without resolving symlinks.
    fn absolute(&self, path: &Path) -> Result<PathBuf>;
    /// Set the executable bits on a file.
    fn make_executable(&self, path: &Path) -> Result<()>;
}
