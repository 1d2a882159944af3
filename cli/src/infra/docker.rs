//! Infrastructure implementation of the runtime driver port traits.
//!
//! `DockerDriver<R>` routes every container, volume, network and image
//! operation through a `CommandRunner` invoking the docker CLI.

use std::process::{ExitStatus, Output};

use anyhow::{Context, Result};
use serde::Deserialize;
use svcforge_common::labels;

use crate::application::ports::{
    BuildSpec, CommandRunner, ContainerRuntime, ContainerSpec, ContainerState, ImageRuntime,
    NetworkRuntime, RunSpec, VolumeRuntime,
};
use crate::application::services::check;
use crate::infra::command_runner::TokioCommandRunner;

/// Runtime CLI binary.
pub const DOCKER: &str = "docker";

/// Infrastructure adapter that routes all docker CLI calls through a `CommandRunner`.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct DockerDriver<R: CommandRunner> {
    runner: R,
    program: String,
}

impl<R: CommandRunner> DockerDriver<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            program: DOCKER.to_string(),
        }
    }

    /// Use a different docker-compatible binary.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn invoke(&self, args: &[String]) -> Result<Output> {
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        tracing::debug!(program = %self.program, args = ?argv, "invoking runtime");
        self.runner.run(&self.program, &argv).await
    }

    async fn invoke_status(&self, args: &[String]) -> Result<ExitStatus> {
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        tracing::debug!(program = %self.program, args = ?argv, "invoking runtime attached");
        self.runner.run_status(&self.program, &argv).await
    }

    /// `<kind> inspect <name>` exit status as an existence check.
    async fn inspect_ok(&self, kind: &str, name: &str) -> Result<bool> {
        let output = self
            .invoke(&args([kind, "inspect", name]))
            .await
            .with_context(|| format!("docker {kind} inspect"))?;
        Ok(output.status.success())
    }
}

impl DockerDriver<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner::default())
    }
}

fn args<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}

#[derive(Deserialize)]
struct InspectEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "State")]
    state: InspectState,
}

#[derive(Deserialize)]
struct InspectState {
    #[serde(rename = "Running", default)]
    running: bool,
    #[serde(rename = "Pid", default)]
    pid: u32,
}

/// Parse `container inspect` JSON output.
///
/// # Errors
///
/// Returns an error if the output is not an inspect array.
pub fn parse_inspect(stdout: &[u8]) -> Result<Option<ContainerState>> {
    let entries: Vec<InspectEntry> =
        serde_json::from_slice(stdout).context("parsing container inspect output")?;
    Ok(entries.into_iter().next().map(|entry| ContainerState {
        name: entry.name.trim_start_matches('/').to_string(),
        running: entry.state.running,
        pid: entry.state.pid,
    }))
}

fn is_missing(output: &Output) -> bool {
    String::from_utf8_lossy(&output.stderr)
        .to_lowercase()
        .contains("no such")
}

impl<R: CommandRunner> ContainerRuntime for DockerDriver<R> {
    async fn container_exists(&self, name: &str) -> Result<bool> {
        Ok(self.container_inspect(name).await?.is_some())
    }

    async fn container_inspect(&self, name: &str) -> Result<Option<ContainerState>> {
        let output = self
            .invoke(&args(["container", "inspect", name]))
            .await
            .context("docker container inspect")?;
        if !output.status.success() {
            if is_missing(&output) {
                return Ok(None);
            }
            return check(output, "container inspect").map(|_| None);
        }
        parse_inspect(&output.stdout)
    }

    async fn container_create(&self, spec: &ContainerSpec<'_>) -> Result<Output> {
        let mut argv = args([
            "container",
            "create",
            "--name",
            spec.name,
            "--env-file",
            &spec.env_file.display().to_string(),
            "--restart",
            "always",
            "--hostname",
            spec.hostname,
            "--cidfile",
            &spec.cid_file.display().to_string(),
            "--label",
            &format!("{}={}", labels::SERVICE_VOLUMES, spec.use_volumes),
        ]);
        if let Some(network) = spec.network {
            argv.extend(args(["--network", network]));
        }
        argv.extend(spec.create_flags.iter().cloned());
        for mount in spec.mounts {
            argv.extend(["--mount".to_string(), mount.to_arg()]);
        }
        argv.push(spec.image.to_string());
        self.invoke(&argv)
            .await
            .context("docker container create")
    }

    async fn container_start(&self, name: &str) -> Result<Output> {
        self.invoke(&args(["container", "start", name]))
            .await
            .context("docker container start")
    }

    async fn container_stop(&self, name: &str) -> Result<Output> {
        self.invoke(&args(["container", "stop", name]))
            .await
            .context("docker container stop")
    }

    async fn container_remove(&self, name: &str) -> Result<Output> {
        self.invoke(&args(["container", "rm", name]))
            .await
            .context("docker container rm")
    }

    async fn container_exec(&self, name: &str, argv: &[String], tty: bool) -> Result<ExitStatus> {
        let mut full = args([
            "container",
            "exec",
            "--env=LANG=C.UTF-8",
            "--env=LC_ALL=C.UTF-8",
            "-i",
        ]);
        if tty {
            full.push("-t".to_string());
        }
        full.push(name.to_string());
        full.extend(argv.iter().cloned());
        self.invoke_status(&full)
            .await
            .context("docker container exec")
    }

    async fn container_logs(
        &self,
        name: &str,
        follow: bool,
        tail: Option<u32>,
    ) -> Result<ExitStatus> {
        let mut full = args(["container", "logs"]);
        if follow {
            full.push("--follow".to_string());
        }
        full.push("--tail".to_string());
        full.push(tail.map_or_else(|| "all".to_string(), |n| n.to_string()));
        full.push(name.to_string());
        self.invoke_status(&full)
            .await
            .context("docker container logs")
    }

    async fn container_run(&self, spec: &RunSpec) -> Result<Output> {
        let mut full = args(["container", "run", "--rm"]);
        for mount in &spec.mounts {
            full.extend(["--mount".to_string(), mount.to_arg()]);
        }
        if let Some(env_file) = &spec.env_file {
            full.extend(["--env-file".to_string(), env_file.display().to_string()]);
        }
        for (key, value) in &spec.env {
            full.extend(["--env".to_string(), format!("{key}={value}")]);
        }
        for (container, alias) in &spec.links {
            full.extend(["--link".to_string(), format!("{container}:{alias}")]);
        }
        if let Some(network) = &spec.network {
            full.extend(["--network".to_string(), network.clone()]);
        }
        full.push(spec.image.clone());
        full.extend(spec.command.iter().cloned());
        self.invoke(&full)
            .await
            .context("docker container run")
    }
}

impl<R: CommandRunner> VolumeRuntime for DockerDriver<R> {
    async fn volume_exists(&self, name: &str) -> Result<bool> {
        self.inspect_ok("volume", name).await
    }

    async fn volume_create(&self, name: &str, labels: &[(String, String)]) -> Result<Output> {
        let mut full = args(["volume", "create"]);
        for (key, value) in labels {
            full.extend(["--label".to_string(), format!("{key}={value}")]);
        }
        full.push(name.to_string());
        self.invoke(&full)
            .await
            .context("docker volume create")
    }
}

impl<R: CommandRunner> NetworkRuntime for DockerDriver<R> {
    async fn network_exists(&self, name: &str) -> Result<bool> {
        self.inspect_ok("network", name).await
    }

    async fn network_connect(&self, network: &str, container: &str, alias: &str) -> Result<Output> {
        self.invoke(&args([
            "network", "connect", "--alias", alias, network, container,
        ]))
        .await
        .context("docker network connect")
    }
}

impl<R: CommandRunner> ImageRuntime for DockerDriver<R> {
    async fn image_exists(&self, name: &str) -> Result<bool> {
        self.inspect_ok("image", name).await
    }

    async fn image_build(&self, spec: &BuildSpec<'_>) -> Result<Output> {
        let mut full = args([
            "image",
            "build",
            "-f",
            &spec.recipe.display().to_string(),
            "-t",
            spec.tag,
        ]);
        for (key, value) in spec.build_args {
            full.extend(["--build-arg".to_string(), format!("{key}={value}")]);
        }
        full.extend(spec.flags.iter().cloned());
        full.push(spec.context.display().to_string());
        self.invoke(&full)
            .await
            .context("docker image build")
    }
}
