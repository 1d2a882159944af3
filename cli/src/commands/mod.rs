//! Command implementations

pub mod create;
pub mod destroy;
pub mod exec;
pub mod info;
pub mod list;
pub mod logs;
pub mod start;
pub mod stop;
pub mod template;
pub mod version;

use std::process::{ExitCode, ExitStatus};

use clap::{Args, Subcommand};
use tokio_util::sync::CancellationToken;

/// A service instance, addressed by template and name.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Service template
    pub template: String,
    /// Service name
    pub name: String,
}

/// Service subcommands.
#[derive(Subcommand)]
pub enum ServiceCommand {
    /// Create a service and start it
    Create(create::CreateArgs),
    /// Start a stopped or removed service
    Start(ServiceArgs),
    /// Stop the container, keeping it
    Pause(ServiceArgs),
    /// Stop and remove the container, keeping data
    Stop(ServiceArgs),
    /// Remove the container and all service data
    Destroy(destroy::DestroyArgs),
    /// Open a shell in the running container
    Enter(ServiceArgs),
    /// Connect to the service with its client
    Connect(ServiceArgs),
    /// Export service data to stdout
    Export(ServiceArgs),
    /// Import service data from stdin
    Import(ServiceArgs),
    /// Show container logs
    Logs(logs::LogsArgs),
    /// List services of a template
    List {
        /// Service template
        template: String,
    },
    /// Exit successfully if the service exists
    Exists(ServiceArgs),
    /// Show service configuration
    Info(ServiceArgs),
}

/// Token cancelled on Ctrl-C.
#[must_use]
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, cancelling");
            child.cancel();
        }
    });
    token
}

/// Map a proxied process's exit status to ours.
#[must_use]
pub fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    }
}
