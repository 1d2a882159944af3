//! `svcforge service logs <template> <name> [--follow] [--tail N]`

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::lifecycle::service_logs;
use crate::commands::exit_code;

/// Arguments for the logs command.
#[derive(Args)]
pub struct LogsArgs {
    /// Service template
    pub template: String,

    /// Service name
    pub name: String,

    /// Stream logs in real time
    #[arg(short, long)]
    pub follow: bool,

    /// Number of lines to show from the end (default: all)
    #[arg(short = 'n', long)]
    pub tail: Option<u32>,
}

/// Run `svcforge service logs`.
///
/// # Errors
///
/// Returns an error if the container does not exist.
pub async fn run(app: &AppContext, args: &LogsArgs) -> Result<ExitCode> {
    app.registry.get(&args.template)?;
    let status = service_logs(
        &app.driver,
        &args.template,
        &args.name,
        args.follow,
        args.tail,
    )
    .await?;
    Ok(exit_code(status))
}
