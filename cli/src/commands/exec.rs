//! `svcforge service enter|connect|export|import <template> <name>`
//!
//! The template command runs inside the container with inherited stdio; our
//! exit code is the command's.

use std::process::ExitCode;

use anyhow::Result;
use console::Term;

use crate::app::AppContext;
use crate::application::services::exec::{ServiceCommand, run_command};
use crate::application::services::provision::load_config;
use crate::commands::{ServiceArgs, exit_code};

/// Run a template-defined command in the service container.
///
/// # Errors
///
/// Returns an error if the service is unknown or stopped, or the template
/// does not define the command.
pub async fn run(app: &AppContext, args: &ServiceArgs, command: ServiceCommand) -> Result<ExitCode> {
    let template = app.registry.get(&args.template)?;
    let config = load_config(&app.store, &args.template, &args.name).await?;
    let tty = Term::stdout().is_term() && Term::stderr().is_term();
    let status = run_command(&app.driver, template, &config, command, tty).await?;
    Ok(exit_code(status))
}
