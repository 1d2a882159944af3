//! `svcforge service destroy <template> <name> [--force]`

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::lifecycle::destroy_service;
use crate::output::Renderer;

/// Arguments for the destroy command.
#[derive(Args)]
pub struct DestroyArgs {
    /// Service template
    pub template: String,

    /// Service name
    pub name: String,

    /// Skip the confirmation prompt
    #[arg(short, long, visible_alias = "yes")]
    pub force: bool,
}

/// Run `svcforge service destroy`.
///
/// # Errors
///
/// Returns an error if the service does not exist or cannot be removed.
pub async fn run(app: &AppContext, args: &DestroyArgs) -> Result<ExitCode> {
    app.registry.get(&args.template)?;

    if !args.force && !app.non_interactive {
        let prompt = format!(
            "Destroy {} service {}? Its data directory will be deleted",
            args.template, args.name
        );
        if !app.confirm(&prompt, false)? {
            app.output.info("Cancelled.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    destroy_service(&app.driver, &app.store, &args.template, &args.name).await?;
    match app.renderer() {
        Renderer::Human(r) => r.render_destroyed(&args.template, &args.name),
        Renderer::Json(r) => r.render_destroyed(&args.template, &args.name)?,
    }
    Ok(ExitCode::SUCCESS)
}
