//! `svcforge template list|info`

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::output::Renderer;

/// Template subcommands.
#[derive(Subcommand)]
pub enum TemplateCommand {
    /// List available templates
    List,
    /// Show template details
    Info {
        /// Template name
        template: String,
    },
}

/// Run a template subcommand.
///
/// # Errors
///
/// Returns an error for an unknown template or a serialization failure.
pub fn run(app: &AppContext, cmd: &TemplateCommand) -> Result<ExitCode> {
    match cmd {
        TemplateCommand::List => match app.renderer() {
            Renderer::Human(r) => r.render_template_list(app.registry.iter()),
            Renderer::Json(r) => r.render_template_list(app.registry.iter())?,
        },
        TemplateCommand::Info { template } => {
            let template = app.registry.get(template)?;
            match app.renderer() {
                Renderer::Human(r) => r.render_template_info(template),
                Renderer::Json(r) => r.render_template_info(template)?,
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
