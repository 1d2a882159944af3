//! `svcforge service start <template> <name>`

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::provision::{ProvisionOptions, start_service};
use crate::commands::{ServiceArgs, cancel_on_ctrl_c};
use crate::output::{Renderer, TerminalReporter};

/// Run `svcforge service start`.
///
/// # Errors
///
/// Returns an error if the service has no stored configuration or any
/// stage of bringing it back up fails.
pub async fn run(app: &AppContext, args: &ServiceArgs) -> Result<ExitCode> {
    let template = app.registry.get(&args.template)?;
    let reporter = TerminalReporter::new(&app.output);
    let cancel = cancel_on_ctrl_c();
    let opts = ProvisionOptions {
        reporter: &reporter,
        readiness: &app.settings.readiness,
        cancel: &cancel,
    };

    let outcome = start_service(
        &app.driver,
        &app.store,
        &app.local_fs,
        template,
        &args.name,
        &opts,
    )
    .await?;
    drop(reporter);

    match app.renderer() {
        Renderer::Human(r) => r.render_started(&args.template, &args.name, outcome),
        Renderer::Json(r) => r.render_started(&args.template, &args.name, outcome)?,
    }
    Ok(ExitCode::SUCCESS)
}
