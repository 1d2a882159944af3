//! `svcforge service pause|stop <template> <name>`

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::lifecycle::{pause_service, stop_service};
use crate::commands::ServiceArgs;
use crate::output::Renderer;

/// Run `svcforge service pause`: stop the container only.
///
/// # Errors
///
/// Returns an error if the runtime fails to stop the container.
pub async fn pause(app: &AppContext, args: &ServiceArgs) -> Result<ExitCode> {
    app.registry.get(&args.template)?;
    let outcome = pause_service(&app.driver, &args.template, &args.name).await?;
    match app.renderer() {
        Renderer::Human(r) => r.render_stopped(&args.template, &args.name, outcome, "paused"),
        Renderer::Json(r) => r.render_stopped(&args.template, &args.name, outcome)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Run `svcforge service stop`: stop and remove the container.
///
/// # Errors
///
/// Returns an error if the runtime fails to stop or remove the container.
pub async fn stop(app: &AppContext, args: &ServiceArgs) -> Result<ExitCode> {
    app.registry.get(&args.template)?;
    let outcome = stop_service(&app.driver, &args.template, &args.name).await?;
    match app.renderer() {
        Renderer::Human(r) => r.render_stopped(&args.template, &args.name, outcome, "stopped"),
        Renderer::Json(r) => r.render_stopped(&args.template, &args.name, outcome)?,
    }
    Ok(ExitCode::SUCCESS)
}
