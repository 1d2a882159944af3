//! `svcforge service list <template>`

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::lifecycle::list_services;
use crate::output::Renderer;

/// Run `svcforge service list`.
///
/// # Errors
///
/// Returns an error if the template is unknown or the data root cannot be read.
pub async fn run(app: &AppContext, template: &str) -> Result<ExitCode> {
    app.registry.get(template)?;
    let services = list_services(&app.driver, &app.store, template).await?;
    match app.renderer() {
        Renderer::Human(r) => r.render_service_list(template, &services),
        Renderer::Json(r) => r.render_service_list(&services)?,
    }
    Ok(ExitCode::SUCCESS)
}
