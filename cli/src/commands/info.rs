//! `svcforge service info|exists <template> <name>`

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::ContainerRuntime;
use crate::application::services::exec::exported_variables;
use crate::application::services::lifecycle::service_exists;
use crate::application::services::provision::load_config;
use crate::commands::ServiceArgs;
use crate::output::Renderer;

/// Run `svcforge service info`. Secret values are masked.
///
/// # Errors
///
/// Returns an error if the service has no stored configuration.
pub async fn info(app: &AppContext, args: &ServiceArgs) -> Result<ExitCode> {
    let template = app.registry.get(&args.template)?;
    let config = load_config(&app.store, &args.template, &args.name)
        .await?
        .redacted();
    let running = app
        .driver
        .container_inspect(&config.container_name())
        .await?
        .is_some_and(|state| state.running);
    let exported = exported_variables(template, &config)?;

    match app.renderer() {
        Renderer::Human(r) => r.render_service_info(&config, running, &exported),
        Renderer::Json(r) => r.render_service_info(&config, running, &exported)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Run `svcforge service exists`: exit 0 if the service exists, 1 otherwise.
///
/// # Errors
///
/// Returns an error for an invalid name or an unreadable data root.
pub async fn exists(app: &AppContext, args: &ServiceArgs) -> Result<ExitCode> {
    app.registry.get(&args.template)?;
    let exists = service_exists(&app.store, &args.template, &args.name).await?;
    match app.renderer() {
        Renderer::Human(_) => {
            if exists {
                app.output
                    .info(&format!("{} service {} exists", args.template, args.name));
            } else {
                app.output.info(&format!(
                    "{} service {} does not exist",
                    args.template, args.name
                ));
            }
        }
        Renderer::Json(r) => r.render_exists(&args.template, &args.name, exists)?,
    }
    Ok(if exists {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
