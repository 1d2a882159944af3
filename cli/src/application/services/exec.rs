//! Template-defined commands run inside the service container.

use std::collections::BTreeMap;
use std::process::ExitStatus;

use anyhow::{Context, Result, bail};
use svcforge_common::ServiceTemplate;

use crate::application::ports::ContainerRuntime;
use crate::domain::render::TemplateEngine;
use crate::domain::{NotFoundError, ReadinessError, ServiceConfig};

/// Shell used by `enter` when the template defines none.
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Commands a template may define.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCommand {
    Connect,
    Enter,
    Export,
    Import,
}

impl ServiceCommand {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Enter => "enter",
            Self::Export => "export",
            Self::Import => "import",
        }
    }

    /// Whether the command talks to a terminal.
    #[must_use]
    pub fn interactive(self) -> bool {
        matches!(self, Self::Connect | Self::Enter)
    }
}

/// Render and tokenise the argv for `command`.
///
/// # Errors
///
/// Returns `NotFoundError::Command` if the template does not define the
/// command, or an error if rendering or tokenising fails.
pub fn render_command(
    template: &ServiceTemplate,
    config: &ServiceConfig,
    command: ServiceCommand,
) -> Result<Vec<String>> {
    let Some(source) = template.commands.get(command.name()) else {
        if command == ServiceCommand::Enter {
            return Ok(vec![DEFAULT_SHELL.to_string()]);
        }
        return Err(NotFoundError::Command {
            service_type: template.name.clone(),
            command: command.name().to_string(),
        }
        .into());
    };

    let rendered = TemplateEngine::new()
        .render(source, &config.environment)
        .with_context(|| format!("rendering {} command", command.name()))?;
    let argv = shell_words::split(&rendered)
        .with_context(|| format!("tokenising {} command", command.name()))?;
    if argv.is_empty() {
        bail!("{} command renders to nothing", command.name());
    }
    Ok(argv)
}

/// Run a template command inside the running container.
///
/// # Errors
///
/// Returns `ReadinessError::NotRunning` if the container is not running,
/// or the error of `render_command`.
pub async fn run_command(
    driver: &impl ContainerRuntime,
    template: &ServiceTemplate,
    config: &ServiceConfig,
    command: ServiceCommand,
    tty: bool,
) -> Result<ExitStatus> {
    let container = config.container_name();
    let running = driver
        .container_inspect(&container)
        .await?
        .is_some_and(|state| state.running);
    if !running {
        return Err(ReadinessError::NotRunning(container).into());
    }

    let argv = render_command(template, config, command)?;
    tracing::debug!(command = command.name(), ?argv, "executing in container");
    driver
        .container_exec(&container, &argv, tty && command.interactive())
        .await
}

/// Exported variables rendered against the service environment plus
/// `SERVICE_HOST`, `SERVICE_NAME` and `SERVICE_TYPE`.
///
/// # Errors
///
/// Returns an error if a value template fails to render.
pub fn exported_variables(
    template: &ServiceTemplate,
    config: &ServiceConfig,
) -> Result<BTreeMap<String, String>> {
    let mut data = config.environment.clone();
    data.insert("SERVICE_HOST".to_string(), config.network_alias());
    data.insert("SERVICE_NAME".to_string(), config.service_name.clone());
    data.insert("SERVICE_TYPE".to_string(), config.service_type.clone());

    let mut engine = TemplateEngine::new();
    template
        .exported_variables
        .iter()
        .map(|(key, source)| {
            let value = engine
                .render(source, &data)
                .with_context(|| format!("rendering exported variable {key}"))?;
            Ok((key.clone(), value))
        })
        .collect()
}
