//! `svcforge service create <template> <name>`: provision a new service.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::provision::{ProvisionOptions, create_service};
use crate::commands::cancel_on_ctrl_c;
use crate::domain::arguments::parse_override;
use crate::domain::{CreateRequest, Networks};
use crate::output::{Renderer, TerminalReporter};

/// Arguments for the create command.
#[derive(Args)]
pub struct CreateArgs {
    /// Service template
    pub template: String,

    /// Service name
    pub name: String,

    /// Template argument override, `NAME=VALUE`; a bare `NAME` reads the environment
    #[arg(short, long = "argument", value_name = "NAME=VALUE")]
    pub arguments: Vec<String>,

    /// Extra flags for container create, shell-quoted
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub container_create_flags: Option<String>,

    /// Extra flags for image build, shell-quoted
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub image_build_flags: Option<String>,

    /// Base image override, `name[:tag]`
    #[arg(long)]
    pub image: Option<String>,

    /// Use named volumes instead of host directories
    #[arg(long)]
    pub use_volumes: bool,

    /// Network passed to container create
    #[arg(long, value_name = "NETWORK")]
    pub initial_network: Option<String>,

    /// Network attached after the container is created
    #[arg(long = "post-create-network", value_name = "NETWORK")]
    pub post_create_networks: Vec<String>,

    /// Network attached after the service is ready
    #[arg(long = "post-start-network", value_name = "NETWORK")]
    pub post_start_networks: Vec<String>,
}

impl CreateArgs {
    /// Build the request for the application layer.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed argument override or unbalanced
    /// quoting in either flags string.
    pub fn into_request(self, data_root: PathBuf) -> Result<CreateRequest> {
        let arguments = self
            .arguments
            .iter()
            .map(|raw| parse_override(raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CreateRequest {
            name: self.name,
            data_root,
            arguments,
            container_create_flags: split_flags(self.container_create_flags.as_deref())
                .context("parsing --container-create-flags")?,
            image_build_flags: split_flags(self.image_build_flags.as_deref())
                .context("parsing --image-build-flags")?,
            image: self.image,
            use_volumes: self.use_volumes,
            networks: Networks {
                initial: self.initial_network,
                post_create: self.post_create_networks,
                post_start: self.post_start_networks,
            },
        })
    }
}

fn split_flags(raw: Option<&str>) -> Result<Vec<String>, shell_words::ParseError> {
    raw.map_or_else(|| Ok(Vec::new()), shell_words::split)
}

/// Run `svcforge service create`.
///
/// # Errors
///
/// Returns an error if the template is unknown or any provisioning stage fails.
pub async fn run(app: &AppContext, args: CreateArgs) -> Result<ExitCode> {
    let template = app.registry.get(&args.template)?;
    let request = args.into_request(app.settings.data_root())?;
    let reporter = TerminalReporter::new(&app.output);
    let cancel = cancel_on_ctrl_c();
    let opts = ProvisionOptions {
        reporter: &reporter,
        readiness: &app.settings.readiness,
        cancel: &cancel,
    };

    let config = create_service(
        &app.driver,
        &app.store,
        &app.local_fs,
        template,
        request,
        |name| std::env::var(name).ok(),
        &opts,
    )
    .await?;
    drop(reporter);

    match app.renderer() {
        Renderer::Human(r) => r.render_created(&config),
        Renderer::Json(r) => r.render_created(&config.redacted())?,
    }
    Ok(ExitCode::SUCCESS)
}
