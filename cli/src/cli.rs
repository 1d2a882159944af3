//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags, PathFlags};
use crate::application::services::exec::ServiceCommand as Exec;
use crate::commands::{self, ServiceCommand};
use crate::domain::Settings;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Provision backing-service containers from templates
#[derive(Parser)]
#[command(
    name = "svcforge",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log runtime invocations and pipeline details to stderr
    #[arg(long, global = true)]
    pub trace: bool,

    /// Root directory for service data
    #[arg(long, global = true, env = "SVCFORGE_DATA_ROOT", value_name = "DIR")]
    pub data_root: Option<PathBuf>,

    /// Template directory (default: bundled templates)
    #[arg(long, global = true, env = "SVCFORGE_REGISTRY_PATH", value_name = "DIR")]
    pub registry_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage service instances
    #[command(subcommand)]
    Service(ServiceCommand),

    /// Inspect service templates
    #[command(subcommand)]
    Template(commands::template::TemplateCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Whether the command reads the settings file.
    #[must_use]
    pub fn needs_settings(&self) -> bool {
        !matches!(self.command, Command::Version)
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if settings or templates cannot be loaded or the
    /// command fails.
    pub async fn run(self, settings: Settings) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            trace: _,
            data_root,
            registry_path,
            command,
        } = self;

        if matches!(command, Command::Version) {
            let ctx = OutputContext::new(no_color, quiet);
            let renderer = if json {
                Renderer::Json(JsonRenderer)
            } else {
                Renderer::Human(HumanRenderer::new(&ctx))
            };
            commands::version::run(&renderer)?;
            return Ok(ExitCode::SUCCESS);
        }

        let flags = AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            paths: PathFlags {
                data_root,
                registry_path,
            },
        };
        let app = AppContext::new(&flags, settings)?;

        match command {
            Command::Service(cmd) => run_service(&app, cmd).await,
            Command::Template(cmd) => commands::template::run(&app, &cmd),
            Command::Version => Ok(ExitCode::SUCCESS),
        }
    }
}

async fn run_service(app: &AppContext, cmd: ServiceCommand) -> Result<ExitCode> {
    match cmd {
        ServiceCommand::Create(args) => commands::create::run(app, args).await,
        ServiceCommand::Start(args) => commands::start::run(app, &args).await,
        ServiceCommand::Pause(args) => commands::stop::pause(app, &args).await,
        ServiceCommand::Stop(args) => commands::stop::stop(app, &args).await,
        ServiceCommand::Destroy(args) => commands::destroy::run(app, &args).await,
        ServiceCommand::Enter(args) => commands::exec::run(app, &args, Exec::Enter).await,
        ServiceCommand::Connect(args) => commands::exec::run(app, &args, Exec::Connect).await,
        ServiceCommand::Export(args) => commands::exec::run(app, &args, Exec::Export).await,
        ServiceCommand::Import(args) => commands::exec::run(app, &args, Exec::Import).await,
        ServiceCommand::Logs(args) => commands::logs::run(app, &args).await,
        ServiceCommand::List { template } => commands::list::run(app, &template).await,
        ServiceCommand::Exists(args) => commands::info::exists(app, &args).await,
        ServiceCommand::Info(args) => commands::info::info(app, &args).await,
    }
}
