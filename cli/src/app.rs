//! Application context: unified state passed to every command handler.
//!
//! Built once from the global flags, the settings file and the template
//! registry. Command handlers take `&AppContext` and never construct
//! adapters themselves.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::Settings;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::docker::DockerDriver;
use crate::infra::fs::LocalFs;
use crate::infra::registry::TemplateRegistry;
use crate::infra::state::FsServiceStore;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Location overrides from the command line or environment.
pub struct PathFlags {
    pub data_root: Option<PathBuf>,
    pub registry_path: Option<PathBuf>,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub paths: PathFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Effective settings with command-line overrides applied.
    pub settings: Settings,
    /// Compiled templates.
    pub registry: TemplateRegistry,
    /// Container runtime adapter.
    pub driver: DockerDriver<TokioCommandRunner>,
    /// Per-service configuration store.
    pub store: FsServiceStore,
    pub local_fs: LocalFs,
    /// When `true`, skip interactive prompts.
    ///
    /// Set when the `CI` environment variable is present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags and loaded settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the template registry fails to load.
    pub fn new(flags: &AppFlags, mut settings: Settings) -> Result<Self> {
        if let Some(root) = &flags.paths.data_root {
            settings.data_root = Some(root.clone());
        }
        if let Some(path) = &flags.paths.registry_path {
            settings.registry_path = Some(path.clone());
        }

        let registry = match &settings.registry_path {
            Some(path) => TemplateRegistry::load(path)
                .with_context(|| format!("loading templates from {}", path.display()))?,
            None => TemplateRegistry::vendored().context("loading bundled templates")?,
        };

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet || flags.output.json),
            mode,
            store: FsServiceStore::new(settings.data_root()),
            settings,
            registry,
            driver: DockerDriver::default_runner(),
            local_fs: LocalFs,
            non_interactive: std::env::var_os("CI").is_some(),
        })
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true`, returns `default` immediately
    /// without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}
