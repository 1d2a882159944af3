//! Human-readable terminal renderer.

use std::collections::BTreeMap;

use owo_colors::OwoColorize as _;
use svcforge_common::ServiceTemplate;

use crate::application::services::lifecycle::{ServiceStatus, StopOutcome};
use crate::application::services::provision::StartOutcome;
use crate::domain::ServiceConfig;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("svcforge {version}");
    }

    pub fn render_template_list<'t>(&self, templates: impl Iterator<Item = &'t ServiceTemplate>) {
        if self.ctx.quiet {
            return;
        }
        let templates: Vec<_> = templates.collect();
        if templates.is_empty() {
            self.ctx.info("No templates available.");
            return;
        }
        let width = templates.iter().map(|t| t.name.len()).max().unwrap_or(0);
        for template in templates {
            println!(
                "  {:<width$}  {}",
                template.name.style(self.ctx.styles.bold),
                template.description.style(self.ctx.styles.dim),
            );
        }
    }

    pub fn render_template_info(&self, template: &ServiceTemplate) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.header(&template.name);
        self.ctx.kv("Description:", &template.description);
        self.ctx.kv("Image:", &template.image.reference());
        self.ctx.kv("Source:", &template.path.display().to_string());

        if !template.arguments.is_empty() {
            println!();
            self.ctx.header("Arguments:");
            for argument in &template.arguments {
                let default = if argument.is_variable {
                    "generated on create"
                        .style(self.ctx.styles.secret)
                        .to_string()
                } else if argument.value.is_empty() {
                    "required".style(self.ctx.styles.warning).to_string()
                } else {
                    argument.value.clone()
                };
                println!("    {}  {default}", argument.name.style(self.ctx.styles.bold));
            }
        }

        let ports = &template.ports;
        if !ports.expose.is_empty() || !ports.wait.is_empty() {
            println!();
            self.ctx.header("Ports:");
            self.ctx.kv("Expose:", &join_ports(&ports.expose));
            self.ctx.kv("Wait:", &join_ports(&ports.wait));
        }

        if !template.volumes.is_empty() {
            println!();
            self.ctx.header("Volumes:");
            for volume in &template.volumes {
                self.ctx.kv(&volume.alias, &volume.container_path);
            }
        }

        if !template.commands.is_empty() {
            println!();
            self.ctx.header("Commands:");
            let names: Vec<&str> = template.commands.keys().map(String::as_str).collect();
            println!("    {}", names.join(", "));
        }
    }

    pub fn render_service_list(&self, service_type: &str, services: &[ServiceStatus]) {
        if self.ctx.quiet {
            return;
        }
        if services.is_empty() {
            self.ctx.info(&format!("No {service_type} services."));
            return;
        }
        for service in services {
            let (marker, state) = if service.running {
                ("●".style(self.ctx.styles.success).to_string(), "running")
            } else {
                ("○".style(self.ctx.styles.dim).to_string(), "stopped")
            };
            println!(
                "  {marker} {}  {}  {}",
                service.config.service_name.style(self.ctx.styles.bold),
                state,
                service
                    .config
                    .created_at
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
                    .style(self.ctx.styles.dim),
            );
        }
    }

    /// `config` must already be redacted.
    pub fn render_service_info(
        &self,
        config: &ServiceConfig,
        running: bool,
        exported: &BTreeMap<String, String>,
    ) {
        if self.ctx.quiet {
            return;
        }
        self.ctx
            .header(&format!("{} {}", config.service_type, config.service_name));
        self.ctx
            .kv("Status:", if running { "running" } else { "stopped" });
        self.ctx.kv("Container:", &config.container_name());
        self.ctx.kv("Image:", &config.image_name());
        self.ctx.kv("Base image:", &config.image.reference());
        self.ctx.kv("Alias:", &config.network_alias());
        self.ctx
            .kv("Data:", &config.service_root.display().to_string());
        self.ctx.kv(
            "Created:",
            &config.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );

        if !config.environment.is_empty() {
            println!();
            self.ctx.header("Environment:");
            for (key, value) in &config.environment {
                self.ctx.kv(key, value);
            }
        }

        if !exported.is_empty() {
            println!();
            self.ctx.header("Exported variables:");
            for (key, value) in exported {
                self.ctx.kv(key, value);
            }
        }
    }

    pub fn render_created(&self, config: &ServiceConfig) {
        self.ctx.success(&format!(
            "{} service {} created",
            config.service_type, config.service_name
        ));
    }

    pub fn render_started(&self, service_type: &str, name: &str, outcome: StartOutcome) {
        match outcome {
            StartOutcome::AlreadyRunning => self
                .ctx
                .info(&format!("{service_type} service {name} is already running")),
            StartOutcome::Restarted | StartOutcome::Recreated => self
                .ctx
                .success(&format!("{service_type} service {name} started")),
        }
    }

    pub fn render_stopped(&self, service_type: &str, name: &str, outcome: StopOutcome, verb: &str) {
        match outcome {
            StopOutcome::Stopped => self
                .ctx
                .success(&format!("{service_type} service {name} {verb}")),
            StopOutcome::AlreadyStopped => self
                .ctx
                .info(&format!("{service_type} service {name} was not running")),
            StopOutcome::Absent => self
                .ctx
                .info(&format!("{service_type} service {name} has no container")),
        }
    }

    pub fn render_destroyed(&self, service_type: &str, name: &str) {
        self.ctx
            .success(&format!("{service_type} service {name} destroyed"));
    }
}

fn join_ports(ports: &[u16]) -> String {
    if ports.is_empty() {
        return "-".to_string();
    }
    ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
