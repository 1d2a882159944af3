//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed document to
//! stdout. Failures print the error object from `format_error`.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use svcforge_common::ServiceTemplate;

use crate::application::services::lifecycle::{ServiceStatus, StopOutcome};
use crate::application::services::provision::StartOutcome;
use crate::domain::{
    CompileError, NotFoundError, ReadinessError, RenderError, RuntimeError, ServiceConfig,
    ValidationError,
};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stable error code for the first typed error in the chain.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if cause.is::<CompileError>() || cause.is::<RenderError>() {
            return "COMPILE";
        }
        if cause.is::<ValidationError>() {
            return "VALIDATION";
        }
        if cause.is::<NotFoundError>() {
            return "NOT_FOUND";
        }
        if cause.is::<ReadinessError>() {
            return "READINESS";
        }
        if cause.is::<RuntimeError>() {
            return "RUNTIME";
        }
    }
    "ERROR"
}

fn emit(value: &Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("JSON serialization failed")?
    );
    Ok(())
}

/// Template summary with generated defaults hidden.
#[must_use]
pub fn template_value(template: &ServiceTemplate) -> Value {
    let arguments: Vec<Value> = template
        .arguments
        .iter()
        .map(|a| {
            json!({
                "name": a.name,
                "default": if a.is_variable { Value::Null } else { Value::from(a.value.as_str()) },
                "generated": a.is_variable,
                "required": a.value.is_empty(),
                "secret": a.is_secret(),
            })
        })
        .collect();
    json!({
        "name": template.name,
        "description": template.description,
        "image": template.image.reference(),
        "vendored": template.vendored,
        "arguments": arguments,
        "commands": template.commands.keys().collect::<Vec<_>>(),
        "exported_variables": template.exported_variables.keys().collect::<Vec<_>>(),
        "hooks": template.hooks,
        "ports": template.ports,
        "volumes": template.volumes,
    })
}

/// Machine-readable renderer.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        emit(&json!({ "version": version }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_template_list<'t>(
        &self,
        templates: impl Iterator<Item = &'t ServiceTemplate>,
    ) -> Result<()> {
        let list: Vec<Value> = templates
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "vendored": t.vendored,
                })
            })
            .collect();
        emit(&Value::Array(list))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_template_info(&self, template: &ServiceTemplate) -> Result<()> {
        emit(&template_value(template))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_service_list(&self, services: &[ServiceStatus]) -> Result<()> {
        let list: Vec<Value> = services
            .iter()
            .map(|s| {
                json!({
                    "name": s.config.service_name,
                    "type": s.config.service_type,
                    "running": s.running,
                    "created_at": s.config.created_at,
                })
            })
            .collect();
        emit(&Value::Array(list))
    }

    /// `config` must already be redacted.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_service_info(
        &self,
        config: &ServiceConfig,
        running: bool,
        exported: &BTreeMap<String, String>,
    ) -> Result<()> {
        emit(&json!({
            "config": config,
            "running": running,
            "exported_variables": exported,
        }))
    }

    /// `config` must already be redacted.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_created(&self, config: &ServiceConfig) -> Result<()> {
        emit(&json!({
            "created": true,
            "name": config.service_name,
            "type": config.service_type,
            "container": config.container_name(),
            "image": config.image_name(),
            "config": config,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_started(&self, service_type: &str, name: &str, outcome: StartOutcome) -> Result<()> {
        let outcome = match outcome {
            StartOutcome::AlreadyRunning => "already_running",
            StartOutcome::Restarted => "restarted",
            StartOutcome::Recreated => "recreated",
        };
        emit(&json!({ "name": name, "type": service_type, "outcome": outcome }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_stopped(&self, service_type: &str, name: &str, outcome: StopOutcome) -> Result<()> {
        let outcome = match outcome {
            StopOutcome::Stopped => "stopped",
            StopOutcome::AlreadyStopped => "already_stopped",
            StopOutcome::Absent => "absent",
        };
        emit(&json!({ "name": name, "type": service_type, "outcome": outcome }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_destroyed(&self, service_type: &str, name: &str) -> Result<()> {
        emit(&json!({ "name": name, "type": service_type, "destroyed": true }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_exists(&self, service_type: &str, name: &str, exists: bool) -> Result<()> {
        emit(&json!({ "name": name, "type": service_type, "exists": exists }))
    }
}
