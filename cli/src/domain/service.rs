//! The canonical per-instance configuration.
//!
//! Produced once at create time from the template plus caller input, written
//! to `<service root>/config.json`, and read back unchanged by every later
//! operation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use svcforge_common::{SECRET_SUFFIX, ServiceImage, ServiceTemplate};

use crate::domain::arguments::{self, ResolvedArgument};
use crate::domain::error::ValidationError;
use crate::domain::naming;

pub const ENV_FILE: &str = ".env";
pub const CONFIG_FILE: &str = "config.json";
pub const ID_FILE: &str = "ID";

const REDACTED: &str = "********";

/// Networks the container joins, by pipeline stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Networks {
    /// Passed to container create.
    #[serde(default)]
    pub initial: Option<String>,
    /// Connected right after the container is created.
    #[serde(default)]
    pub post_create: Vec<String>,
    /// Connected once the container is ready.
    #[serde(default)]
    pub post_start: Vec<String>,
}

impl Networks {
    /// External networks that must exist before provisioning starts.
    pub fn attached(&self) -> impl Iterator<Item = &str> {
        self.post_create
            .iter()
            .chain(self.post_start.iter())
            .map(String::as_str)
    }
}

/// Caller input for a new service instance.
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub name: String,
    pub data_root: PathBuf,
    /// `NAME=VALUE` overrides; an empty value defers to the environment.
    pub arguments: Vec<(String, String)>,
    pub container_create_flags: Vec<String>,
    pub image_build_flags: Vec<String>,
    pub image: Option<String>,
    pub use_volumes: bool,
    pub networks: Networks,
}

/// Resolved configuration of one service instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    pub service_name: String,
    pub service_type: String,
    pub arguments: BTreeMap<String, ResolvedArgument>,
    #[serde(default)]
    pub container_create_flags: Vec<String>,
    #[serde(default)]
    pub image_build_flags: Vec<String>,
    #[serde(rename = "env")]
    pub environment: BTreeMap<String, String>,
    pub image: ServiceImage,
    pub data_root: PathBuf,
    pub service_root: PathBuf,
    #[serde(default)]
    pub use_volumes: bool,
    #[serde(default)]
    pub networks: Networks,
    pub created_at: DateTime<Utc>,
    pub template: ServiceTemplate,
}

impl ServiceConfig {
    /// Resolve a create request against a template.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for an invalid service name or any
    /// unresolved required argument.
    pub fn resolve<F>(
        request: CreateRequest,
        template: &ServiceTemplate,
        env: F,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        naming::validate_service_name(&request.name)?;
        let mut resolved = arguments::resolve(template, &request.arguments, env)?;
        arguments::apply_image_override(&mut resolved, request.image.as_deref());
        let image = arguments::effective_image(template, &resolved);

        Ok(Self {
            service_root: naming::service_root(&request.data_root, &template.name, &request.name),
            service_name: request.name,
            service_type: template.name.clone(),
            environment: arguments::environment(&resolved),
            arguments: resolved,
            container_create_flags: request.container_create_flags,
            image_build_flags: request.image_build_flags,
            image,
            data_root: request.data_root,
            use_volumes: request.use_volumes,
            networks: request.networks,
            created_at: now,
            template: template.clone(),
        })
    }

    #[must_use]
    pub fn container_name(&self) -> String {
        naming::container_name(&self.service_type, &self.service_name)
    }

    #[must_use]
    pub fn image_name(&self) -> String {
        naming::image_name(&self.service_type, &self.service_name)
    }

    #[must_use]
    pub fn network_alias(&self) -> String {
        naming::network_alias(&self.service_type, &self.service_name)
    }

    #[must_use]
    pub fn env_file(&self) -> PathBuf {
        self.service_root.join(ENV_FILE)
    }

    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.service_root.join(CONFIG_FILE)
    }

    #[must_use]
    pub fn id_file(&self) -> PathBuf {
        self.service_root.join(ID_FILE)
    }

    /// Non-secret build arguments.
    #[must_use]
    pub fn build_args(&self) -> Vec<(String, String)> {
        arguments::build_args(&self.arguments)
    }

    /// Contents of the environment file: one `KEY=VALUE` per line.
    #[must_use]
    pub fn env_file_contents(&self) -> String {
        self.environment
            .iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect()
    }

    /// Copy with secret values masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for (name, argument) in &mut copy.arguments {
            if let Some(env_name) = name.strip_suffix(SECRET_SUFFIX) {
                argument.value = REDACTED.to_string();
                if let Some(value) = copy.environment.get_mut(env_name) {
                    *value = REDACTED.to_string();
                }
            }
        }
        copy
    }
}
