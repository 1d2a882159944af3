//! Deterministic runtime names derived from (service type, service name).
//!
//! Nothing here is persisted: every later operation recomputes the same
//! names from the stored configuration.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::ValidationError;

/// Prefix shared by every runtime object this tool creates.
pub const PREFIX: &str = "svcforge";

/// Checked before any name or path interpolation.
pub static SERVICE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9][a-z0-9_-]{0,62}$").expect("valid regex")
});

/// Validate a service instance name.
///
/// # Errors
///
/// Returns `ValidationError::InvalidServiceName` when the name does not match
/// [`SERVICE_NAME_RE`].
pub fn validate_service_name(name: &str) -> Result<(), ValidationError> {
    if SERVICE_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidServiceName(name.to_string()))
    }
}

/// Volume alias: upper-cased slug of the container path, `-` replaced by `_`.
#[must_use]
pub fn volume_alias(container_path: &str) -> String {
    slug::slugify(container_path)
        .to_uppercase()
        .replace('-', "_")
}

#[must_use]
pub fn container_name(service_type: &str, name: &str) -> String {
    format!("{PREFIX}.{service_type}.{name}")
}

#[must_use]
pub fn image_name(service_type: &str, name: &str) -> String {
    format!("{PREFIX}/service-{service_type}:{name}")
}

/// Alias the container answers to on attached networks.
#[must_use]
pub fn network_alias(service_type: &str, name: &str) -> String {
    format!("{PREFIX}.{service_type}.{}", slug::slugify(name))
}

#[must_use]
pub fn volume_name(service_type: &str, name: &str, alias: &str) -> String {
    format!("{PREFIX}.{service_type}.{name}.{}", slug::slugify(alias))
}

/// Directory holding every instance of a service type.
#[must_use]
pub fn type_root(data_root: &Path, service_type: &str) -> PathBuf {
    data_root.join(service_type)
}

#[must_use]
pub fn service_root(data_root: &Path, service_type: &str, name: &str) -> PathBuf {
    type_root(data_root, service_type).join(name)
}
