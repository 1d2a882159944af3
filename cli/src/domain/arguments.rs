//! Argument resolution: template defaults, caller overrides, environment
//! fallbacks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use svcforge_common::{IMAGE_ARGUMENT, SECRET_SUFFIX, ServiceImage, ServiceTemplate};

use crate::domain::error::ValidationError;

/// An effective argument value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedArgument {
    pub value: String,
    /// Supplied by the caller or the environment rather than the template.
    #[serde(rename = "override")]
    pub is_override: bool,
}

/// Parse a caller `NAME=VALUE` (or bare `NAME`) argument.
///
/// # Errors
///
/// Returns `ValidationError::InvalidArgument` when the name is empty.
pub fn parse_override(raw: &str) -> Result<(String, String), ValidationError> {
    let (name, value) = raw.split_once('=').unwrap_or((raw, ""));
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidArgument(raw.to_string()));
    }
    Ok((name.trim().to_string(), value.to_string()))
}

/// Merge template defaults with caller overrides.
///
/// An override with an empty value falls back to the identically named
/// variable returned by `env`. Every merged entry is validated; all names
/// left empty without an override are reported together.
///
/// # Errors
///
/// Returns `ValidationError::MissingArguments` listing every unresolved
/// required argument.
pub fn resolve<F>(
    template: &ServiceTemplate,
    overrides: &[(String, String)],
    env: F,
) -> Result<BTreeMap<String, ResolvedArgument>, ValidationError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut merged: BTreeMap<String, ResolvedArgument> = template
        .arguments
        .iter()
        .map(|a| {
            (
                a.name.clone(),
                ResolvedArgument {
                    value: a.value.clone(),
                    is_override: false,
                },
            )
        })
        .collect();

    for (name, value) in overrides {
        let value = if value.is_empty() {
            env(name).unwrap_or_default()
        } else {
            value.clone()
        };
        merged.insert(
            name.clone(),
            ResolvedArgument {
                value,
                is_override: true,
            },
        );
    }

    let missing: Vec<String> = merged
        .iter()
        .filter(|(_, a)| a.value.is_empty() && !a.is_override)
        .map(|(name, _)| name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingArguments(missing));
    }
    Ok(merged)
}

/// Inject an image override as the `IMAGE` argument.
pub fn apply_image_override(
    arguments: &mut BTreeMap<String, ResolvedArgument>,
    image: Option<&str>,
) {
    if let Some(reference) = image {
        arguments.insert(
            IMAGE_ARGUMENT.to_string(),
            ResolvedArgument {
                value: reference.to_string(),
                is_override: true,
            },
        );
    }
}

/// Effective image: the resolved `IMAGE` argument, else the template image.
#[must_use]
pub fn effective_image(
    template: &ServiceTemplate,
    arguments: &BTreeMap<String, ResolvedArgument>,
) -> ServiceImage {
    arguments
        .get(IMAGE_ARGUMENT)
        .filter(|a| !a.value.is_empty())
        .map_or_else(|| template.image.clone(), |a| ServiceImage::parse(&a.value))
}

/// Arguments passed to the image build. Secrets are excluded.
#[must_use]
pub fn build_args(arguments: &BTreeMap<String, ResolvedArgument>) -> Vec<(String, String)> {
    arguments
        .iter()
        .filter(|(name, _)| !name.ends_with(SECRET_SUFFIX))
        .map(|(name, a)| (name.clone(), a.value.clone()))
        .collect()
}

/// Runtime environment. Secrets are included with the suffix stripped.
#[must_use]
pub fn environment(arguments: &BTreeMap<String, ResolvedArgument>) -> BTreeMap<String, String> {
    arguments
        .iter()
        .map(|(name, a)| {
            (
                name.strip_suffix(SECRET_SUFFIX).unwrap_or(name).to_string(),
                a.value.clone(),
            )
        })
        .collect()
}
