use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Name of the argument whose value seeds the template image reference.
pub const IMAGE_ARGUMENT: &str = "IMAGE";

/// Arguments ending in this suffix never reach the image build.
pub const SECRET_SUFFIX: &str = "_SECRET";

/// Default image used to run lifecycle hooks.
pub const DEFAULT_HOOK_IMAGE: &str = "bash:5";

/// A compiled service template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceTemplate {
    pub name: String,
    pub image: ServiceImage,
    pub description: String,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub hooks: ServiceHooks,
    #[serde(default)]
    pub exported_variables: BTreeMap<String, String>,
    #[serde(default)]
    pub mapped_variables: BTreeMap<String, String>,
    /// Named command templates (`connect`, `enter`, `export`, `import`).
    #[serde(default)]
    pub commands: BTreeMap<String, String>,
    #[serde(default)]
    pub ports: ServicePorts,
    #[serde(default)]
    pub volumes: Vec<Volume>,
    /// Directory the template was compiled from.
    pub path: PathBuf,
    #[serde(default)]
    pub vendored: bool,
}

impl ServiceTemplate {
    /// Look up a declared argument by name.
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Path of the build recipe inside the template directory.
    #[must_use]
    pub fn recipe_path(&self) -> PathBuf {
        self.path.join("Dockerfile")
    }

    /// Path of a hook script inside the template's `bin/` directory.
    #[must_use]
    pub fn hook_path(&self, hook: &str) -> PathBuf {
        self.path.join("bin").join(hook)
    }
}

/// Image reference split into name and tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceImage {
    pub name: String,
    #[serde(default)]
    pub tag: String,
}

impl ServiceImage {
    /// Split `name[:tag]` at the first colon.
    #[must_use]
    pub fn parse(reference: &str) -> Self {
        match reference.split_once(':') {
            Some((name, tag)) => Self {
                name: name.to_string(),
                tag: tag.split(':').next().unwrap_or_default().to_string(),
            },
            None => Self {
                name: reference.to_string(),
                tag: String::new(),
            },
        }
    }

    /// Render back to `name[:tag]`.
    #[must_use]
    pub fn reference(&self) -> String {
        if self.tag.is_empty() {
            self.name.clone()
        } else {
            format!("{}:{}", self.name, self.tag)
        }
    }
}

/// Which lifecycle hooks a template ships, and the image that runs them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceHooks {
    pub image: String,
    #[serde(default)]
    pub pre_create: bool,
    #[serde(default)]
    pub post_create: bool,
    #[serde(default)]
    pub post_start: bool,
}

impl Default for ServiceHooks {
    fn default() -> Self {
        Self {
            image: DEFAULT_HOOK_IMAGE.to_string(),
            pre_create: false,
            post_create: false,
            post_start: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServicePorts {
    #[serde(default)]
    pub expose: Vec<u16>,
    #[serde(default)]
    pub wait: Vec<u16>,
}

/// A build argument declared by the recipe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    /// Raw default expression as written in the recipe.
    #[serde(default)]
    pub template: String,
    /// Rendered default.
    #[serde(default)]
    pub value: String,
    /// True when rendering changed the expression, i.e. the default is generated.
    #[serde(default)]
    pub is_variable: bool,
}

impl Argument {
    /// Whether the name carries the secret suffix.
    #[must_use]
    pub fn is_secret(&self) -> bool {
        self.name.ends_with(SECRET_SUFFIX)
    }

    /// Name with the secret suffix removed.
    #[must_use]
    pub fn env_name(&self) -> &str {
        self.name.strip_suffix(SECRET_SUFFIX).unwrap_or(&self.name)
    }
}

/// A declared container volume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Volume {
    pub alias: String,
    pub container_path: String,
}
