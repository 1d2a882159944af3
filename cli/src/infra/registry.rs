//! Template registry: compiles a directory of templates into a name-keyed set.
//!
//! The vendored set is compiled into the binary with `include_dir!` and
//! extracted to a temporary directory that lives as long as the registry.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use include_dir::{Dir, DirEntry, include_dir};
use svcforge_common::ServiceTemplate;

use crate::domain::NotFoundError;
use crate::domain::compiler::compile;
use crate::infra::fs::set_executable;

/// Recipe file compiled from each template directory.
pub const RECIPE_FILE: &str = "Dockerfile";

/// Templates bundled with the binary.
static VENDORED_TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Compiled templates keyed by name.
pub struct TemplateRegistry {
    templates: BTreeMap<String, ServiceTemplate>,
    /// Keeps extracted vendored templates on disk.
    _scratch: Option<tempfile::TempDir>,
}

impl TemplateRegistry {
    /// Compile every subdirectory of `root`.
    ///
    /// # Errors
    ///
    /// Fails if `root` cannot be read or any one template fails to compile.
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_with(root, false, None)
    }

    /// Extract and compile the templates bundled with the binary.
    ///
    /// # Errors
    ///
    /// Fails if extraction fails or any bundled template fails to compile.
    pub fn vendored() -> Result<Self> {
        let scratch = tempfile::tempdir().context("creating temp dir for templates")?;
        extract(&VENDORED_TEMPLATES, scratch.path())?;
        let root = scratch.path().to_path_buf();
        Self::load_with(&root, true, Some(scratch))
    }

    fn load_with(root: &Path, vendored: bool, scratch: Option<tempfile::TempDir>) -> Result<Self> {
        let entries = std::fs::read_dir(root)
            .with_context(|| format!("reading template directory {}", root.display()))?;

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("reading {}", root.display()))?;
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        let mut templates: BTreeMap<String, ServiceTemplate> = BTreeMap::new();
        for dir in dirs {
            let template = compile_dir(&dir, vendored)?;
            if let Some(existing) = templates.get(&template.name) {
                bail!(
                    "duplicate template name {} in {} and {}",
                    template.name,
                    existing.path.display(),
                    dir.display()
                );
            }
            tracing::debug!(template = %template.name, path = %dir.display(), "template loaded");
            templates.insert(template.name.clone(), template);
        }

        Ok(Self {
            templates,
            _scratch: scratch,
        })
    }

    /// Look up a template by exact name.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Template` for an unknown name.
    pub fn get(&self, name: &str) -> Result<&ServiceTemplate, NotFoundError> {
        self.templates
            .get(name)
            .ok_or_else(|| NotFoundError::Template(name.to_string()))
    }

    /// Templates in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceTemplate> {
        self.templates.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn compile_dir(dir: &Path, vendored: bool) -> Result<ServiceTemplate> {
    let recipe = dir.join(RECIPE_FILE);
    let source = std::fs::read_to_string(&recipe)
        .with_context(|| format!("reading {}", recipe.display()))?;
    compile(&source, dir, vendored).with_context(|| format!("compiling template {}", dir.display()))
}

/// Write an embedded tree to disk, marking files under a `bin/` segment executable.
fn extract(dir: &Dir<'_>, target: &Path) -> Result<()> {
    for entry in dir.entries() {
        match entry {
            DirEntry::Dir(sub) => extract(sub, target)?,
            DirEntry::File(file) => {
                let path = target.join(file.path());
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating directory {}", parent.display()))?;
                }
                std::fs::write(&path, file.contents())
                    .with_context(|| format!("extracting {}", path.display()))?;
                if file.path().components().any(|c| c.as_os_str() == "bin") {
                    set_executable(&path)?;
                }
            }
        }
    }
    Ok(())
}
