//! Version command

use anyhow::Result;

use crate::output::Renderer;

/// Run the version command.
///
/// Needs no settings or registry so it works on a broken install.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(renderer: &Renderer<'_>) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    match renderer {
        Renderer::Human(r) => r.render_version(version),
        Renderer::Json(r) => r.render_version(version)?,
    }
    Ok(())
}
