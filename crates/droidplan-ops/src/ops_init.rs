//! Operation: scaffold `Droidplan.toml` and `catalog.toml` in a directory.

use std::path::{Path, PathBuf};

use droidplan_core::template::{render_android_app, TemplateContext};
use droidplan_util::errors::DroidplanError;

/// Write the Android app template into `dir`, returning the written paths.
///
/// Existing files are only overwritten with `force`.
pub fn init(dir: &Path, force: bool) -> miette::Result<Vec<PathBuf>> {
    let name = dir
        .canonicalize()
        .ok()
        .and_then(|d| d.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| "android-app".to_string());
    let files = render_android_app(&TemplateContext::new(&name));

    if !force {
        if let Some((existing, _)) = files.iter().find(|(file, _)| dir.join(file).exists()) {
            return Err(DroidplanError::Generic {
                message: format!(
                    "{existing} already exists in {}; pass --force to overwrite",
                    dir.display()
                ),
            }
            .into());
        }
    }

    let mut written = Vec::with_capacity(files.len());
    for (file, content) in files {
        let path = dir.join(file);
        droidplan_util::fs::write_with_parents(&path, &content).map_err(DroidplanError::Io)?;
        tracing::debug!("wrote {}", path.display());
        written.push(path);
    }
    droidplan_util::progress::status("Created", &format!("droidplan project `{name}`"));
    Ok(written)
}
