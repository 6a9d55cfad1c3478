use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use modinit::workspace::MANIFEST_FILE;

/// Find the nearest directory containing a workspace manifest, searching
/// upward from `start`.
pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    let mut path = start;

    loop {
        if path.join(MANIFEST_FILE).exists() {
            return Some(path.to_path_buf());
        }
        path = path.parent()?;
    }
}

/// Resolve the workspace to load: the given path, or the nearest workspace
/// above the current directory, or the current directory itself.
pub fn resolve_workspace_path(workspace: Option<String>) -> Result<PathBuf> {
    if let Some(path) = workspace {
        return PathBuf::from(&path)
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize provided workspace path: {}", path));
    }

    let current = std::env::current_dir().context("Failed to get current directory")?;
    Ok(find_workspace_root(&current).unwrap_or(current))
}
