//! Workspace confinement for the filesystem tools

use std::path::{Component, Path, PathBuf};

use nbpilot_config::paths::expand_home;

use super::ToolError;

/// A requested path resolved outside the workspace
#[derive(Debug, Clone)]
pub struct PathValidationError {
    pub path: String,
    pub workspace: String,
}

impl std::fmt::Display for PathValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Path {} is outside workspace {}",
            self.path, self.workspace
        )
    }
}

impl std::error::Error for PathValidationError {}

/// Resolve `path` against the workspace and make sure it stays inside.
///
/// Relative paths are joined to the workspace, `~/` expands to the home
/// directory. Symlinks are resolved for the part of the path that exists;
/// the rest is normalized lexically so `..` cannot escape.
pub async fn validate_workspace_path(
    path: &str,
    workspace_root: &Path,
) -> Result<PathBuf, ToolError> {
    let expanded = if path.starts_with('/') || path.starts_with('~') {
        expand_home(path)
    } else {
        workspace_root.join(path)
    };

    let absolute = resolve(&expanded).await?;
    let workspace = resolve(workspace_root).await?;

    if !absolute.starts_with(&workspace) {
        return Err(Box::new(PathValidationError {
            path: path.to_string(),
            workspace: workspace.display().to_string(),
        }));
    }

    Ok(absolute)
}

/// Canonicalize the longest existing ancestor, then append the remainder
async fn resolve(path: &Path) -> std::io::Result<PathBuf> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut existing = path.as_path();
    let mut rest = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = tokio::fs::canonicalize(existing)
        .await
        .unwrap_or_else(|_| normalize(existing));
    for name in rest.into_iter().rev() {
        resolved.push(name);
    }
    Ok(normalize(&resolved))
}

/// Lexically drop `.` and fold `..`
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
