//! Read-only filesystem tools confined to the workspace

use async_trait::async_trait;
use std::path::PathBuf;

use tracing::debug;

use super::path_utils::validate_workspace_path;
use super::{Tool, ToolResult, ToolSpec};

/// `read_file(path)`: return a file's text
pub struct ReadFileTool {
    spec: ToolSpec,
    workspace: PathBuf,
}

impl ReadFileTool {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            spec: ToolSpec::new(
                "read_file",
                &["path"],
                "Read a text file from the workspace and return its content",
                "ToolUsage: read_file(notes/todo.md)",
            ),
            workspace,
        }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: &[String]) -> ToolResult {
        let requested = args.first().ok_or("missing path argument")?;
        let path = validate_workspace_path(requested, &self.workspace).await?;

        debug!("Reading {:?}", path);
        if !path.exists() {
            return Ok(format!("No file at {}", requested));
        }
        if !path.is_file() {
            return Ok(format!("{} is not a file", requested));
        }
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Ok(format!("Permission denied: {}", requested))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// `list_dir(path)`: list a directory, one entry per line
pub struct ListDirTool {
    spec: ToolSpec,
    workspace: PathBuf,
}

impl ListDirTool {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            spec: ToolSpec::new(
                "list_dir",
                &["path"],
                "List the entries of a workspace directory, use . for the workspace root",
                "ToolUsage: list_dir(.)",
            ),
            workspace,
        }
    }
}

#[async_trait]
impl Tool for ListDirTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: &[String]) -> ToolResult {
        let requested = args.first().ok_or("missing path argument")?;
        let path = validate_workspace_path(requested, &self.workspace).await?;

        debug!("Listing {:?}", path);
        if !path.exists() {
            return Ok(format!("No directory at {}", requested));
        }
        if !path.is_dir() {
            return Ok(format!("{} is not a directory", requested));
        }

        let mut entries = tokio::fs::read_dir(&path).await?;
        let mut items = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let prefix = if entry.file_type().await?.is_dir() {
                "[DIR] "
            } else {
                "[FILE] "
            };
            items.push(format!("{}{}", prefix, name));
        }
        items.sort();

        if items.is_empty() {
            Ok(format!("{} is empty", requested))
        } else {
            Ok(items.join("\n"))
        }
    }
}
