//! Tests for filesystem tools

use nbpilot_agent::tools::{ListDirTool, ReadFileTool, Tool};
use nbpilot_agent::ToolRegistry;
use std::fs;
use tempfile::TempDir;

fn args(path: &str) -> Vec<String> {
    vec![path.to_string()]
}

#[tokio::test]
async fn test_read_file_relative_to_workspace() {
    let workspace = TempDir::new().unwrap();
    fs::write(workspace.path().join("notes.md"), "remember the milk").unwrap();

    let tool = ReadFileTool::new(workspace.path().to_path_buf());
    let result = tool.invoke(&args("notes.md")).await.unwrap();

    assert_eq!(result, "remember the milk");
}

#[tokio::test]
async fn test_read_file_absolute_inside_workspace() {
    let workspace = TempDir::new().unwrap();
    let file = workspace.path().join("abs.txt");
    fs::write(&file, "absolute").unwrap();

    let tool = ReadFileTool::new(workspace.path().to_path_buf());
    let result = tool.invoke(&args(file.to_str().unwrap())).await.unwrap();

    assert_eq!(result, "absolute");
}

#[tokio::test]
async fn test_read_file_missing() {
    let workspace = TempDir::new().unwrap();
    let tool = ReadFileTool::new(workspace.path().to_path_buf());

    let result = tool.invoke(&args("nope.txt")).await.unwrap();
    assert_eq!(result, "No file at nope.txt");
}

#[tokio::test]
async fn test_read_file_on_directory() {
    let workspace = TempDir::new().unwrap();
    fs::create_dir(workspace.path().join("sub")).unwrap();
    let tool = ReadFileTool::new(workspace.path().to_path_buf());

    let result = tool.invoke(&args("sub")).await.unwrap();
    assert_eq!(result, "sub is not a file");
}

#[tokio::test]
async fn test_read_file_tool_outside_workspace() {
    let outside = TempDir::new().unwrap();
    let test_file = outside.path().join("outside.txt");
    fs::write(&test_file, "secret").unwrap();

    let workspace = TempDir::new().unwrap();
    let tool = ReadFileTool::new(workspace.path().to_path_buf());
    let result = tool.invoke(&args(test_file.to_str().unwrap())).await;

    let err = result.unwrap_err().to_string();
    assert!(
        err.contains("is outside workspace"),
        "Expected workspace error, got: {}",
        err
    );
}

#[tokio::test]
async fn test_read_file_traversal_blocked() {
    let root = TempDir::new().unwrap();
    let workspace = root.path().join("ws");
    fs::create_dir(&workspace).unwrap();
    fs::write(root.path().join("secret.txt"), "secret").unwrap();

    let tool = ReadFileTool::new(workspace);
    assert!(tool.invoke(&args("../secret.txt")).await.is_err());
}

#[tokio::test]
async fn test_list_dir_sorted_with_markers() {
    let workspace = TempDir::new().unwrap();
    fs::write(workspace.path().join("b.txt"), "").unwrap();
    fs::write(workspace.path().join("a.txt"), "").unwrap();
    fs::create_dir(workspace.path().join("docs")).unwrap();

    let tool = ListDirTool::new(workspace.path().to_path_buf());
    let result = tool.invoke(&args(".")).await.unwrap();

    assert_eq!(result, "[DIR] docs\n[FILE] a.txt\n[FILE] b.txt");
}

#[tokio::test]
async fn test_list_dir_empty_and_missing() {
    let workspace = TempDir::new().unwrap();
    fs::create_dir(workspace.path().join("empty")).unwrap();
    let tool = ListDirTool::new(workspace.path().to_path_buf());

    assert_eq!(tool.invoke(&args("empty")).await.unwrap(), "empty is empty");
    assert_eq!(
        tool.invoke(&args("ghost")).await.unwrap(),
        "No directory at ghost"
    );
}

#[tokio::test]
async fn test_list_dir_outside_workspace() {
    let workspace = TempDir::new().unwrap();
    let tool = ListDirTool::new(workspace.path().to_path_buf());

    assert!(tool.invoke(&args("/")).await.is_err());
}

#[tokio::test]
async fn test_outside_path_is_dispatch_failure() {
    let workspace = TempDir::new().unwrap();
    let mut registry = ToolRegistry::new();
    registry.register(ReadFileTool::new(workspace.path().to_path_buf()));

    let result = registry.invoke("read_file", &args("/etc/hostname")).await;
    assert!(result.is_err());
}
