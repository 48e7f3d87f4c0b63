//! Tools callable through `ToolUsage:` directives

pub mod clock;
pub mod filesystem;
pub mod path_utils;

pub use clock::CurrentTimeTool;
pub use filesystem::{ListDirTool, ReadFileTool};

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::DispatchError;

pub type ToolError = Box<dyn std::error::Error + Send + Sync>;
pub type ToolResult = Result<String, ToolError>;

/// Static description of a tool, rendered into the system prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: String,
    pub parameters: Vec<String>,
    pub description: String,
    pub example: String,
}

impl ToolSpec {
    pub fn new(
        name: impl Into<String>,
        parameters: &[&str],
        description: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            description: description.into(),
            example: example.into(),
        }
    }
}

/// A named capability invoked with positional string arguments
#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> &ToolSpec;

    async fn invoke(&self, args: &[String]) -> ToolResult;

    fn name(&self) -> &str {
        &self.spec().name
    }
}

/// Tool backed by a plain closure
pub struct FnTool<F> {
    spec: ToolSpec,
    func: F,
}

impl<F> FnTool<F>
where
    F: Fn(&[String]) -> ToolResult + Send + Sync,
{
    pub fn new(spec: ToolSpec, func: F) -> Self {
        Self { spec, func }
    }
}

#[async_trait]
impl<F> Tool for FnTool<F>
where
    F: Fn(&[String]) -> ToolResult + Send + Sync,
{
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: &[String]) -> ToolResult {
        (self.func)(args)
    }
}

/// Tools by name, kept in registration order
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool; an existing tool with the same name is replaced in place
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let existing = self.tools.iter().position(|t| t.name() == tool.name());
        match existing {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn specs(&self) -> Vec<&ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up and run a tool, checking arity against its declared parameters
    pub async fn invoke(&self, name: &str, args: &[String]) -> Result<String, DispatchError> {
        let tool = self
            .get(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;

        let expected = tool.spec().parameters.len();
        if args.len() != expected {
            return Err(DispatchError::ToolExecution {
                tool: name.to_string(),
                reason: format!("expected {} arguments, got {}", expected, args.len()),
            });
        }

        debug!("Invoking tool {} with {:?}", name, args);
        tool.invoke(args).await.map_err(|e| {
            warn!("Tool {} failed: {}", name, e);
            DispatchError::ToolExecution {
                tool: name.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

/// Names accepted by [`builtin_tool`]
pub const BUILTIN_TOOLS: &[&str] = &["read_file", "list_dir", "current_time"];

/// Construct a built-in tool by name
pub fn builtin_tool(name: &str, workspace: &Path) -> Option<Arc<dyn Tool>> {
    let tool: Arc<dyn Tool> = match name {
        "read_file" => Arc::new(ReadFileTool::new(workspace.to_path_buf())),
        "list_dir" => Arc::new(ListDirTool::new(workspace.to_path_buf())),
        "current_time" => Arc::new(CurrentTimeTool::new()),
        _ => return None,
    };
    Some(tool)
}

/// Register every built-in tool confined to `workspace`
pub fn register_builtin_tools(registry: &mut ToolRegistry, workspace: &Path) {
    for name in BUILTIN_TOOLS {
        if let Some(tool) = builtin_tool(name, workspace) {
            registry.register_arc(tool);
        }
    }
}
