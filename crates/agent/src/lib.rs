//! Agent dispatch loop
//!
//! Lets a model turn call a tool (`ToolUsage: name(args)`), delegate to a peer
//! assistant (`SpeakTo name: utterance`), or answer, bounded by an error
//! budget, with history kept across turns.

use thiserror::Error;

use nbpilot_provider::ProviderError;

pub mod agent;
pub mod assisted;
pub mod directive;
pub mod history;
pub mod prompt;
pub mod tools;

pub use agent::{Agent, AgentIdentity, AgentSettings};
pub use assisted::{Assistant, AssistantRegistry, AssistedAgent};
pub use directive::{Directive, DirectiveRequest};
pub use history::{History, Turn};
pub use prompt::{DEFAULT_ASSISTED_TASK, DEFAULT_ROLE, DEFAULT_TASK};
pub use tools::{builtin_tool, register_builtin_tools, FnTool, Tool, ToolRegistry, ToolSpec};

/// Errors surfaced to the caller of `run`
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("completion service failed: {0}")]
    Provider(#[from] ProviderError),
}

pub type Result<T> = std::result::Result<T, AgentError>;

/// Recoverable failures inside the loop; each one spends the error budget
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("unknown assistant: {0}")]
    UnknownAssistant(String),

    #[error("tool {tool} failed: {reason}")]
    ToolExecution { tool: String, reason: String },

    #[error("assistant {0} returned no answer")]
    DelegationExhausted(String),

    #[error("assistant {assistant} failed: {reason}")]
    DelegationFailed { assistant: String, reason: String },

    #[error("delegation to {assistant} exceeds max depth {max_depth}")]
    DelegationDepthExceeded { assistant: String, max_depth: usize },
}
