//! Common test utilities for agent integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use nbpilot_agent::{FnTool, ToolRegistry, ToolSpec};
use nbpilot_provider::{ChatParams, ChatResponse, Message, Provider, ProviderError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Provider replaying a fixed script of responses.
///
/// Once the script runs dry the last response repeats. Every request's
/// messages are recorded for inspection.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    fail: bool,
    pub requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            last: Mutex::new(None),
            fail: false,
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Always answer with `response`
    pub fn repeating(response: &str) -> Arc<Self> {
        Self::new(&[response])
    }

    /// Every call fails with an API error
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            fail: true,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> Vec<Message> {
        self.requests.lock().unwrap()[index].clone()
    }

    /// Content of the final message of the nth request
    pub fn pending_input(&self, index: usize) -> String {
        self.request(index)
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn chat(&self, params: ChatParams) -> nbpilot_provider::Result<ChatResponse> {
        self.requests.lock().unwrap().push(params.messages);
        if self.fail {
            return Err(ProviderError::Api("service unavailable".to_string()));
        }

        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(next) = next {
            *last = Some(next);
        }
        Ok(ChatResponse::text(last.clone().unwrap_or_default()))
    }

    fn default_model(&self) -> String {
        "scripted".to_string()
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// `echo(text)` returning its argument
pub fn echo_tool() -> FnTool<impl Fn(&[String]) -> nbpilot_agent::tools::ToolResult + Send + Sync> {
    FnTool::new(
        ToolSpec::new("echo", &["text"], "Repeat the text", "ToolUsage: echo(hello)"),
        |args: &[String]| Ok(args[0].clone()),
    )
}

/// `broken(x)` that always fails
pub fn broken_tool() -> FnTool<impl Fn(&[String]) -> nbpilot_agent::tools::ToolResult + Send + Sync> {
    FnTool::new(
        ToolSpec::new("broken", &["x"], "Always fails", "ToolUsage: broken(1)"),
        |_args: &[String]| Err("disk on fire".into()),
    )
}

pub fn echo_registry() -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register(echo_tool());
    tools
}
