//! Delegation to peer assistants
//!
//! An `AssistedAgent` owns its peers. When the model writes
//! `SpeakTo <name>:<utterance>` the named peer runs the utterance against
//! its own history, and its answer comes back tagged as
//! `Response from <name>:<answer>`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use nbpilot_provider::Provider;

use crate::agent::{Agent, AgentIdentity, AgentSettings};
use crate::history::History;
use crate::prompt::{self, DEFAULT_ASSISTED_TASK, DEFAULT_TASK};
use crate::tools::ToolRegistry;
use crate::{DispatchError, Result};

/// Anything a parent agent can consult by name
#[async_trait]
pub trait Assistant: Send {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Run `utterance` as a query; `depth` is the caller's depth plus one
    async fn consult(&mut self, utterance: &str, depth: usize) -> Result<Option<String>>;

    fn reset(&mut self);
}

#[async_trait]
impl<P: Provider + 'static> Assistant for Agent<P> {
    fn name(&self) -> &str {
        &self.identity.name
    }

    fn description(&self) -> &str {
        &self.identity.description
    }

    async fn consult(&mut self, utterance: &str, depth: usize) -> Result<Option<String>> {
        let max_errors = self.settings.max_errors;
        self.dispatch(utterance, max_errors, depth, None).await
    }

    fn reset(&mut self) {
        Agent::reset(self);
    }
}

/// Peers by name, kept in registration order
#[derive(Default)]
pub struct AssistantRegistry {
    assistants: Vec<Box<dyn Assistant>>,
}

impl AssistantRegistry {
    pub fn new() -> Self {
        Self {
            assistants: Vec::new(),
        }
    }

    /// Register a peer; an existing peer with the same name is replaced in place
    pub fn register<A: Assistant + 'static>(&mut self, assistant: A) {
        self.register_boxed(Box::new(assistant));
    }

    pub fn register_boxed(&mut self, assistant: Box<dyn Assistant>) {
        let existing = self
            .assistants
            .iter()
            .position(|a| a.name() == assistant.name());
        match existing {
            Some(idx) => self.assistants[idx] = assistant,
            None => self.assistants.push(assistant),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.assistants.iter().any(|a| a.name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.assistants.iter().map(|a| a.name().to_string()).collect()
    }

    /// `(name, description)` pairs for the system prompt
    pub fn summaries(&self) -> Vec<(&str, &str)> {
        self.assistants
            .iter()
            .map(|a| (a.name(), a.description()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.assistants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assistants.is_empty()
    }

    pub fn reset_all(&mut self) {
        for assistant in &mut self.assistants {
            assistant.reset();
        }
    }

    /// Consult `name` at `depth`, refusing anything deeper than `max_depth`
    pub(crate) async fn delegate(
        &mut self,
        name: &str,
        utterance: &str,
        depth: usize,
        max_depth: usize,
    ) -> std::result::Result<String, DispatchError> {
        let assistant = self
            .assistants
            .iter_mut()
            .find(|a| a.name() == name)
            .ok_or_else(|| DispatchError::UnknownAssistant(name.to_string()))?;

        if depth > max_depth {
            return Err(DispatchError::DelegationDepthExceeded {
                assistant: name.to_string(),
                max_depth,
            });
        }

        debug!("Delegating to {} at depth {}: {}", name, depth, utterance);
        match assistant.consult(utterance, depth).await {
            Ok(Some(answer)) if !answer.is_empty() => Ok(answer),
            Ok(_) => Err(DispatchError::DelegationExhausted(name.to_string())),
            Err(e) => Err(DispatchError::DelegationFailed {
                assistant: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

/// An agent that can also delegate to peers
pub struct AssistedAgent<P: Provider> {
    agent: Agent<P>,
    assistants: AssistantRegistry,
}

impl<P: Provider> AssistedAgent<P> {
    /// Build an assisted agent; an identity left on the plain default task
    /// gets the assisted default task instead
    pub fn new(
        provider: Arc<P>,
        tools: ToolRegistry,
        assistants: AssistantRegistry,
        mut identity: AgentIdentity,
    ) -> Self {
        if identity.task == DEFAULT_TASK {
            identity.task = DEFAULT_ASSISTED_TASK.to_string();
        }
        let mut assisted = Self {
            agent: Agent::new(provider, tools, identity),
            assistants,
        };
        let system_prompt = assisted.render_prompt();
        assisted.agent.reseed(system_prompt);
        assisted
    }

    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.agent = self.agent.with_settings(settings);
        self
    }

    fn render_prompt(&self) -> String {
        prompt::render_assisted_prompt(
            &self.agent.identity,
            self.assistants.summaries(),
            &self.agent.tools().specs(),
        )
    }

    pub fn name(&self) -> &str {
        self.agent.name()
    }

    pub fn identity(&self) -> &AgentIdentity {
        self.agent.identity()
    }

    pub fn settings(&self) -> &AgentSettings {
        self.agent.settings()
    }

    pub fn tools(&self) -> &ToolRegistry {
        self.agent.tools()
    }

    pub fn assistants(&self) -> &AssistantRegistry {
        &self.assistants
    }

    pub fn history(&self) -> &History {
        self.agent.history()
    }

    pub fn system_prompt(&self) -> &str {
        self.agent.system_prompt()
    }

    pub async fn run(&mut self, query: &str) -> Result<Option<String>> {
        let max_errors = self.agent.settings.max_errors;
        self.run_with_budget(query, max_errors).await
    }

    pub async fn run_with_budget(&mut self, query: &str, max_errors: u32) -> Result<Option<String>> {
        self.agent
            .dispatch(query, max_errors, 0, Some(&mut self.assistants))
            .await
    }

    /// Reset this agent's history and every peer's
    pub fn reset(&mut self) {
        self.assistants.reset_all();
        self.agent.reset();
    }

    /// Swap tools and peers; re-renders the system prompt and clears history
    pub fn reconfigure(&mut self, tools: ToolRegistry, assistants: AssistantRegistry) {
        self.agent.set_tools(tools);
        self.assistants = assistants;
        let system_prompt = self.render_prompt();
        self.agent.reseed(system_prompt);
    }
}

#[async_trait]
impl<P: Provider + 'static> Assistant for AssistedAgent<P> {
    fn name(&self) -> &str {
        self.agent.name()
    }

    fn description(&self) -> &str {
        &self.agent.identity.description
    }

    async fn consult(&mut self, utterance: &str, depth: usize) -> Result<Option<String>> {
        let max_errors = self.agent.settings.max_errors;
        self.agent
            .dispatch(utterance, max_errors, depth, Some(&mut self.assistants))
            .await
    }

    fn reset(&mut self) {
        AssistedAgent::reset(self);
    }
}
