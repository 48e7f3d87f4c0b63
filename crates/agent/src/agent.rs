//! Agent: the tool dispatch loop
//!
//! Each completion is scanned for a directive. A tool directive runs the
//! tool and feeds its tagged output back as the next user turn; a plain
//! answer ends the run. Unknown or failing tools spend the error budget and
//! retry the same input without touching history.

use std::sync::Arc;
use tracing::{debug, info, warn};

use nbpilot_config::{AgentDefaults, AssistantConfig};
use nbpilot_provider::{ChatParams, Provider};

use crate::assisted::AssistantRegistry;
use crate::directive::{self, DirectiveRequest};
use crate::history::History;
use crate::prompt::{self, DEFAULT_ROLE, DEFAULT_TASK};
use crate::tools::ToolRegistry;
use crate::{DispatchError, Result};

/// Who the agent is; rendered into the system prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentIdentity {
    pub name: String,
    pub role: String,
    pub task: String,
    /// Advertised to a parent when this agent serves as an assistant
    pub description: String,
}

impl AgentIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: DEFAULT_ROLE.to_string(),
            task: DEFAULT_TASK.to_string(),
            description: String::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl From<&AssistantConfig> for AgentIdentity {
    fn from(config: &AssistantConfig) -> Self {
        let mut identity = Self::new(&config.name).with_description(&config.description);
        if let Some(role) = &config.role {
            identity.role = role.clone();
        }
        if let Some(task) = &config.task {
            identity.task = task.clone();
        }
        identity
    }
}

/// Loop limits and sampling parameters
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    /// Error budget used by `run`
    pub max_errors: u32,
    /// Completion calls allowed in one run
    pub max_turns: u32,
    pub max_delegation_depth: usize,
    /// Overrides the provider's default model
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_errors: 3,
            max_turns: 20,
            max_delegation_depth: 4,
            model: None,
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

impl From<&AgentDefaults> for AgentSettings {
    fn from(defaults: &AgentDefaults) -> Self {
        Self {
            max_errors: defaults.max_errors,
            max_turns: defaults.max_turns,
            max_delegation_depth: defaults.max_delegation_depth,
            model: None,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        }
    }
}

/// A tool-using agent with its own conversation history
pub struct Agent<P: Provider> {
    pub(crate) identity: AgentIdentity,
    provider: Arc<P>,
    tools: ToolRegistry,
    pub(crate) settings: AgentSettings,
    history: History,
}

impl<P: Provider> Agent<P> {
    pub fn new(provider: Arc<P>, tools: ToolRegistry, identity: AgentIdentity) -> Self {
        let system_prompt = prompt::render_agent_prompt(&identity, &tools.specs());
        Self {
            identity,
            provider,
            tools,
            settings: AgentSettings::default(),
            history: History::new(system_prompt),
        }
    }

    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn system_prompt(&self) -> &str {
        self.history.system_prompt()
    }

    /// Answer `query` with the configured error budget.
    ///
    /// `Ok(None)` means the budget or the turn cap ran out first.
    pub async fn run(&mut self, query: &str) -> Result<Option<String>> {
        let max_errors = self.settings.max_errors;
        self.dispatch(query, max_errors, 0, None).await
    }

    pub async fn run_with_budget(&mut self, query: &str, max_errors: u32) -> Result<Option<String>> {
        self.dispatch(query, max_errors, 0, None).await
    }

    /// Drop all turns but the system prompt
    pub fn reset(&mut self) {
        self.history.reset();
    }

    /// Swap the tool set; re-renders the system prompt and clears history
    pub fn reconfigure(&mut self, tools: ToolRegistry) {
        self.tools = tools;
        let system_prompt = prompt::render_agent_prompt(&self.identity, &self.tools.specs());
        self.reseed(system_prompt);
    }

    pub(crate) fn reseed(&mut self, system_prompt: String) {
        self.history = History::new(system_prompt);
    }

    pub(crate) fn set_tools(&mut self, tools: ToolRegistry) {
        self.tools = tools;
    }

    async fn complete(&self, pending: &str) -> Result<String> {
        let params = ChatParams {
            model: self.settings.model.clone().unwrap_or_default(),
            messages: self.history.request(pending),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };
        let response = self.provider.chat(params).await?;
        Ok(response.content)
    }

    /// The dispatch loop shared by plain and assisted agents.
    ///
    /// Delegation is recognized only when `peers` is given; `depth` is this
    /// agent's distance from the top-level run.
    pub(crate) async fn dispatch(
        &mut self,
        query: &str,
        max_errors: u32,
        depth: usize,
        mut peers: Option<&mut AssistantRegistry>,
    ) -> Result<Option<String>> {
        info!(
            "{} running query at depth {} (max_errors={})",
            self.identity.name, depth, max_errors
        );
        let delegation = peers.is_some();
        let mut pending = query.to_string();
        let mut errors = 0;
        let mut turns = 0;

        while errors < max_errors {
            if turns >= self.settings.max_turns {
                warn!(
                    "{} stopped after {} completions without an answer",
                    self.identity.name, turns
                );
                return Ok(None);
            }
            turns += 1;

            let response = self.complete(&pending).await?;
            let directive = directive::parse(&response, delegation);
            debug!("{} turn {}: {:?}", self.identity.name, turns, directive.request);

            let outcome = match &directive.request {
                DirectiveRequest::PlainAnswer { .. } => {
                    self.history.record_exchange(pending, response.as_str());
                    info!("{} answered after {} turns", self.identity.name, turns);
                    return Ok(Some(response));
                }
                DirectiveRequest::ToolUsage {
                    tool_name,
                    parameters,
                } => self
                    .tools
                    .invoke(tool_name, parameters)
                    .await
                    .map(|output| directive::tool_output(tool_name, &output)),
                DirectiveRequest::AssistantQuery {
                    assistant_name,
                    utterance,
                } => match peers.as_deref_mut() {
                    Some(registry) => registry
                        .delegate(
                            assistant_name,
                            utterance,
                            depth + 1,
                            self.settings.max_delegation_depth,
                        )
                        .await
                        .map(|answer| directive::assistant_response(assistant_name, &answer)),
                    None => Err(DispatchError::UnknownAssistant(assistant_name.clone())),
                },
            };

            match outcome {
                Ok(next) => {
                    debug!("{} result: {}", self.identity.name, next);
                    self.history.record_exchange(pending, directive.trim(&response));
                    pending = next;
                }
                Err(e) => {
                    errors += 1;
                    warn!(
                        "{} dispatch error {}/{}: {}",
                        self.identity.name, errors, max_errors, e
                    );
                }
            }
        }

        warn!("{} exhausted its error budget", self.identity.name);
        Ok(None)
    }
}
