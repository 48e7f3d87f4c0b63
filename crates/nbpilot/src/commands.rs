//! nbpilot command implementations

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use nbpilot_agent::{
    builtin_tool, register_builtin_tools, Agent, AgentIdentity, AgentSettings, AssistantRegistry,
    AssistedAgent, ToolRegistry,
};
use nbpilot_config::{self, AssistantConfig, Config};
use nbpilot_provider::{complete, OpenAiCompatProvider, Provider};

const NO_ANSWER: &str = "No answer: the agent ran out of attempts.";

/// Initialize config and workspace
pub async fn init_command() -> Result<()> {
    println!("Initializing nbpilot...");

    let config = nbpilot_config::init()
        .await
        .context("Failed to initialize config")?;

    println!("Config:    {}", nbpilot_config::config_path().display());
    println!("Workspace: {}", config.workspace_path().display());
    println!("\nNext steps:");
    println!(
        "  1. Set an api_key for \"{}\" in {}",
        config.agent.provider,
        nbpilot_config::config_path().display()
    );
    println!("  2. Start chatting: nbpilot agent -m \"Hello!\"");

    Ok(())
}

/// Show status
pub async fn status_command() -> Result<()> {
    let config_path = nbpilot_config::config_path();

    println!("nbpilot status");
    println!(
        "Config:    {} {}",
        config_path.display(),
        if config_path.exists() {
            "[OK]"
        } else {
            "[Missing]"
        }
    );

    let config = Config::load().await.context("Failed to load config")?;
    let workspace = config.workspace_path();
    println!(
        "Workspace: {} {}",
        workspace.display(),
        if workspace.exists() { "[OK]" } else { "[Missing]" }
    );
    println!("Default:   {}", config.agent.provider);

    println!("Backends:");
    for name in config.providers() {
        let llm = config.llm(name)?;
        println!(
            "  {:<10} {} ({}) key {}",
            name,
            llm.model_name,
            llm.base_url,
            if llm.api_key().is_some() {
                "[Set]"
            } else {
                "[Missing]"
            }
        );
    }

    if !config.assistants.is_empty() {
        println!("Assistants:");
        for assistant in &config.assistants {
            println!("  {:<10} {}", assistant.name, assistant.description);
        }
    }

    Ok(())
}

/// Build the completion backend named by `provider` (or the configured default)
fn build_provider(
    config: &Config,
    provider: Option<&str>,
    model: Option<String>,
) -> Result<Arc<OpenAiCompatProvider>> {
    let name = provider.unwrap_or(config.agent.provider.as_str());
    let llm = config
        .llm(name)
        .with_context(|| format!("Add an \"llm.{}\" entry to the config", name))?;

    let model = model.unwrap_or_else(|| llm.model_name.clone());
    let backend = OpenAiCompatProvider::new(llm.api_key.clone(), &llm.base_url, model)
        .with_api_version(llm.api_version.clone());

    if !backend.is_configured() {
        anyhow::bail!("LLM backend \"{}\" needs a base_url and model_name", name);
    }
    if llm.api_key().is_none() {
        warn!("No API key set for {}; sending unauthenticated requests", name);
    }

    info!("Using {} with model {}", name, backend.default_model());
    Ok(Arc::new(backend))
}

/// Single completion without tools
pub async fn ask_command(
    message: String,
    provider: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let config = Config::load().await?;
    let backend = build_provider(&config, provider.as_deref(), model)?;

    let answer = complete(backend.as_ref(), &message, None, &[])
        .await
        .context("Completion failed")?;
    println!("{}", answer);

    Ok(())
}

/// The top-level agent: plain when no assistants are declared
enum Pilot<P: Provider> {
    Plain(Agent<P>),
    Assisted(AssistedAgent<P>),
}

impl<P: Provider> Pilot<P> {
    async fn run(&mut self, query: &str) -> nbpilot_agent::Result<Option<String>> {
        match self {
            Pilot::Plain(agent) => agent.run(query).await,
            Pilot::Assisted(agent) => agent.run(query).await,
        }
    }

    fn reset(&mut self) {
        match self {
            Pilot::Plain(agent) => agent.reset(),
            Pilot::Assisted(agent) => agent.reset(),
        }
    }
}

fn assistant_tools(assistant: &AssistantConfig, workspace: &Path) -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    for name in &assistant.tools {
        match builtin_tool(name, workspace) {
            Some(tool) => tools.register_arc(tool),
            None => warn!("Assistant {} lists unknown tool {}", assistant.name, name),
        }
    }
    tools
}

fn build_pilot<P: Provider + 'static>(
    config: &Config,
    backend: Arc<P>,
    settings: AgentSettings,
) -> Pilot<P> {
    let workspace = config.workspace_path();
    let mut tools = ToolRegistry::new();
    register_builtin_tools(&mut tools, &workspace);

    let mut identity = AgentIdentity::new("nbpilot");
    if let Some(role) = &config.agent.role {
        identity = identity.with_role(role);
    }
    if let Some(task) = &config.agent.task {
        identity = identity.with_task(task);
    }

    if config.assistants.is_empty() {
        return Pilot::Plain(Agent::new(backend, tools, identity).with_settings(settings));
    }

    let mut assistants = AssistantRegistry::new();
    for declared in &config.assistants {
        let peer = Agent::new(
            backend.clone(),
            assistant_tools(declared, &workspace),
            AgentIdentity::from(declared),
        )
        .with_settings(settings.clone());
        assistants.register(peer);
    }
    info!("Assistants: {}", assistants.names().join(", "));

    Pilot::Assisted(
        AssistedAgent::new(backend, tools, assistants, identity).with_settings(settings),
    )
}

/// Run the dispatch loop once or interactively
pub async fn agent_command(
    message: Option<String>,
    provider: Option<String>,
    model: Option<String>,
    max_errors: Option<u32>,
) -> Result<()> {
    let config = Config::load().await?;
    let backend = build_provider(&config, provider.as_deref(), model)?;

    let mut settings = AgentSettings::from(&config.agent);
    if let Some(max_errors) = max_errors {
        settings.max_errors = max_errors;
    }

    nbpilot_config::paths::ensure_dir(&config.workspace_path())
        .await
        .context("Failed to create workspace")?;
    let mut pilot = build_pilot(&config, backend, settings);

    if let Some(msg) = message {
        let answer = pilot.run(&msg).await.context("Agent run failed")?;
        println!("{}", answer.as_deref().unwrap_or(NO_ANSWER));
        return Ok(());
    }

    println!("Interactive mode (/reset clears history, 'exit' to quit)");
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }
        if input == "/reset" {
            pilot.reset();
            println!("History cleared\n");
            continue;
        }

        match pilot.run(input).await {
            Ok(answer) => println!("\n{}\n", answer.as_deref().unwrap_or(NO_ANSWER)),
            Err(e) => println!("\nError: {}\n", e),
        }
    }

    Ok(())
}
