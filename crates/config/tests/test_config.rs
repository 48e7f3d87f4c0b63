//! Tests for Config serialization, deserialization, and defaults

use nbpilot_config::{AgentDefaults, AssistantConfig, Config, LlmConfig};

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.agent.provider, "deepseek");
    assert_eq!(config.agent.max_errors, 3);
    assert_eq!(config.agent.max_turns, 20);
    assert_eq!(config.agent.max_delegation_depth, 4);
    assert_eq!(config.agent.max_tokens, 4096);
    assert_eq!(config.agent.temperature, 0.7);
    assert_eq!(config.agent.workspace, "~/.nbpilot/workspace");
    assert!(config.agent.role.is_none());
    assert!(config.agent.task.is_none());
    assert!(config.assistants.is_empty());

    let deepseek = config.llm("deepseek").unwrap();
    assert_eq!(deepseek.base_url, "https://api.deepseek.com/v1");
    assert!(deepseek.api_key.is_empty());
    assert!(deepseek.api_version.is_none());
}

#[test]
fn test_agent_defaults_match_config_defaults() {
    let defaults = AgentDefaults::default();
    let config = Config::default();
    assert_eq!(defaults.provider, config.agent.provider);
    assert_eq!(defaults.max_errors, config.agent.max_errors);
}

#[test]
fn test_empty_json_uses_defaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.providers().len(), 3);
    assert_eq!(config.agent.max_errors, 3);
    assert!(config.assistants.is_empty());
}

#[test]
fn test_partial_agent_section() {
    let json = r#"{
        "agent": { "provider": "ollama", "max_errors": 5 }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.agent.provider, "ollama");
    assert_eq!(config.agent.max_errors, 5);
    assert_eq!(config.agent.max_turns, 20);
    assert_eq!(config.default_llm().unwrap().model_name, "qwen2.5");
}

/// An explicit llm table replaces the built-in backends entirely
#[test]
fn test_llm_table_replaces_defaults() {
    let json = r#"{
        "llm": {
            "azure": {
                "base_url": "https://example.openai.azure.com/openai/deployments/gpt4",
                "api_key": "az-key",
                "api_version": "2024-02-01",
                "model_name": "gpt-4"
            }
        },
        "agent": { "provider": "azure" }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.providers(), vec!["azure"]);
    let azure = config.default_llm().unwrap();
    assert_eq!(azure.api_key(), Some("az-key"));
    assert_eq!(azure.api_version.as_deref(), Some("2024-02-01"));
}

#[test]
fn test_assistants_section() {
    let json = r#"{
        "assistants": [
            { "name": "reader", "description": "reads files", "tools": ["read_file", "list_dir"] },
            { "name": "clock", "role": "a timekeeper", "tools": ["current_time"] }
        ]
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.assistants.len(), 2);
    let reader = config.assistant("reader").unwrap();
    assert_eq!(reader.tools, vec!["read_file", "list_dir"]);
    assert!(reader.role.is_none());

    let clock = config.assistant("clock").unwrap();
    assert_eq!(clock.role.as_deref(), Some("a timekeeper"));
    assert!(clock.description.is_empty());

    assert!(config.assistant("writer").is_none());
}

#[test]
fn test_serialization_skips_unset_options() {
    let config = Config::default();
    let json = serde_json::to_string(&config).unwrap();

    assert!(json.contains("\"llm\""));
    assert!(json.contains("\"agent\""));
    assert!(!json.contains("\"role\""));
    assert!(!json.contains("\"api_version\""));
}

#[test]
fn test_assistant_config_serde() {
    let assistant = AssistantConfig {
        name: "reader".to_string(),
        role: None,
        task: Some("read notebooks".to_string()),
        description: "reads files".to_string(),
        tools: vec!["read_file".to_string()],
    };
    let json = serde_json::to_string(&assistant).unwrap();
    let back: AssistantConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, assistant);
}

#[test]
fn test_llm_config_new() {
    let llm = LlmConfig::new("http://localhost:8000/v1", "local-model");
    assert_eq!(llm.base_url, "http://localhost:8000/v1");
    assert_eq!(llm.model_name, "local-model");
    assert!(llm.api_key().is_none());
}
