//! System prompt rendering
//!
//! Rendering is pure: the same identity and registries always give the same
//! prompt, so history seeds are reproducible.

use crate::agent::AgentIdentity;
use crate::tools::ToolSpec;

pub const DEFAULT_ROLE: &str = "a helpful AI assistant";
pub const DEFAULT_TASK: &str =
    "collect information or perform tasks with the help of provided tools";
pub const DEFAULT_ASSISTED_TASK: &str =
    "collect information or perform tasks with the help of assistants and provided tools";

const EMPTY_LIST: &str = "None.";

const AGENT_TEMPLATE: &str = r#"## Role
You are {role}. Your task is to {task}.

## Tools
{tools}

## Constraints
- You can only use tools that are provided.
- Use only one tool at once.
- You must provide correct parameters of the tools.

## Workflow
1. Think step by step and judge whether you need tools to collect information or perform tasks. If so, apply one tool and wait for its output.
2. Once the necessary information is collected, respond to the user based on it. Your response must be clear, complete and brief.

## Output
When applying a tool, you must output in this format: "ToolUsage: [tool_name]([parameters])"
"#;

const ASSISTED_TEMPLATE: &str = r#"## Role
You are {role}. Your task is to {task}.

## Assistants
{assistants}

## Tools
{tools}

## Constraints
- You can only use tools that are provided and talk to assistants that are listed.
- Use only one tool or talk to only one assistant at once.
- You must provide correct parameters of the tools. Refer to the given examples.

## Workflow
1. Think step by step and judge whether you need to query assistants. If so, speak to one assistant and wait for its response.
2. Think step by step and judge whether you need tools to collect information. If so, apply one tool and wait for its output.
3. Once the necessary information is collected, respond to the user based on it.

## Output
1. When speaking to an assistant, your output must be in this format: "SpeakTo [assistant_name]:[utterance]".
2. When applying a tool, your output must be in this format: "ToolUsage: [tool_name]([parameters])".
3. When responding to the user, keep your response correct, complete and brief.

## Examples
1. When speaking to an assistant called "assist", you may output: "SpeakTo assist: your utterance".
"#;

/// Numbered tool list, one line per tool
pub fn format_tools(specs: &[&ToolSpec]) -> String {
    if specs.is_empty() {
        return EMPTY_LIST.to_string();
    }
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            format!(
                "{}. tool_name:{} description:{} parameters:{} usage example:{}.",
                i + 1,
                spec.name,
                spec.description,
                spec.parameters.join(","),
                spec.example
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numbered `(name, description)` list
pub fn format_assistants<'a>(assistants: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let lines: Vec<String> = assistants
        .into_iter()
        .enumerate()
        .map(|(i, (name, description))| format!("{}. name:{} description:{}", i + 1, name, description))
        .collect();
    if lines.is_empty() {
        EMPTY_LIST.to_string()
    } else {
        lines.join("\n")
    }
}

/// Substitute `{key}` placeholders in one pass; substituted text is never
/// scanned again
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let hit = values.iter().find(|(key, _)| {
            tail.strip_prefix('{')
                .and_then(|t| t.strip_prefix(key))
                .is_some_and(|t| t.starts_with('}'))
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn render_agent_prompt(identity: &AgentIdentity, tools: &[&ToolSpec]) -> String {
    let tools = format_tools(tools);
    fill(
        AGENT_TEMPLATE,
        &[
            ("role", identity.role.as_str()),
            ("task", identity.task.as_str()),
            ("tools", tools.as_str()),
        ],
    )
}

pub fn render_assisted_prompt<'a>(
    identity: &AgentIdentity,
    assistants: impl IntoIterator<Item = (&'a str, &'a str)>,
    tools: &[&ToolSpec],
) -> String {
    let assistants = format_assistants(assistants);
    let tools = format_tools(tools);
    fill(
        ASSISTED_TEMPLATE,
        &[
            ("role", identity.role.as_str()),
            ("task", identity.task.as_str()),
            ("assistants", assistants.as_str()),
            ("tools", tools.as_str()),
        ],
    )
}
