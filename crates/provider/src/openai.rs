//! OpenAI-compatible chat completions backend
//!
//! Covers DeepSeek, OpenAI, OpenRouter, vLLM, Ollama and Azure-style
//! endpoints that take an `api-version` query parameter.

use crate::*;
use reqwest::Client;
use serde_json::json;

/// OpenAI-compatible `/chat/completions` client
pub struct OpenAiCompatProvider {
    client: Client,
    api_key: String,
    api_base: String,
    api_version: Option<String>,
    default_model: String,
}

impl OpenAiCompatProvider {
    pub fn new(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        let api_base = api_base.into();
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_version: None,
            default_model: default_model.into(),
        }
    }

    /// Append `?api-version=` to every request
    pub fn with_api_version(mut self, api_version: Option<String>) -> Self {
        self.api_version = api_version.filter(|v| !v.is_empty());
        self
    }

    fn endpoint(&self) -> String {
        match &self.api_version {
            Some(version) => format!("{}/chat/completions?api-version={}", self.api_base, version),
            None => format!("{}/chat/completions", self.api_base),
        }
    }

    fn build_request(&self, params: &ChatParams) -> serde_json::Value {
        let model = if params.model.is_empty() {
            self.default_model.clone()
        } else {
            params.model.clone()
        };

        let messages: Vec<serde_json::Value> = params
            .messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": &m.content }))
            .collect();

        json!({
            "model": model,
            "messages": messages,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
            "stream": false,
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<ChatResponse> {
        let choice = json["choices"]
            .get(0)
            .ok_or(ProviderError::InvalidResponse)?;
        let content = choice["message"]["content"]
            .as_str()
            .ok_or(ProviderError::InvalidResponse)?
            .to_string();
        let finish_reason = choice["finish_reason"]
            .as_str()
            .unwrap_or("stop")
            .to_string();

        let usage = if let Some(usage) = json["usage"].as_object() {
            let count = |key: &str| usage.get(key).and_then(|v| v.as_u64()).unwrap_or(0) as u32;
            Usage {
                prompt_tokens: count("prompt_tokens"),
                completion_tokens: count("completion_tokens"),
                total_tokens: count("total_tokens"),
            }
        } else {
            Usage::default()
        };

        Ok(ChatResponse {
            content,
            finish_reason,
            usage,
        })
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiCompatProvider {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse> {
        let url = self.endpoint();
        trace!("Posting completion request to {}", url);
        let body = self.build_request(&params);

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if !self.api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = request.json(&body).send().await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }
        let json: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let error = json["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(ProviderError::Api(error));
        }

        debug!(
            "Completion usage: {} total tokens",
            json["usage"]["total_tokens"].as_u64().unwrap_or(0)
        );

        self.parse_response(json)
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn is_configured(&self) -> bool {
        !self.api_base.is_empty() && !self.default_model.is_empty()
    }
}
