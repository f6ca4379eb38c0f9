//! Anthropic messages API client.

use provider_core::{async_trait, HistoryMessage, Provider, ProviderClient, ProviderError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClientConfig;
use crate::http::{build_client, post_json, require_text};

/// API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic requires `max_tokens`; used when the config leaves it unset.
const FALLBACK_MAX_TOKENS: u32 = 1024;

/// A conversation turn. System text goes in the top-level `system` field.
#[derive(Debug, Clone, Serialize)]
pub struct MessageParam {
    /// "user" or "assistant"
    pub role: String,
    /// Plain-text content
    pub content: String,
}

/// Request body for `/v1/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    /// Model to use
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// System prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Conversation turns
    pub messages: Vec<MessageParam>,
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Response body from `/v1/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    /// Content blocks
    pub content: Vec<ContentBlock>,
    /// Token usage
    pub usage: Option<AnthropicUsage>,
}

/// A content block; only `text` blocks are used.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    /// Block type
    #[serde(rename = "type")]
    pub block_type: String,
    /// Text for `text` blocks
    pub text: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicUsage {
    /// Input tokens
    pub input_tokens: u32,
    /// Output tokens
    pub output_tokens: u32,
}

/// Client for the Anthropic messages API.
pub struct AnthropicClient {
    client: Client,
    config: ClientConfig,
}

impl AnthropicClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ProviderError> {
        let client = build_client(&config)?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client that reuses an existing connection pool.
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        debug!("Anthropic client initialized with model: {}", config.model);
        Self { client, config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn build_request(&self, prompt: &str, history: &[HistoryMessage]) -> MessagesRequest {
        // System turns in history are folded into the top-level system prompt.
        let mut system_parts: Vec<String> = self.config.system_prompt.iter().cloned().collect();
        let mut messages = Vec::with_capacity(history.len() + 1);

        for msg in history {
            if msg.role == "system" {
                system_parts.push(msg.content.clone());
            } else {
                messages.push(MessageParam {
                    role: msg.role.clone(),
                    content: msg.content.clone(),
                });
            }
        }

        messages.push(MessageParam {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens.unwrap_or(FALLBACK_MAX_TOKENS),
            system: (!system_parts.is_empty()).then(|| system_parts.join("\n\n")),
            messages,
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl ProviderClient for AnthropicClient {
    async fn complete(
        &self,
        prompt: &str,
        history: &[HistoryMessage],
    ) -> Result<String, ProviderError> {
        let url = format!("{}/v1/messages", self.config.api_url);
        let request = self.build_request(prompt, history);
        let headers = [
            ("x-api-key", self.config.api_key.clone()),
            ("anthropic-version", ANTHROPIC_VERSION.to_string()),
        ];

        let response: MessagesResponse =
            post_json(&self.client, Provider::Anthropic, &url, &headers, &request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                "anthropic token usage - input: {}, output: {}",
                usage.input_tokens, usage.output_tokens
            );
        }

        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        require_text(Provider::Anthropic, Some(text))
    }

    fn provider(&self) -> Provider {
        Provider::Anthropic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_history_folds_into_system_field() {
        let config = ClientConfig::builder(Provider::Anthropic)
            .api_key("k")
            .system_prompt("Base prompt")
            .build();
        let client = AnthropicClient::new(config).unwrap();
        let history = vec![
            HistoryMessage::system("Memory note"),
            HistoryMessage::user("hi"),
            HistoryMessage::assistant("hello"),
        ];

        let request = client.build_request("next", &history);

        assert_eq!(request.system.as_deref(), Some("Base prompt\n\nMemory note"));
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].role, "user");
        assert_eq!(request.messages[2].content, "next");
    }

    #[test]
    fn test_max_tokens_always_present() {
        let mut config = ClientConfig::builder(Provider::Anthropic).api_key("k").build();
        config.max_tokens = None;
        let client = AnthropicClient::new(config).unwrap();

        let json = serde_json::to_value(client.build_request("x", &[])).unwrap();
        assert_eq!(json["max_tokens"], 1024);
        assert!(json.get("system").is_none());
    }

    #[test]
    fn test_parse_response_joins_text_blocks() {
        let body = r#"{
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Hello"},
                {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
                {"type": "text", "text": " there"}
            ],
            "usage": {"input_tokens": 4, "output_tokens": 2}
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
        let text: String = parsed
            .content
            .into_iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text)
            .collect();
        assert_eq!(text, "Hello there");
    }
}
