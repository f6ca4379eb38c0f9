//! OpenAI-compatible chat completions client, used for OpenAI and xAI Grok.

use provider_core::{async_trait, HistoryMessage, Provider, ProviderClient, ProviderError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClientConfig;
use crate::http::{build_client, post_json, require_text};

/// A chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant"
    pub role: String,
    /// Message content
    pub content: String,
}

/// Chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model to use
    pub model: String,
    /// Messages in the conversation
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Chat completion response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Response choices
    pub choices: Vec<Choice>,
    /// Token usage
    pub usage: Option<Usage>,
}

/// A response choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The message
    pub message: ResponseMessage,
}

/// Response message.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Content (may be null)
    pub content: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Completion tokens
    pub completion_tokens: u32,
}

/// Client for any `/v1/chat/completions` endpoint.
pub struct ChatCompletionsClient {
    client: Client,
    config: ClientConfig,
}

impl ChatCompletionsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ProviderError> {
        let client = build_client(&config)?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client that reuses an existing connection pool.
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        debug!(
            "{} chat client initialized with model: {}",
            config.provider, config.model
        );
        Self { client, config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the request body for a prompt and history.
    pub(crate) fn build_request(
        &self,
        prompt: &str,
        history: &[HistoryMessage],
    ) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);

        if let Some(ref system_prompt) = self.config.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system_prompt.clone(),
            });
        }

        for msg in history {
            messages.push(ChatMessage {
                role: msg.role.clone(),
                content: msg.content.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl ProviderClient for ChatCompletionsClient {
    async fn complete(
        &self,
        prompt: &str,
        history: &[HistoryMessage],
    ) -> Result<String, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.config.api_url);
        let request = self.build_request(prompt, history);
        let headers = [("Authorization", format!("Bearer {}", self.config.api_key))];

        let completion: ChatCompletionResponse =
            post_json(&self.client, self.config.provider, &url, &headers, &request).await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "{} token usage - prompt: {}, completion: {}",
                self.config.provider, usage.prompt_tokens, usage.completion_tokens
            );
        }

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);

        require_text(self.config.provider, text)
    }

    fn provider(&self) -> Provider {
        self.config.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(provider: Provider) -> ChatCompletionsClient {
        let config = ClientConfig::builder(provider)
            .api_key("test-key")
            .system_prompt("Be brief")
            .build();
        ChatCompletionsClient::new(config).unwrap()
    }

    #[test]
    fn test_build_request_orders_messages() {
        let client = client(Provider::OpenAi);
        let history = vec![HistoryMessage::user("hi"), HistoryMessage::assistant("hello")];

        let request = client.build_request("how are you?", &history);
        let roles: Vec<&str> = request.messages.iter().map(|m| m.role.as_str()).collect();

        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(request.messages.last().unwrap().content, "how are you?");
        assert_eq!(request.model, "gpt-4o-mini");
    }

    #[test]
    fn test_request_skips_unset_options() {
        let mut config = ClientConfig::builder(Provider::Grok).api_key("k").build();
        config.max_tokens = None;
        config.temperature = None;
        let client = ChatCompletionsClient::new(config).unwrap();

        let json = serde_json::to_value(client.build_request("x", &[])).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("temperature").is_none());
        assert_eq!(json["model"], "grok-4-1-fast");
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hi!"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Hi!"));
        assert_eq!(parsed.usage.unwrap().completion_tokens, 2);
    }

    #[test]
    fn test_provider_tag() {
        assert_eq!(client(Provider::Grok).provider(), Provider::Grok);
        assert_eq!(client(Provider::OpenAi).provider(), Provider::OpenAi);
    }
}
