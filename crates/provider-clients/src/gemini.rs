//! Google Gemini generateContent client.

use provider_core::{async_trait, HistoryMessage, Provider, ProviderClient, ProviderError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClientConfig;
use crate::http::{build_client, post_json, require_text};

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns
    pub contents: Vec<Content>,
    /// System instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    /// Generation options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// A turn: role "user" or "model".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Role; absent for system instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A text part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Text (absent for non-text parts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Generation options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Maximum output tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Response body.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    /// Candidates; the first one is used
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// A response candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    /// Generated content
    pub content: Option<Content>,
}

fn text_content(role: Option<&str>, text: impl Into<String>) -> Content {
    Content {
        role: role.map(str::to_string),
        parts: vec![Part {
            text: Some(text.into()),
        }],
    }
}

/// Client for the Gemini API.
pub struct GeminiClient {
    client: Client,
    config: ClientConfig,
}

impl GeminiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ProviderError> {
        let client = build_client(&config)?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client that reuses an existing connection pool.
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        debug!("Gemini client initialized with model: {}", config.model);
        Self { client, config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn build_request(
        &self,
        prompt: &str,
        history: &[HistoryMessage],
    ) -> GenerateContentRequest {
        let mut system_parts: Vec<String> = self.config.system_prompt.iter().cloned().collect();
        let mut contents = Vec::with_capacity(history.len() + 1);

        for msg in history {
            match msg.role.as_str() {
                "system" => system_parts.push(msg.content.clone()),
                "assistant" => contents.push(text_content(Some("model"), msg.content.clone())),
                _ => contents.push(text_content(Some("user"), msg.content.clone())),
            }
        }
        contents.push(text_content(Some("user"), prompt));

        let generation_config = if self.config.max_tokens.is_some() || self.config.temperature.is_some() {
            Some(GenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            })
        } else {
            None
        };

        GenerateContentRequest {
            contents,
            system_instruction: (!system_parts.is_empty())
                .then(|| text_content(None, system_parts.join("\n\n"))),
            generation_config,
        }
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    async fn complete(
        &self,
        prompt: &str,
        history: &[HistoryMessage],
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_url, self.config.model
        );
        let request = self.build_request(prompt, history);
        let headers = [("x-goog-api-key", self.config.api_key.clone())];

        let response: GenerateContentResponse =
            post_json(&self.client, Provider::Gemini, &url, &headers, &request).await?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            });

        require_text(Provider::Gemini, text)
    }

    fn provider(&self) -> Provider {
        Provider::Gemini
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        let config = ClientConfig::builder(Provider::Gemini)
            .api_key("k")
            .system_prompt("Be kind")
            .build();
        GeminiClient::new(config).unwrap()
    }

    #[test]
    fn test_roles_are_mapped() {
        let history = vec![HistoryMessage::user("hi"), HistoryMessage::assistant("hello")];
        let request = client().build_request("again", &history);

        let roles: Vec<_> = request
            .contents
            .iter()
            .map(|c| c.role.clone().unwrap())
            .collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
    }

    #[test]
    fn test_request_is_camel_case() {
        let json = serde_json::to_value(client().build_request("x", &[])).unwrap();
        assert!(json.get("systemInstruction").is_some());
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
        assert!(json["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Bonjour"}, {"text": "!"}]},
                "finishReason": "STOP"
            }]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let content = parsed.candidates[0].content.clone().unwrap();
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        assert_eq!(text, "Bonjour!");
    }

    #[test]
    fn test_parse_blocked_response() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
