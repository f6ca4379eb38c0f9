//! Shared request plumbing for provider adapters.

use provider_core::{Provider, ProviderError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClientConfig;

/// Error envelope shared by every supported API: `{"error": {"message": ...}}`.
#[derive(Debug, Clone, Deserialize)]
struct ApiError {
    error: ApiErrorDetails,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorDetails {
    message: String,
}

/// Build the shared reqwest client for a configuration.
pub(crate) fn build_client(config: &ClientConfig) -> Result<Client, ProviderError> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|e| ProviderError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// POST a JSON body and decode a JSON response, classifying every failure.
pub(crate) async fn post_json<Req, Resp>(
    client: &Client,
    provider: Provider,
    url: &str,
    headers: &[(&str, String)],
    body: &Req,
) -> Result<Resp, ProviderError>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let mut request = client.post(url).header("Content-Type", "application/json");
    for (name, value) in headers {
        request = request.header(*name, value);
    }

    debug!("Sending request to {} at {}", provider, url);

    let response = request.json(body).send().await.map_err(transport_error)?;
    let status = response.status();

    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&error_text)
            .map(|api_error| api_error.error.message)
            .unwrap_or(error_text);
        return Err(ProviderError::classify(Some(status.as_u16()), message));
    }

    response
        .json()
        .await
        .map_err(|e| ProviderError::Unknown(format!("Failed to parse response: {}", e)))
}

/// Map a reqwest transport failure onto the provider error taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else if err.is_connect() {
        ProviderError::NetworkUnreachable(err.to_string())
    } else {
        ProviderError::classify(err.status().map(|s| s.as_u16()), err.to_string())
    }
}

/// Turn an empty completion into an error rather than an empty response.
pub(crate) fn require_text(provider: Provider, text: Option<String>) -> Result<String, ProviderError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ProviderError::ProviderApi {
            status: 200,
            message: format!("{} returned no content", provider),
        }),
    }
}
