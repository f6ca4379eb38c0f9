//! Send one prompt to a single provider.
//!
//! Run with: cargo run -p provider-clients --example test_complete -- grok "Your message here"
//!
//! Make sure to set the provider's key in .env, e.g.:
//!   GROK_API_KEY - xAI API key for authentication

use provider_clients::{ChatCompletionsClient, ClientConfig, ProviderClient};
use provider_clients::{AnthropicClient, Credentials, GeminiClient, Provider};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let provider: Provider = args.get(1).map(String::as_str).unwrap_or("grok").parse()?;
    let message_text = if args.len() > 2 {
        args[2..].join(" ")
    } else {
        "Hello! Please respond with a short greeting.".to_string()
    };

    let credentials = Credentials::from_env();
    let credential = credentials
        .get(provider)
        .ok_or_else(|| format!("{}_API_KEY not set", provider.env_prefix()))?;
    let config = ClientConfig::from_credential(provider, credential);
    println!("Provider: {}", provider.display_name());
    println!("API URL: {}", config.api_url);
    println!("Model: {}", config.model);
    println!();

    let client: Box<dyn ProviderClient> = match provider {
        Provider::OpenAi | Provider::Grok => Box::new(ChatCompletionsClient::new(config)?),
        Provider::Anthropic => Box::new(AnthropicClient::new(config)?),
        Provider::Gemini => Box::new(GeminiClient::new(config)?),
    };

    println!("Sending: \"{}\"", message_text);
    match client.complete(&message_text, &[]).await {
        Ok(text) => println!("Response:\n{}", text),
        Err(e) => println!("Error ({}): {}", e.kind(), e),
    }

    Ok(())
}
