//! `test`: smoke test a running stack

use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::store::ConfigStore;
use crate::errors::CliError;

/// Responses from the two smoke test calls
#[derive(Debug, Clone)]
pub struct SmokeReport {
    pub models: Value,
    pub completion: Value,
}

/// Body of the sample chat completion request
pub fn chat_request(model: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            {"role": "user", "content": "At which temperature does silver melt?"}
        ],
        "max_tokens": 128,
        "temperature": 0,
    })
}

/// List models and run one chat completion against `base_url`
pub async fn smoke_test(store: &ConfigStore, base_url: &str) -> Result<SmokeReport, CliError> {
    let config = store.load_existing().await?;
    if config.security.api_secret.is_empty() || config.stack.model.name.is_empty() {
        return Err(CliError::Config(
            "API secret or model name not found in configuration".to_string(),
        ));
    }

    let base_url = base_url.trim_end_matches('/');
    let client = Client::new();

    let models_url = format!("{}/v1/models", base_url);
    debug!("GET {}", models_url);
    let models = client
        .get(&models_url)
        .bearer_auth(&config.security.api_secret)
        .send()
        .await?
        .error_for_status()?
        .json::<Value>()
        .await?;

    let completions_url = format!("{}/v1/chat/completions", base_url);
    debug!("POST {}", completions_url);
    let completion = client
        .post(&completions_url)
        .bearer_auth(&config.security.api_secret)
        .json(&chat_request(&config.stack.model.name))
        .send()
        .await?
        .error_for_status()?
        .json::<Value>()
        .await?;

    Ok(SmokeReport { models, completion })
}

pub async fn run(store: &ConfigStore, base_url: &str) -> Result<(), CliError> {
    println!("Testing API call to get available models...");
    let report = smoke_test(store, base_url).await?;
    println!("{}", serde_json::to_string_pretty(&report.models)?);

    println!("\nTesting model call...");
    println!("{}", serde_json::to_string_pretty(&report.completion)?);
    Ok(())
}
