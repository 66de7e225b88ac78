//! Free-text questions forwarded to a hosted text-generation model.
//!
//! Unrelated to the advice rules; it only shares configuration and errors.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, time::Duration};

use crate::{config::AssistantConfig, error::AdvisorError, provider::truncate_body};

const DEFAULT_BASE_URL: &str = "https://api.cohere.ai";

#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Rejects blank prompts, forwards the rest and returns the trimmed answer.
pub async fn ask(generator: &dyn TextGenerator, prompt: &str) -> Result<String, AdvisorError> {
    if prompt.trim().is_empty() {
        return Err(AdvisorError::invalid_input("Please enter a valid question."));
    }

    let answer = generator.generate(prompt).await.map_err(|err| {
        tracing::warn!(error = %format!("{err:#}"), "text generation failed");
        AdvisorError::GenerationUnavailable(err)
    })?;

    let answer = answer.trim();
    if answer.is_empty() {
        return Err(AdvisorError::GenerationUnavailable(anyhow!("Generator returned no text")));
    }
    Ok(answer.to_string())
}

#[derive(Debug, Clone)]
pub struct CohereGenerator {
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
    http: Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generations: Vec<Generation>,
}

impl CohereGenerator {
    pub fn from_config(config: &AssistantConfig, timeout: Duration) -> Result<Self> {
        Self::with_base_url(config, DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(
        config: &AssistantConfig,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for Cohere")?;

        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl TextGenerator for CohereGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/generate", self.base_url);

        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                max_tokens: self.max_tokens,
            })
            .send()
            .await
            .context("Failed to send request to Cohere")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read Cohere response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Cohere generate request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).context("Failed to parse Cohere generate JSON")?;

        parsed
            .generations
            .into_iter()
            .next()
            .map(|g| g.text)
            .ok_or_else(|| anyhow!("Cohere response contained no generations"))
    }
}
