//! Generation backend abstraction.
//!
//! Defines the [`Generator`] trait and the [`OllamaGenerator`] implementation,
//! which talks to a local Ollama instance: `/api/generate` for completions,
//! `/api/tags` for readiness and model listing, `/api/pull` to download a
//! missing model. Transient errors (429/5xx/network) retry with the same
//! exponential backoff as the embedding client.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::Config;
use crate::error::RagError;

/// Stateless text-completion backend.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Complete `prompt` under `system` with the given sampling temperature.
    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        temperature: f32,
    ) -> Result<String, RagError>;

    /// Whether the backend is reachable.
    async fn is_ready(&self) -> bool;

    /// Whether `model` is present locally.
    async fn model_available(&self, model: &str) -> Result<bool, RagError>;

    /// Download `model` if absent. May take minutes on first use.
    async fn pull_model(&self, model: &str) -> Result<(), RagError>;
}

/// Generator backed by a local Ollama instance.
pub struct OllamaGenerator {
    url: String,
    model: String,
    max_retries: u32,
}

/// Completions can be slow on CPU-only hosts.
const GENERATE_TIMEOUT_SECS: u64 = 300;
/// Model downloads are long-running; the pull call itself should not time out.
const PULL_TIMEOUT_SECS: u64 = 3600;
const TAGS_TIMEOUT_SECS: u64 = 5;

impl OllamaGenerator {
    pub fn new(config: &Config) -> Self {
        Self {
            url: config.ollama.url.clone(),
            model: config.ollama.model.clone(),
            max_retries: 2,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self, timeout_secs: u64) -> Result<reqwest::Client, RagError> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RagError::Generation(e.to_string()))
    }

    async fn list_models(&self) -> Result<Vec<String>, RagError> {
        let client = self.client(TAGS_TIMEOUT_SECS)?;
        let response = client
            .get(format!("{}/api/tags", self.url))
            .send()
            .await
            .map_err(|e| {
                RagError::ModelUnavailable(format!(
                    "Ollama is not reachable at {} ({})",
                    self.url, e
                ))
            })?;

        if !response.status().is_success() {
            return Err(RagError::ModelUnavailable(format!(
                "Ollama API error {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RagError::ModelUnavailable(e.to_string()))?;

        Ok(json
            .get("models")
            .and_then(|m| m.as_array())
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m.get("name").and_then(|n| n.as_str()))
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        temperature: f32,
    ) -> Result<String, RagError> {
        let client = self.client(GENERATE_TIMEOUT_SECS)?;

        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "system": system,
            "stream": false,
            "options": { "temperature": temperature },
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = client
                .post(format!("{}/api/generate", self.url))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response
                            .json()
                            .await
                            .map_err(|e| RagError::Generation(e.to_string()))?;
                        return json
                            .get("response")
                            .and_then(|r| r.as_str())
                            .map(|s| s.to_string())
                            .ok_or_else(|| {
                                RagError::Generation(
                                    "invalid Ollama response: missing response field".to_string(),
                                )
                            });
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(RagError::Generation(format!(
                            "Ollama API error {}: {}",
                            status, body_text
                        )));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    return Err(RagError::Generation(format!(
                        "Ollama API error {}: {}",
                        status, body_text
                    )));
                }
                Err(e) => {
                    last_err = Some(RagError::Generation(format!(
                        "Ollama connection error (is Ollama running at {}?): {}",
                        self.url, e
                    )));
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| RagError::Generation("generation failed after retries".to_string())))
    }

    async fn is_ready(&self) -> bool {
        self.list_models().await.is_ok()
    }

    async fn model_available(&self, model: &str) -> Result<bool, RagError> {
        let models = self.list_models().await?;
        // Tag-less names match their tagged variants ("llama3.2" ~ "llama3.2:3b").
        Ok(models.iter().any(|name| name.contains(model)))
    }

    async fn pull_model(&self, model: &str) -> Result<(), RagError> {
        let client = self.client(PULL_TIMEOUT_SECS)?;

        let body = serde_json::json!({ "name": model, "stream": false });
        let response = client
            .post(format!("{}/api/pull", self.url))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::ModelUnavailable(format!("pull failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(RagError::ModelUnavailable(format!(
                "pull failed with {}: {}",
                status, body_text
            )));
        }
        Ok(())
    }
}
