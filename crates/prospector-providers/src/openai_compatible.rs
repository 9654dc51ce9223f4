//! OpenAI-compatible chat completions client.
//!
//! Works against any server exposing `/chat/completions` (vLLM, llama.cpp,
//! Ollama, hosted APIs). The endpoint is chosen per call.

use async_trait::async_trait;
use prospector_core::config::GenerationConfig;
use prospector_core::error::{ProspectorError, Result};
use prospector_core::traits::Generator;
use prospector_core::types::{GenerateParams, Message};
use serde_json::{Value, json};
use std::time::Duration;

pub struct OpenAiCompatibleClient {
    name: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleClient {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProspectorError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            name: "openai".to_string(),
            api_key: config.resolved_api_key(),
            client,
        })
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            req
        } else {
            req.header("Authorization", format!("Bearer {}", self.api_key))
        }
    }
}

/// `<base>/chat/completions`, tolerating a trailing slash on the base.
pub(crate) fn endpoint_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[async_trait]
impl Generator for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, endpoint: &str, messages: &[Message], params: &GenerateParams) -> Result<String> {
        let body = json!({
            "model": params.model,
            "messages": messages,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        let url = endpoint_url(endpoint, "/chat/completions");
        tracing::debug!("📤 POST {url} (model {})", params.model);
        let req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        let resp = self.apply_auth(req).send().await.map_err(|e| {
            ProspectorError::Http(format!("{} connection failed ({url}): {e}", self.name))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProspectorError::Provider(format!(
                "{} API error {status}: {text}",
                self.name
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| ProspectorError::Http(e.to_string()))?;

        let choice = json["choices"]
            .get(0)
            .ok_or_else(|| ProspectorError::Provider("No choices in response".into()))?;

        choice["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| ProspectorError::Provider("Response has no message content".into()))
    }
}
