//! Embedding backends.
//!
//! - `OpenAiEmbedder`: any server exposing an OpenAI-style `/embeddings` API
//!   (text-embeddings-inference, vLLM, llama.cpp, Ollama)
//! - `HashEmbedder`: deterministic feature hashing, no network

use async_trait::async_trait;
use prospector_core::config::EmbeddingsConfig;
use prospector_core::error::{ProspectorError, Result};
use prospector_core::traits::Embedder;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::openai_compatible::endpoint_url;

pub struct OpenAiEmbedder {
    endpoint: String,
    model: String,
    dimension: usize,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProspectorError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            dimension: config.dimension,
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn parse(&self, json: &Value, expected: usize) -> Result<Vec<Vec<f32>>> {
        let data = json["data"]
            .as_array()
            .ok_or_else(|| ProspectorError::Provider("No data in embeddings response".into()))?;
        if data.len() != expected {
            return Err(ProspectorError::Provider(format!(
                "embeddings response has {} items for {expected} inputs",
                data.len()
            )));
        }

        let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];
        for (pos, item) in data.iter().enumerate() {
            let index = item["index"].as_u64().map_or(pos, |i| i as usize);
            let vector: Vec<f32> = item["embedding"]
                .as_array()
                .ok_or_else(|| ProspectorError::Provider(format!("item {index} has no embedding")))?
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect();
            if vector.len() != self.dimension {
                return Err(ProspectorError::Provider(format!(
                    "embedding {index} has dimension {}, expected {}",
                    vector.len(),
                    self.dimension
                )));
            }
            let slot = slots
                .get_mut(index)
                .ok_or_else(|| ProspectorError::Provider(format!("embedding index {index} out of range")))?;
            *slot = Some(vector);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(i, v)| v.ok_or_else(|| ProspectorError::Provider(format!("missing embedding {i}"))))
            .collect()
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let url = endpoint_url(&self.endpoint, "/embeddings");
        let body = json!({ "model": self.model, "input": texts });

        let mut req = self.client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }
        let resp = req
            .send()
            .await
            .map_err(|e| ProspectorError::Http(format!("embeddings connection failed ({url}): {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProspectorError::Provider(format!("embeddings API error {status}: {text}")));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| ProspectorError::Http(e.to_string()))?;
        self.parse(&json, texts.len())
    }
}

/// Signed feature hashing over lowercased word tokens, L2-normalized.
/// Texts sharing words land close together; nothing leaves the process.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension: dimension.max(1) }
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let lowered = text.to_lowercase();
        for token in lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let digest = Sha256::digest(token.as_bytes());
            let mut bucket = [0u8; 8];
            bucket.copy_from_slice(&digest[..8]);
            let slot = (u64::from_le_bytes(bucket) % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[slot] += sign;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn l2(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    #[test]
    fn test_hash_embedder_deterministic_and_normalized() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed_one("Department of Mining Engineering");
        assert_eq!(a, embedder.embed_one("department of mining engineering"));
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hash_embedder_similarity() {
        let embedder = HashEmbedder::new(256);
        let query = embedder.embed_one("mining engineering programs");
        let near = embedder.embed_one("mining engineering programs offered");
        let far = embedder.embed_one("hostel transport schedule");
        assert!(l2(&query, &near) < l2(&query, &far));
    }

    #[test]
    fn test_hash_embedder_empty_text() {
        let embedder = HashEmbedder::new(8);
        assert_eq!(embedder.embed_one("  ?! "), vec![0.0; 8]);
    }

    fn openai(server: &MockServer, dimension: usize) -> OpenAiEmbedder {
        OpenAiEmbedder::new(&EmbeddingsConfig {
            endpoint: server.uri(),
            dimension,
            ..EmbeddingsConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_openai_embedder_reorders_by_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_partial_json(json!({"input": ["a", "b"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"index": 1, "embedding": [0.0, 1.0]},
                    {"index": 0, "embedding": [1.0, 0.0]}
                ]
            })))
            .mount(&server)
            .await;

        let vectors = openai(&server, 2).embed(&["a".into(), "b".into()]).await.unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_openai_embedder_rejects_wrong_dimension() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"index": 0, "embedding": [1.0, 0.0, 0.0]}]
            })))
            .mount(&server)
            .await;

        assert!(openai(&server, 2).embed(&["a".into()]).await.is_err());
    }

    #[tokio::test]
    async fn test_openai_embedder_rejects_wrong_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"index": 0, "embedding": [1.0, 0.0]}]
            })))
            .mount(&server)
            .await;

        assert!(openai(&server, 2).embed(&["a".into(), "b".into()]).await.is_err());
    }

    #[tokio::test]
    async fn test_openai_embedder_empty_batch() {
        let server = MockServer::start().await;
        assert!(openai(&server, 2).embed(&[]).await.unwrap().is_empty());
    }
}
