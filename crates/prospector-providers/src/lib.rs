//! # Prospector Providers
//!
//! Backends for the two model collaborators.
//!
//! Chat generation goes through a single `OpenAiCompatibleClient`; any
//! server speaking the OpenAI chat API works. Embeddings come from an
//! OpenAI-style `/embeddings` endpoint or, offline, from `HashEmbedder`.

pub mod embeddings;
pub mod openai_compatible;

use prospector_core::config::{EmbeddingsConfig, GenerationConfig};
use prospector_core::error::{ProspectorError, Result};
use prospector_core::traits::{Embedder, Generator};
use std::sync::Arc;

pub use embeddings::{HashEmbedder, OpenAiEmbedder};
pub use openai_compatible::OpenAiCompatibleClient;

/// Create an embedder from configuration.
pub fn create_embedder(config: &EmbeddingsConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiEmbedder::new(config)?)),
        "hash" => Ok(Arc::new(HashEmbedder::new(config.dimension))),
        other => Err(ProspectorError::ProviderNotFound(other.into())),
    }
}

/// Create a chat generator from configuration.
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn Generator>> {
    Ok(Arc::new(OpenAiCompatibleClient::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_embedder() {
        let config = EmbeddingsConfig { provider: "hash".into(), dimension: 16, ..Default::default() };
        let embedder = create_embedder(&config).unwrap();
        assert_eq!(embedder.name(), "hash");
        assert_eq!(embedder.dimension(), 16);

        assert_eq!(create_embedder(&EmbeddingsConfig::default()).unwrap().name(), "openai");
    }

    #[test]
    fn test_unknown_embedder() {
        let config = EmbeddingsConfig { provider: "word2vec".into(), ..Default::default() };
        assert!(matches!(create_embedder(&config), Err(ProspectorError::ProviderNotFound(_))));
    }

    #[test]
    fn test_create_generator() {
        assert_eq!(create_generator(&GenerationConfig::default()).unwrap().name(), "openai");
    }
}
