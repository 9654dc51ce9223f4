//! Embedding model trait.

use async_trait::async_trait;

use crate::error::Result;

/// Turns texts into fixed-dimension dense vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    /// Dimension of every vector this embedder returns.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts. The output is index-aligned with `texts`.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
