//! Chunk index: exact nearest-neighbor search over chunk embeddings.
//!
//! The chunk list and its vectors live in one [`ChunkIndex`] value and are
//! only ever replaced together, so a neighbor id always dereferences the
//! chunk it was computed for.

use prospector_core::error::{ProspectorError, Result};
use prospector_core::traits::Embedder;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::chunker::Chunker;

/// A search hit: position in the chunk list and squared L2 distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: usize,
    pub distance: f32,
}

/// Brute-force index over squared Euclidean distance.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatL2Index {
    pub fn new(dimension: usize) -> Self {
        Self { dimension, vectors: Vec::new() }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// Append vectors; ids continue from the current length.
    pub fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<()> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(ProspectorError::Index(format!(
                "vector has dimension {}, index expects {}",
                bad.len(),
                self.dimension
            )));
        }
        self.vectors.extend(vectors);
        Ok(())
    }

    /// The `k` nearest vectors, closest first. Equal distances keep id order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(ProspectorError::Index(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dimension
            )));
        }
        let mut hits: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, v)| Neighbor { id, distance: squared_l2(query, v) })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        hits.truncate(k);
        Ok(hits)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Chunk texts plus their row-aligned index.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkIndex {
    chunks: Vec<String>,
    index: FlatL2Index,
}

impl ChunkIndex {
    pub fn empty(dimension: usize) -> Self {
        Self { chunks: Vec::new(), index: FlatL2Index::new(dimension) }
    }

    /// Pair chunks with their vectors. Counts and dimensions must line up.
    pub fn new(chunks: Vec<String>, vectors: Vec<Vec<f32>>, dimension: usize) -> Result<Self> {
        if chunks.len() != vectors.len() {
            return Err(ProspectorError::Index(format!(
                "{} chunks but {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }
        let mut index = FlatL2Index::new(dimension);
        index.add(vectors)?;
        Ok(Self { chunks, index })
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        self.index.vectors()
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Nearest chunk texts for an already-embedded query.
    pub fn search_vector(&self, query: &[f32], top_k: usize) -> Result<Vec<String>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .index
            .search(query, top_k)?
            .into_iter()
            .filter_map(|n| self.chunks.get(n.id).cloned())
            .collect())
    }
}

/// Outcome of an index rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    Indexed(usize),
    Empty,
}

impl std::fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indexed(n) => write!(f, "Success: Indexed {n} chunks."),
            Self::Empty => write!(f, "Warning: No text found to chunk."),
        }
    }
}

/// Builds chunk indexes and embeds queries against them.
#[derive(Clone)]
pub struct ChunkIndexer {
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
}

impl ChunkIndexer {
    pub fn new(chunker: Chunker, embedder: Arc<dyn Embedder>, batch_size: usize) -> Self {
        Self { chunker, embedder, batch_size: batch_size.max(1) }
    }

    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// Chunk and embed a text into a fresh index. Nothing is shared with any
    /// previous index.
    pub async fn build(&self, text: &str) -> Result<(ChunkIndex, IndexStatus)> {
        tracing::info!("🧠 Vectorizing {} characters...", text.chars().count());
        let chunks = self.chunker.chunk(text);
        tracing::info!("🧩 Created {} chunks", chunks.len());

        if chunks.is_empty() {
            tracing::warn!("⚠️ No chunks produced, index left empty");
            return Ok((ChunkIndex::empty(self.dimension()), IndexStatus::Empty));
        }

        let mut vectors = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let embedded = self.embedder.embed(batch).await?;
            if embedded.len() != batch.len() {
                return Err(ProspectorError::Index(format!(
                    "{} returned {} vectors for {} chunks",
                    self.embedder.name(),
                    embedded.len(),
                    batch.len()
                )));
            }
            vectors.extend(embedded);
        }

        let count = chunks.len();
        let index = ChunkIndex::new(chunks, vectors, self.dimension())?;
        Ok((index, IndexStatus::Indexed(count)))
    }

    /// Embed a single search query.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProspectorError::Index(format!("{} returned no vector", self.embedder.name())))
    }

    /// Embed a query and search an index. An empty index short-circuits
    /// without calling the embedder.
    pub async fn search(&self, index: &ChunkIndex, query: &str, top_k: usize) -> Result<Vec<String>> {
        if index.is_empty() {
            return Ok(Vec::new());
        }
        let vector = self.embed_query(query).await?;
        index.search_vector(&vector, top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    /// Embeds a text as [length, count of 'a'] and counts calls.
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        fn name(&self) -> &str {
            "counting"
        }

        fn dimension(&self) -> usize {
            2
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| vec![t.chars().count() as f32, t.matches('a').count() as f32])
                .collect())
        }
    }

    fn indexer(batch_size: usize) -> (ChunkIndexer, Arc<CountingEmbedder>) {
        let embedder = Arc::new(CountingEmbedder { calls: AtomicUsize::new(0) });
        (ChunkIndexer::new(Chunker::default(), embedder.clone(), batch_size), embedder)
    }

    #[test]
    fn test_flat_search_orders_by_distance() {
        let mut index = FlatL2Index::new(2);
        index.add(vec![vec![3.0, 0.0], vec![1.0, 0.0], vec![0.0, 2.0]]).unwrap();
        let hits = index.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(hits.iter().map(|h| h.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(hits[0].distance, 1.0);
        assert_eq!(hits[1].distance, 4.0);
    }

    #[test]
    fn test_ties_keep_chunk_order() {
        let mut index = FlatL2Index::new(1);
        index.add(vec![vec![1.0], vec![-1.0], vec![1.0], vec![5.0]]).unwrap();
        let hits = index.search(&[0.0], 10).unwrap();
        assert_eq!(hits.iter().map(|h| h.id).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_dimension_checks() {
        let mut index = FlatL2Index::new(3);
        assert!(index.add(vec![vec![1.0, 2.0]]).is_err());
        assert!(index.search(&[1.0], 1).is_err());
    }

    #[test]
    fn test_chunk_index_alignment() {
        assert!(ChunkIndex::new(vec!["a".into(), "b".into()], vec![vec![0.0]], 1).is_err());
        let index = ChunkIndex::new(vec!["near".into(), "far".into()], vec![vec![0.1], vec![9.0]], 1).unwrap();
        assert_eq!(index.search_vector(&[0.0], 5).unwrap(), vec!["near".to_string(), "far".to_string()]);
        assert_eq!(index.search_vector(&[0.0], 0).unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_build_batches_embeddings() {
        let (indexer, embedder) = indexer(2);
        let text = "a".repeat(2300);
        let (index, status) = indexer.build(&text).await.unwrap();
        assert_eq!(status, IndexStatus::Indexed(5));
        assert_eq!(index.len(), 5);
        assert_eq!(index.vectors().len(), 5);
        // 5 chunks in batches of 2
        assert_eq!(embedder.calls.load(AtomicOrdering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_build_empty_text() {
        let (indexer, embedder) = indexer(32);
        let (index, status) = indexer.build("too short").await.unwrap();
        assert_eq!(status, IndexStatus::Empty);
        assert!(index.is_empty());
        assert_eq!(status.to_string(), "Warning: No text found to chunk.");
        assert_eq!(embedder.calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_empty_index_skips_embedding() {
        let (indexer, embedder) = indexer(32);
        let results = indexer.search(&ChunkIndex::empty(2), "anything", 50).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(embedder.calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_is_deterministic() {
        let (indexer, _) = indexer(32);
        let text = format!("{}{}", "a".repeat(1200), "b".repeat(1200));
        let (index, _) = indexer.build(&text).await.unwrap();
        let first = indexer.search(&index, "aaaa", 3).await.unwrap();
        let second = indexer.search(&index, "aaaa", 3).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
