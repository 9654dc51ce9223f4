//! Knowledge state and its on-disk snapshot.
//!
//! Graph, chunks and vectors are persisted together in one JSON document,
//! written to a temporary file and renamed into place.

use chrono::{DateTime, Utc};
use prospector_core::error::{ProspectorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::graph::{EntityGraph, GraphSnapshot};
use crate::index::ChunkIndex;

pub const SNAPSHOT_VERSION: u32 = 1;
pub const SNAPSHOT_FILE: &str = "snapshot.json";

/// The graph and the chunk index a query reads. Always replaced as a pair.
#[derive(Debug, Clone)]
pub struct KnowledgeState {
    pub graph: EntityGraph,
    pub index: ChunkIndex,
}

impl KnowledgeState {
    pub fn empty(dimension: usize) -> Self {
        Self { graph: EntityGraph::new(), index: ChunkIndex::empty(dimension) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSnapshot {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub graph: GraphSnapshot,
    pub chunks: Vec<String>,
    pub dimension: usize,
    pub vectors: Vec<Vec<f32>>,
}

impl KnowledgeSnapshot {
    pub fn capture(state: &KnowledgeState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            graph: state.graph.to_snapshot(),
            chunks: state.index.chunks().to_vec(),
            dimension: state.index.dimension(),
            vectors: state.index.vectors().to_vec(),
        }
    }

    pub fn restore(self) -> Result<KnowledgeState> {
        if self.version != SNAPSHOT_VERSION {
            return Err(ProspectorError::Snapshot(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                self.version
            )));
        }
        let graph = EntityGraph::from_snapshot(&self.graph)?;
        let index = ChunkIndex::new(self.chunks, self.vectors, self.dimension)?;
        Ok(KnowledgeState { graph, index })
    }
}

/// Reads and writes `<data_dir>/snapshot.json`.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: &Path) -> Self {
        Self { path: data_dir.join(SNAPSHOT_FILE) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, state: &KnowledgeState) -> Result<()> {
        self.write(&KnowledgeSnapshot::capture(state))
    }

    /// Write an already captured snapshot.
    pub fn write(&self, snapshot: &KnowledgeSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::info!("💾 Snapshot saved to {}", self.path.display());
        Ok(())
    }

    /// `Ok(None)` when no snapshot exists yet.
    pub fn load(&self) -> Result<Option<KnowledgeState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&self.path)?;
        let snapshot: KnowledgeSnapshot = serde_json::from_slice(&bytes)?;
        snapshot.restore().map(Some)
    }

    /// Load the snapshot, falling back to an empty state when it is missing
    /// or unreadable. Vectors of another dimension are dropped; the graph
    /// is kept.
    pub fn load_or_empty(&self, dimension: usize) -> KnowledgeState {
        match self.load() {
            Ok(Some(mut state)) => {
                if state.index.dimension() != dimension {
                    if !state.index.is_empty() {
                        tracing::warn!(
                            "⚠️ Snapshot vectors have dimension {}, embedder has {dimension}; index dropped, re-ingest to rebuild it",
                            state.index.dimension()
                        );
                    }
                    state.index = ChunkIndex::empty(dimension);
                }
                tracing::info!(
                    "📂 Loaded snapshot: {} nodes, {} edges, {} chunks",
                    state.graph.node_count(),
                    state.graph.edge_count(),
                    state.index.len()
                );
                state
            }
            Ok(None) => KnowledgeState::empty(dimension),
            Err(e) => {
                tracing::warn!("⚠️ Ignoring unreadable snapshot {}: {e}", self.path.display());
                KnowledgeState::empty(dimension)
            }
        }
    }
}
