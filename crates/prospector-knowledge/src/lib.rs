//! # Prospector Knowledge
//!
//! The two knowledge stores behind every answer, and the ingestion that
//! fills them.
//!
//! ## How it works
//! ```text
//! prospectus.pdf
//!   ↓ DocumentIngestor - per-page text, whitespace collapsed, tiny pages dropped
//! normalized text
//!   ├─→ EntityGraphBuilder - "Department of X" + "Chairman: Dr. Y" → X ─HAS_CHAIRMAN→ Y
//!   └─→ ChunkIndexer       - 1000-char windows, 500 stride → embeddings → flat L2 index
//!   ↓
//! snapshot.json (graph + chunks + vectors, written atomically)
//! ```

pub mod chunker;
pub mod graph;
pub mod index;
pub mod ingest;
pub mod store;

pub use chunker::Chunker;
pub use graph::{BuildReport, EntityGraph, EntityGraphBuilder, NodeKind};
pub use index::{ChunkIndex, ChunkIndexer, IndexStatus};
pub use ingest::{DocumentIngestor, IngestReport};
pub use store::{KnowledgeSnapshot, KnowledgeState, SnapshotStore};
