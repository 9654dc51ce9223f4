//! Orchestrator: drives ingestion and the per-question retrieval pipeline.
//!
//! Query path:
//! guardrail → intent → search phrase → vector retrieval → topic filter
//! → graph facts → context → prompt → generation
//!
//! Ingestion rebuilds the graph and the index off to the side and swaps
//! both in under one write guard, so a query sees either the old pair or
//! the new pair. The snapshot is captured under that guard and written
//! after it is released.

use prospector_core::config::ProspectorConfig;
use prospector_core::error::{ProspectorError, Result};
use prospector_core::traits::{Embedder, Generator};
use prospector_core::types::{GenerateParams, Message};
use prospector_knowledge::graph::{BuildReport, EntityGraph};
use prospector_knowledge::index::IndexStatus;
use prospector_knowledge::ingest::extractor_for;
use prospector_knowledge::{
    Chunker, ChunkIndexer, DocumentIngestor, EntityGraphBuilder, KnowledgeSnapshot, KnowledgeState,
    SnapshotStore,
};
use prospector_query::{GuardrailFilter, IntentExtractor, RuleSet, SearchIntent, Verdict};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::context;
use crate::prompt::build_prompt;

/// Everything retrieval decided for one question, before generation.
#[derive(Debug, Clone, Serialize)]
pub struct QueryPlan {
    pub intent: SearchIntent,
    pub search_query: String,
    /// Vector hits, nearest first.
    pub retrieved: Vec<String>,
    /// Chunks that made it into the context.
    pub kept: Vec<String>,
    /// The topic filter matched nothing and `kept` is the unfiltered set.
    pub fell_back: bool,
    pub graph_facts: String,
    pub context: String,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub enum Prepared {
    Refused(String),
    Ready(Box<QueryPlan>),
}

/// Outcome of one ingestion.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub graph: BuildReport,
    /// `None` when no text was extracted and the index was left alone.
    pub index: Option<IndexStatus>,
    pub total_pages: usize,
    pub kept_pages: usize,
    pub chars: usize,
    pub short_text: bool,
    /// Set when the rebuilt state is live in memory but did not reach disk.
    pub snapshot_error: Option<String>,
}

impl IngestSummary {
    pub fn status(&self) -> String {
        let mut status = match self.index {
            Some(status) => format!("{} | {status}", self.graph),
            None => format!("{} | Vectors skipped: no text extracted.", self.graph),
        };
        if let Some(e) = &self.snapshot_error {
            status.push_str(&format!(" | Warning: snapshot not saved: {e}"));
        }
        status
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnowledgeStats {
    pub nodes: usize,
    pub edges: usize,
    pub chunks: usize,
    pub dimension: usize,
}

pub struct Orchestrator {
    config: ProspectorConfig,
    ingestor: DocumentIngestor,
    graph_builder: EntityGraphBuilder,
    indexer: ChunkIndexer,
    guardrail: GuardrailFilter,
    intent: IntentExtractor,
    generator: Arc<dyn Generator>,
    params: GenerateParams,
    store: Option<SnapshotStore>,
    state: Arc<RwLock<KnowledgeState>>,
    ingest_lock: Mutex<()>,
}

impl Orchestrator {
    /// Build an orchestrator around explicit collaborators. With a store, the
    /// last snapshot is loaded and every ingestion is persisted.
    pub fn new(
        config: ProspectorConfig,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        store: Option<SnapshotStore>,
    ) -> Result<Self> {
        let rules = RuleSet::compile(&config.rules)?;
        let dimension = embedder.dimension();
        let state = match &store {
            Some(store) => store.load_or_empty(dimension),
            None => KnowledgeState::empty(dimension),
        };

        Ok(Self {
            ingestor: DocumentIngestor::new(&config.ingest),
            graph_builder: EntityGraphBuilder::new(&config.graph, &config.rules)?,
            indexer: ChunkIndexer::new(Chunker::new(&config.index), embedder, config.embeddings.batch_size),
            guardrail: GuardrailFilter::new(&rules),
            intent: IntentExtractor::new(rules),
            generator,
            params: GenerateParams::from(&config.generation),
            store,
            state: Arc::new(RwLock::new(state)),
            ingest_lock: Mutex::new(()),
            config,
        })
    }

    /// Build from configuration alone: configured backends, snapshot under
    /// `data_dir`.
    pub fn from_config(config: ProspectorConfig) -> Result<Self> {
        let embedder = prospector_providers::create_embedder(&config.embeddings)?;
        let generator = prospector_providers::create_generator(&config.generation)?;
        let store = SnapshotStore::new(&config.data_path());
        tracing::info!(
            "🔧 Embeddings: {} ({}), generation model: {}",
            embedder.name(),
            config.embeddings.model,
            config.generation.model
        );
        Self::new(config, embedder, generator, Some(store))
    }

    pub fn config(&self) -> &ProspectorConfig {
        &self.config
    }

    /// Ingest a document and return a one-line status. Failures are reported
    /// in the string, never raised.
    pub async fn ingest(&self, path: &Path) -> String {
        match self.ingest_document(path).await {
            Ok(summary) => summary.status(),
            Err(e) => {
                tracing::error!("❌ Ingestion failed: {e}");
                format!("Error: {e}")
            }
        }
    }

    /// Ingest with typed results. Neither store changes unless the whole
    /// rebuild succeeds.
    pub async fn ingest_document(&self, path: &Path) -> Result<IngestSummary> {
        let _serialized = self.ingest_lock.lock().await;

        let ingestor = self.ingestor.clone();
        let owned = path.to_path_buf();
        let report = tokio::task::spawn_blocking(move || {
            let extractor = extractor_for(&owned);
            ingestor.ingest(extractor.as_ref(), &owned)
        })
        .await
        .map_err(|e| ProspectorError::Other(format!("ingestion task failed: {e}")))??;

        let mut graph = if self.config.graph.merge_on_ingest {
            self.state.read().await.graph.clone()
        } else {
            EntityGraph::new()
        };
        let graph_report = self.graph_builder.build(&mut graph, &report.text);

        let rebuilt = if report.text.is_empty() {
            tracing::warn!("⚠️ No text extracted, keeping the current index");
            None
        } else {
            Some(self.indexer.build(&report.text).await?)
        };

        let (index_status, snapshot) = {
            let mut state = self.state.write().await;
            state.graph = graph;
            let status = rebuilt.map(|(index, status)| {
                state.index = index;
                status
            });
            let snapshot = self.store.as_ref().map(|_| KnowledgeSnapshot::capture(&state));
            (status, snapshot)
        };

        let snapshot_error = match (self.store.clone(), snapshot) {
            (Some(store), Some(snapshot)) => persist(store, snapshot).await.err().map(|e| {
                tracing::warn!("⚠️ Failed to persist snapshot: {e}");
                e.to_string()
            }),
            _ => None,
        };

        Ok(IngestSummary {
            graph: graph_report,
            index: index_status,
            total_pages: report.total_pages,
            kept_pages: report.kept_pages,
            chars: report.char_count(),
            short_text: report.short_text,
            snapshot_error,
        })
    }

    /// Run every retrieval step for a question without generating.
    pub async fn prepare(&self, question: &str) -> Result<Prepared> {
        if let Verdict::Refuse(message) = self.guardrail.check(question) {
            return Ok(Prepared::Refused(message));
        }

        let intent = self.intent.extract(question);
        let search_query = self.intent.search_query(question, &intent);
        match intent.topic() {
            Some(phrase) => tracing::debug!("🎯 Targeted search: '{search_query}' (phrase '{phrase}')"),
            None => tracing::debug!("🔍 Broad search: '{search_query}'"),
        }

        let has_chunks = !self.state.read().await.index.is_empty();
        let query_vector = if has_chunks {
            Some(self.indexer.embed_query(&search_query).await?)
        } else {
            None
        };

        let (retrieved, graph_facts) = {
            let state = self.state.read().await;
            let retrieved = match &query_vector {
                Some(vector) => state.index.search_vector(vector, self.config.index.top_k)?,
                None => Vec::new(),
            };
            (retrieved, state.graph.get_context(question))
        };

        let (kept, fell_back) = match intent.topic() {
            Some(topic) => {
                let (kept, fell_back) = context::filter_by_topic(&retrieved, topic);
                tracing::debug!(
                    "🧹 Topic filter '{topic}': kept {}/{} chunks{}",
                    kept.len(),
                    retrieved.len(),
                    if fell_back { " (fallback to unfiltered)" } else { "" }
                );
                (kept, fell_back)
            }
            None => (retrieved.clone(), false),
        };

        let context = context::assemble(&graph_facts, &kept, self.config.context.max_chars);
        let prompt = build_prompt(&context, question);

        Ok(Prepared::Ready(Box::new(QueryPlan {
            intent,
            search_query,
            retrieved,
            kept,
            fell_back,
            graph_facts,
            context,
            prompt,
        })))
    }

    /// Answer a question using the generation endpoint at `endpoint`.
    /// Refusals come back verbatim; failures as `"Error: ..."`.
    pub async fn answer(&self, question: &str, endpoint: &str) -> String {
        let plan = match self.prepare(question).await {
            Ok(Prepared::Refused(message)) => return message,
            Ok(Prepared::Ready(plan)) => plan,
            Err(e) => {
                tracing::error!("❌ Retrieval failed: {e}");
                return format!("Error: {e}");
            }
        };

        let messages = [Message::user(plan.prompt)];
        match self.generator.chat(endpoint, &messages, &self.params).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("❌ Generation failed: {e}");
                format!("Error: {e}")
            }
        }
    }

    /// Raw vector search, no guardrail or rewriting.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        if self.state.read().await.index.is_empty() {
            return Ok(Vec::new());
        }
        let vector = self.indexer.embed_query(query).await?;
        self.state.read().await.index.search_vector(&vector, top_k)
    }

    pub async fn graph_context(&self, query: &str) -> String {
        self.state.read().await.graph.get_context(query)
    }

    pub async fn stats(&self) -> KnowledgeStats {
        let state = self.state.read().await;
        KnowledgeStats {
            nodes: state.graph.node_count(),
            edges: state.graph.edge_count(),
            chunks: state.index.len(),
            dimension: state.index.dimension(),
        }
    }
}

async fn persist(store: SnapshotStore, snapshot: KnowledgeSnapshot) -> Result<()> {
    tokio::task::spawn_blocking(move || store.write(&snapshot))
        .await
        .map_err(|e| ProspectorError::Other(format!("snapshot task failed: {e}")))?
}
