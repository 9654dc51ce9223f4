//! # Prospector Agent
//! The retrieval orchestrator: guardrails, intent, hybrid context, generation.
//!
//! ## Features:
//! - **Guardrails first**: out-of-scope questions are refused before any retrieval
//! - **Intent-aware search**: degree and topic questions get a targeted search phrase
//! - **Hybrid context**: entity-graph facts on top, topic-filtered chunks below
//! - **Atomic rebuilds**: graph and index are swapped together on ingestion
//! - **Snapshots**: every ingestion is persisted to `<data_dir>/snapshot.json`

pub mod context;
pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{IngestSummary, KnowledgeStats, Orchestrator, Prepared, QueryPlan};
