//! # Prospector Gateway
//!
//! Thin HTTP surface over the orchestrator:
//! - `POST /ingest`: rebuild the knowledge stores from a document
//! - `POST /chat`: answer a question
//! - `POST /search`: raw chunk search (debugging aid)
//! - `GET /health`, `GET /stats`

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
