//! # Prospector Core
//!
//! Shared building blocks for the Prospector workspace:
//! - [`config`]: TOML configuration with defaults for every field
//! - [`error`]: the workspace error type
//! - [`traits`]: collaborator seams (page extraction, embeddings, generation)
//! - [`types`]: chat messages and generation parameters

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::ProspectorConfig;
pub use error::{ProspectorError, Result};
