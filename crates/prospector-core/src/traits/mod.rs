//! Collaborator seams. Everything behind these traits is a black box to the
//! retrieval pipeline.

pub mod embedder;
pub mod extractor;
pub mod generator;

pub use embedder::Embedder;
pub use extractor::PageExtractor;
pub use generator::Generator;
