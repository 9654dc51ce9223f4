//! Error type shared by every Prospector crate.

use std::path::PathBuf;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, ProspectorError>;

#[derive(Debug, thiserror::Error)]
pub enum ProspectorError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Rules error: {0}")]
    Rules(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_not_found_message() {
        let err = ProspectorError::DocumentNotFound(PathBuf::from("data/raw/prospectus.pdf"));
        assert_eq!(err.to_string(), "document not found: data/raw/prospectus.pdf");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ProspectorError = io.into();
        assert!(matches!(err, ProspectorError::Io(_)));
    }
}
