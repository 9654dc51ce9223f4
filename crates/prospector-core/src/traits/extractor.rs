//! Page-text extraction trait.

use std::path::Path;

use crate::error::Result;

/// Extracts raw text per page from a source document.
///
/// An empty string marks a page without extractable text (scanned images,
/// blank pages). Errors are reserved for document-level failures.
pub trait PageExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>>;
}
