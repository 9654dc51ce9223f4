//! Document ingestion: page text in, normalized text out.
//!
//! Page-level problems never fail an ingestion: pages without text or with
//! too little text are skipped and recorded, and a suspiciously short result
//! only raises a diagnostic. The one hard error is a missing document.

use prospector_core::config::IngestConfig;
use prospector_core::error::{ProspectorError, Result};
use prospector_core::traits::PageExtractor;
use serde::Serialize;
use std::path::Path;

/// PDF page text via `pdf-extract`, one string per page.
pub struct PdfExtractor;

impl PageExtractor for PdfExtractor {
    fn name(&self) -> &str {
        "pdf"
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>> {
        pdf_extract::extract_text_by_pages(path)
            .map_err(|e| ProspectorError::Extraction(format!("{}: {e}", path.display())))
    }
}

/// Plain text documents. Form feeds separate pages; no form feed means one page.
pub struct PlainTextExtractor;

impl PageExtractor for PlainTextExtractor {
    fn name(&self) -> &str {
        "text"
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(path)?;
        Ok(split_pages(&content))
    }
}

fn split_pages(text: &str) -> Vec<String> {
    text.split('\u{c}').map(String::from).collect()
}

/// Pick an extractor by file extension.
pub fn extractor_for(path: &Path) -> Box<dyn PageExtractor> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        Box::new(PdfExtractor)
    } else {
        Box::new(PlainTextExtractor)
    }
}

/// Why a page did not make it into the normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Nothing extractable (blank or image-only page).
    NoText,
    /// Some text, but not more than the page floor.
    TooLittleText { chars: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPage {
    /// 1-based page number.
    pub page: usize,
    pub reason: SkipReason,
}

/// Result of one ingestion pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Kept pages joined with single spaces.
    pub text: String,
    pub total_pages: usize,
    pub kept_pages: usize,
    pub skipped: Vec<SkippedPage>,
    /// Set when the text is below the short-text threshold.
    pub short_text: bool,
}

impl IngestReport {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Extracts and normalizes page text from a source document.
#[derive(Debug, Clone)]
pub struct DocumentIngestor {
    min_page_chars: usize,
    short_text_threshold: usize,
}

impl DocumentIngestor {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            min_page_chars: config.min_page_chars,
            short_text_threshold: config.short_text_threshold,
        }
    }

    /// Ingest a document from disk.
    pub fn ingest(&self, extractor: &dyn PageExtractor, path: &Path) -> Result<IngestReport> {
        if !path.exists() {
            return Err(ProspectorError::DocumentNotFound(path.to_path_buf()));
        }
        tracing::info!("⚙️ Starting ingestion of {} ({})", path.display(), extractor.name());

        let pages = match extractor.extract_pages(path) {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!("⚠️ Text extraction failed, continuing with no pages: {e}");
                Vec::new()
            }
        };
        tracing::info!("📄 Document has {} pages", pages.len());
        Ok(self.normalize(&pages))
    }

    /// Normalize extracted pages into a single text.
    pub fn normalize(&self, pages: &[String]) -> IngestReport {
        let mut kept = Vec::new();
        let mut skipped = Vec::new();

        for (i, raw) in pages.iter().enumerate() {
            let page = i + 1;
            let cleaned = collapse_whitespace(raw);
            let chars = cleaned.chars().count();
            if chars == 0 {
                tracing::warn!("   ❌ Page {page} skipped (no text found / image)");
                skipped.push(SkippedPage { page, reason: SkipReason::NoText });
            } else if chars <= self.min_page_chars {
                tracing::warn!("   ⚠️ Page {page} skipped (too little text: {chars} chars)");
                skipped.push(SkippedPage { page, reason: SkipReason::TooLittleText { chars } });
            } else {
                kept.push(cleaned);
            }
        }

        let text = kept.join(" ");
        let total = text.chars().count();
        tracing::info!("✅ Total extracted characters: {total}");

        let short_text = total < self.short_text_threshold;
        if short_text {
            tracing::warn!(
                "🚨 Extracted text is suspicious (< {} chars). The document might be images.",
                self.short_text_threshold
            );
        }

        IngestReport {
            text,
            total_pages: pages.len(),
            kept_pages: kept.len(),
            skipped,
            short_text,
        }
    }
}

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
