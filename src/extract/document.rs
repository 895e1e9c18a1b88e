//! PDF text extraction.
//!
//! Pages are extracted in document order with `pdf-extract` and joined with
//! the configured separator.

use crate::config::{BlankPagePolicy, DocumentConfig};
use crate::error::{MultisumError, Result};
use crate::types::Modality;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    separator: String,
    blank_pages: BlankPagePolicy,
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::from_config(&DocumentConfig::default())
    }
}

fn failure(message: impl Into<String>) -> MultisumError {
    MultisumError::extraction(Modality::Document, message)
}

impl DocumentExtractor {
    pub fn new(separator: impl Into<String>, blank_pages: BlankPagePolicy) -> Self {
        Self {
            separator: separator.into(),
            blank_pages,
        }
    }

    pub fn from_config(config: &DocumentConfig) -> Self {
        Self::new(config.page_separator.clone(), config.blank_pages)
    }

    /// Extract the text of every page of the PDF at `path`.
    pub fn extract(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)
            .map_err(|e| failure(format!("failed to read {}: {e}", path.display())))?;
        self.extract_bytes(&bytes)
    }

    /// Extract the text of every page of an in-memory PDF.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<String> {
        let pages = read_pages(bytes)?;
        if pages.is_empty() {
            return Err(failure("document has no pages"));
        }

        let page_count = pages.len();
        let mut kept: Vec<String> = Vec::with_capacity(page_count);
        for (index, page) in pages.into_iter().enumerate() {
            if page.trim().is_empty() {
                match self.blank_pages {
                    BlankPagePolicy::Fail => {
                        return Err(failure(format!(
                            "page {} has no extractable text",
                            index + 1
                        )));
                    }
                    BlankPagePolicy::Skip => {
                        tracing::debug!(page = index + 1, "Skipping page without text");
                        continue;
                    }
                }
            }
            kept.push(page);
        }

        if kept.is_empty() {
            return Err(failure("no page has extractable text"));
        }

        tracing::debug!(pages = page_count, kept = kept.len(), "PDF pages extracted");
        Ok(kept.join(&self.separator))
    }
}

/// pdf-extract panics on some malformed documents instead of returning an error.
fn read_pages(bytes: &[u8]) -> Result<Vec<String>> {
    match catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    })) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(failure(format!("unreadable PDF: {e}"))),
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "parser panicked".to_string());
            Err(failure(format!("malformed PDF: {detail}")))
        }
    }
}
