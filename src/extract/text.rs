//! Plain text files.

use crate::error::{MultisumError, Result};
use crate::types::Modality;
use std::path::Path;

/// Reads a text file verbatim.
#[derive(Debug, Clone, Default)]
pub struct TextLoader;

impl TextLoader {
    pub fn new() -> Self {
        Self
    }

    /// Read the whole file as UTF-8.
    pub fn load(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|e| {
            MultisumError::extraction(
                Modality::Text,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;

        let text = String::from_utf8(bytes).map_err(|e| {
            MultisumError::extraction(
                Modality::Text,
                format!("{} is not valid UTF-8: {e}", path.display()),
            )
        })?;

        tracing::debug!(chars = text.chars().count(), "Text file loaded");
        Ok(text)
    }
}
