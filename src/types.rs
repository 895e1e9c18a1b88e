//! Value types flowing through the summarization pipeline.

use crate::error::{MultisumError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Declared kind of input content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    Text,
    Document,
    Audio,
    Video,
}

impl Modality {
    pub const ALL: [Modality; 4] = [
        Modality::Text,
        Modality::Document,
        Modality::Audio,
        Modality::Video,
    ];

    /// Canonical lowercase name, also used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Document => "document",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }

    /// File extensions accepted for upload in this modality.
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Text => &["txt"],
            Self::Document => &["pdf"],
            Self::Audio => &["mp3", "wav"],
            Self::Video => &["mp4", "avi", "mov"],
        }
    }

    /// Map a media type to a modality.
    ///
    /// Returns `None` for anything that is not text, PDF, audio or video.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(Self::Document),
            m if m.starts_with("text/") => Some(Self::Text),
            m if m.starts_with("audio/") => Some(Self::Audio),
            m if m.starts_with("video/") => Some(Self::Video),
            _ => None,
        }
    }

    /// Guess the modality of a file from its name.
    ///
    /// The extension must be one of the accepted upload extensions, and its
    /// guessed media type must map to the same modality. File contents are
    /// never read.
    pub fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let unsupported = || MultisumError::UnsupportedModality {
            tag: if extension.is_empty() {
                format!("no file extension on {}", path.display())
            } else {
                format!(".{extension} files")
            },
        };

        if !Self::ALL
            .iter()
            .any(|m| m.accepted_extensions().contains(&extension.as_str()))
        {
            return Err(unsupported());
        }

        let modality = mime_guess::from_path(path)
            .iter()
            .find_map(|mime| Self::from_mime(mime.essence_str()))
            .ok_or_else(unsupported)?;

        if modality.accepted_extensions().contains(&extension.as_str()) {
            Ok(modality)
        } else {
            Err(unsupported())
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = MultisumError;

    /// Parse a caller tag. `"pdf"` is accepted as an alias for documents.
    fn from_str(tag: &str) -> Result<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "pdf" | "document" => Ok(Self::Document),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            _ => Err(MultisumError::UnsupportedModality {
                tag: tag.to_string(),
            }),
        }
    }
}

/// An input file and its declared modality, owned by one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub modality: Modality,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, modality: Modality) -> Self {
        Self {
            path: path.into(),
            modality,
        }
    }

    /// Build a source file whose modality is guessed from the file name.
    pub fn detect(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let modality = Modality::detect(&path)?;
        Ok(Self { path, modality })
    }
}

/// Plain text produced by exactly one extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    content: String,
    source_modality: Modality,
}

impl ExtractedText {
    pub fn new(content: String, source_modality: Modality) -> Self {
        Self {
            content,
            source_modality,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source_modality(&self) -> Modality {
        self.source_modality
    }

    /// True when there is nothing worth summarizing.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Generated summary returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    pub source_modality: Modality,
    pub model: String,
}
