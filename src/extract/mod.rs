//! Per-modality text extraction.

pub mod audio;
pub mod command;
pub mod document;
pub mod text;
pub mod video;
