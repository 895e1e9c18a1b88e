//! Speech-to-text backends.

pub mod transcriber;
pub mod whisper;
