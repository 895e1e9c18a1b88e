//! Abstractive summarization of extracted text.

#[cfg(feature = "summarizer")]
pub mod candle_t5;
pub mod decode;
pub mod summarizer;
