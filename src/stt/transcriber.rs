//! Speech-to-text seam between the audio extractor and the model backend.

use crate::error::{MultisumError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Text recognised in one audio buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionResult {
    pub text: String,
    /// Detected (or forced) language code, empty when unknown.
    pub language: String,
    /// Mean speech confidence over all segments, 0.0..=1.0.
    pub confidence: f32,
}

/// A speech model that turns 16kHz mono PCM into text.
///
/// One instance serves every request, so implementations must be shareable.
pub trait Transcriber: Send + Sync {
    /// Transcribe the whole buffer in a single pass.
    fn transcribe(&self, audio: &[i16]) -> Result<TranscriptionResult>;

    fn model_name(&self) -> &str;
}

impl<T: Transcriber + ?Sized> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &[i16]) -> Result<TranscriptionResult> {
        (**self).transcribe(audio)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Canned transcriber for tests; clones share one call counter.
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    response: String,
    should_fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockTranscriber {
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: "mock transcription".to_string(),
            should_fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Text returned by every call.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Make every call fail with a model error.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, _audio: &[i16]) -> Result<TranscriptionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(MultisumError::model("mock transcription failure"));
        }
        Ok(TranscriptionResult {
            text: self.response.clone(),
            language: "en".to_string(),
            confidence: 1.0,
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_configured_text() {
        let transcriber = MockTranscriber::new("test-model").with_response("Hello, this is a test");

        let result = transcriber.transcribe(&[0i16; 1000]).unwrap();

        assert_eq!(result.text, "Hello, this is a test");
        assert_eq!(result.language, "en");
    }

    #[test]
    fn mock_failure_is_model_error() {
        let err = MockTranscriber::new("test-model")
            .with_failure()
            .transcribe(&[0i16; 1000])
            .unwrap_err();

        match err {
            MultisumError::Model { message } => assert_eq!(message, "mock transcription failure"),
            other => panic!("Expected Model error, got {other:?}"),
        }
    }

    #[test]
    fn failed_calls_are_counted_too() {
        let transcriber = MockTranscriber::new("test-model").with_failure();
        let observer = transcriber.clone();

        assert!(transcriber.transcribe(&[0i16; 10]).is_err());
        assert!(transcriber.transcribe(&[0i16; 10]).is_err());

        assert_eq!(observer.call_count(), 2);
    }

    #[test]
    fn works_behind_a_trait_object() {
        let transcriber: Arc<dyn Transcriber> =
            Arc::new(MockTranscriber::new("test-model").with_response("shared test"));

        assert_eq!(transcriber.model_name(), "test-model");
        assert_eq!(transcriber.transcribe(&[0i16; 100]).unwrap().text, "shared test");
    }
}
