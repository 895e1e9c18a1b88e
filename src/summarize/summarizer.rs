//! Summarizer trait and test double.

use crate::error::{MultisumError, Result};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Trait for abstractive summarization.
///
/// Implementations are shared read-only across pipeline runs, so any
/// mutable inference state lives behind interior locking.
pub trait Summarizer: Send + Sync {
    /// Produce a summary of `text`.
    fn summarize(&self, text: &str) -> Result<String>;

    /// Name of the model backing this summarizer.
    fn model_name(&self) -> &str;
}

impl<T: Summarizer + ?Sized> Summarizer for Arc<T> {
    fn summarize(&self, text: &str) -> Result<String> {
        (**self).summarize(text)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Mock summarizer for testing.
///
/// Records every input it receives; clones share the record.
#[derive(Debug, Clone)]
pub struct MockSummarizer {
    model_name: String,
    response: Option<String>,
    should_fail: bool,
    calls: Arc<AtomicUsize>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl MockSummarizer {
    /// Mock that echoes the first sentence of its input.
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: None,
            should_fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Configure the mock to return a fixed summary.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
        self
    }

    /// Configure the mock to fail on summarize.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Texts passed to `summarize`, in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Summarizer for MockSummarizer {
    fn summarize(&self, text: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut inputs) = self.inputs.lock() {
            inputs.push(text.to_string());
        }

        if self.should_fail {
            return Err(MultisumError::model("mock summarization failure"));
        }

        Ok(match &self.response {
            Some(response) => response.clone(),
            None => text
                .split_inclusive('.')
                .next()
                .unwrap_or(text)
                .trim()
                .to_string(),
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
    fn mock_echoes_first_sentence_by_default() {
        let summarizer = MockSummarizer::new("mock");
        let summary = summarizer
            .summarize("The fox jumps. The dog sleeps.")
            .unwrap();
        assert_eq!(summary, "The fox jumps.");
    }

    #[test]
    fn mock_returns_configured_response() {
        let summarizer = MockSummarizer::new("mock").with_response("short");
        assert_eq!(summarizer.summarize("anything").unwrap(), "short");
    }

    #[test]
    fn mock_failure_is_model_error() {
        let summarizer = MockSummarizer::new("mock").with_failure();
        let err = summarizer.summarize("text").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ModelError);
    }

    #[test]
    fn mock_records_inputs_across_clones() {
        let summarizer = MockSummarizer::new("mock");
        let observer = summarizer.clone();

        summarizer.summarize("first").unwrap();
        summarizer.summarize("second").unwrap();

        assert_eq!(observer.call_count(), 2);
        assert_eq!(observer.inputs(), vec!["first", "second"]);
    }

    #[test]
    fn summarizer_trait_object_is_shareable() {
        let summarizer: Arc<dyn Summarizer> = Arc::new(MockSummarizer::new("shared"));
        let clone = Arc::clone(&summarizer);
        assert_eq!(clone.model_name(), "shared");
    }
}
