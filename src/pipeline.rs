//! Modality pipeline: route an input to its extractor, then summarize.
//!
//! ```text
//! text     -> TextLoader         -+
//! document -> DocumentExtractor  -+-> Summarizer -> Summary
//! audio    -> AudioTranscriber   -+
//! video    -> VideoDemuxer -> AudioTranscriber
//! ```
//!
//! Every run is synchronous and independent; the only state shared between
//! runs is the pair of lazily loaded model handles.

use crate::config::Config;
use crate::error::{MultisumError, Result};
use crate::extract::audio::AudioTranscriber;
use crate::extract::command::CommandExecutor;
use crate::extract::document::DocumentExtractor;
use crate::extract::text::TextLoader;
use crate::extract::video::VideoDemuxer;
use crate::models::lazy::LazyModel;
use crate::staging::StagingArea;
use crate::stt::transcriber::Transcriber;
use crate::summarize::summarizer::Summarizer;
use crate::types::{ExtractedText, Modality, SourceFile, Summary};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct Pipeline {
    text: TextLoader,
    document: DocumentExtractor,
    audio: AudioTranscriber,
    video: VideoDemuxer,
    summarizer: Arc<LazyModel<dyn Summarizer>>,
}

impl Pipeline {
    pub fn new(
        document: DocumentExtractor,
        audio: AudioTranscriber,
        video: VideoDemuxer,
        summarizer: Arc<LazyModel<dyn Summarizer>>,
    ) -> Self {
        Self {
            text: TextLoader::new(),
            document,
            audio,
            video,
            summarizer,
        }
    }

    /// Wire every extractor from configuration and the shared model handles.
    pub fn from_config(
        config: &Config,
        transcriber: Arc<LazyModel<dyn Transcriber>>,
        summarizer: Arc<LazyModel<dyn Summarizer>>,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        let staging = StagingArea::new(config.staging.resolved_dir());
        Self::new(
            DocumentExtractor::from_config(&config.document),
            AudioTranscriber::new(transcriber),
            VideoDemuxer::new(executor, config.video.clone(), staging),
            summarizer,
        )
    }

    /// Summarize the file at `path`, with the modality given as a caller tag
    /// such as `"pdf"` or `"audio"`.
    ///
    /// An unrecognised tag fails before any file is touched.
    pub fn run_tagged(&self, path: &Path, tag: &str) -> Result<Summary> {
        let modality: Modality = tag.parse()?;
        self.run(&SourceFile::new(path, modality))
    }

    /// Extract text from `source` and summarize it.
    pub fn run(&self, source: &SourceFile) -> Result<Summary> {
        let span = tracing::info_span!(
            "pipeline",
            modality = %source.modality,
            path = %source.path.display()
        );
        let _enter = span.enter();
        let started = Instant::now();

        let extracted = self.extract(source)?;
        tracing::info!(chars = extracted.char_count(), "Text extracted");

        if extracted.is_blank() {
            return Err(MultisumError::NothingToSummarize {
                modality: source.modality,
            });
        }

        let summary = self.summarize(&extracted)?;
        tracing::info!(
            model = %summary.model,
            chars = summary.text.chars().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Summary generated"
        );
        Ok(summary)
    }

    /// Run only the extraction stage for `source`.
    pub fn extract(&self, source: &SourceFile) -> Result<ExtractedText> {
        let path = source.path.as_path();
        let content = match source.modality {
            Modality::Text => self.text.load(path)?,
            Modality::Document => self.document.extract(path)?,
            Modality::Audio => self.audio.transcribe(path)?,
            Modality::Video => {
                let temp = self.video.demux(path)?;
                let transcript = self.audio.transcribe(temp.path());
                temp.close();
                transcript?
            }
        };
        Ok(ExtractedText::new(content, source.modality))
    }

    fn summarize(&self, extracted: &ExtractedText) -> Result<Summary> {
        let summarizer = self.summarizer.get()?;
        let text = summarizer.summarize(extracted.content())?;
        Ok(Summary {
            text,
            source_modality: extracted.source_modality(),
            model: summarizer.model_name().to_string(),
        })
    }
}

/// Summarize `path` declared as `file_type`, or `None` when no summary could
/// be produced.
///
/// The cause of a `None` is logged, never returned.
pub fn get_summary(pipeline: &Pipeline, path: &Path, file_type: &str) -> Option<String> {
    match pipeline.run_tagged(path, file_type) {
        Ok(summary) => Some(summary.text),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                file_type,
                kind = ?e.kind(),
                error = %e,
                "No summary produced"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::ErrorKind;
    use crate::extract::command::MockCommandExecutor;
    use crate::stt::transcriber::MockTranscriber;
    use crate::summarize::summarizer::MockSummarizer;

    fn pipeline(summarizer: MockSummarizer, staging: &Path) -> Pipeline {
        let mut config = Config::default();
        config.staging.dir = Some(staging.to_path_buf());
        let transcriber: Arc<dyn Transcriber> = Arc::new(MockTranscriber::new("mock-stt"));
        let summarizer: Arc<dyn Summarizer> = Arc::new(summarizer);
        Pipeline::from_config(
            &config,
            Arc::new(LazyModel::ready("mock-stt", transcriber)),
            Arc::new(LazyModel::ready("mock-sum", summarizer)),
            Arc::new(MockCommandExecutor::new()),
        )
    }

    #[test]
    fn text_input_is_summarized_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.txt");
        std::fs::write(&path, "The fox jumps. The dog sleeps.").unwrap();
        let summarizer = MockSummarizer::new("mock-sum");

        let summary = pipeline(summarizer.clone(), dir.path())
            .run(&SourceFile::new(&path, Modality::Text))
            .unwrap();

        assert_eq!(summary.text, "The fox jumps.");
        assert_eq!(summary.source_modality, Modality::Text);
        assert_eq!(summary.model, "mock-sum");
        assert_eq!(summarizer.inputs(), vec!["The fox jumps. The dog sleeps."]);
    }

    #[test]
    fn whitespace_only_text_skips_summarizer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, " \n\t ").unwrap();
        let summarizer = MockSummarizer::new("mock-sum");

        let err = pipeline(summarizer.clone(), dir.path())
            .run(&SourceFile::new(&path, Modality::Text))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NothingToSummarize);
        assert_eq!(summarizer.call_count(), 0);
    }

    #[test]
    fn summarizer_failure_is_model_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.txt");
        std::fs::write(&path, "Some text.").unwrap();

        let err = pipeline(MockSummarizer::new("m").with_failure(), dir.path())
            .run(&SourceFile::new(&path, Modality::Text))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ModelError);
    }

    #[test]
    fn unknown_tag_fails_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let summarizer = MockSummarizer::new("mock-sum");

        let err = pipeline(summarizer.clone(), dir.path())
            .run_tagged(&dir.path().join("does-not-exist.png"), "image")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnsupportedModality);
        assert_eq!(summarizer.call_count(), 0);
    }

    #[test]
    fn get_summary_collapses_errors_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(MockSummarizer::new("mock-sum"), dir.path());

        assert_eq!(get_summary(&p, &dir.path().join("missing.txt"), "text"), None);
        assert_eq!(get_summary(&p, dir.path(), "image"), None);
    }

    #[test]
    fn get_summary_returns_summary_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "Short note.").unwrap();
        let p = pipeline(MockSummarizer::new("m").with_response("note"), dir.path());

        assert_eq!(get_summary(&p, &path, "TEXT"), Some("note".to_string()));
    }
}
