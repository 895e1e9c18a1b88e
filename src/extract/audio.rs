//! Speech transcription of audio files.

use crate::audio::decode::decode_file;
use crate::defaults::SAMPLE_RATE;
use crate::error::Result;
use crate::models::lazy::LazyModel;
use crate::stt::transcriber::Transcriber;
use std::path::Path;
use std::sync::Arc;

/// Decodes an audio file and transcribes all of it with the shared speech model.
#[derive(Debug, Clone)]
pub struct AudioTranscriber {
    model: Arc<LazyModel<dyn Transcriber>>,
}

impl AudioTranscriber {
    pub fn new(model: Arc<LazyModel<dyn Transcriber>>) -> Self {
        Self { model }
    }

    /// Transcribe the entire file.
    ///
    /// The file is decoded before the model is touched, so undecodable input
    /// never triggers a model load.
    pub fn transcribe(&self, path: &Path) -> Result<String> {
        let samples = decode_file(path)?;
        let transcriber = self.model.get()?;

        let result = transcriber.transcribe(&samples)?;
        tracing::info!(
            model = transcriber.model_name(),
            duration_secs = samples.len() as f32 / SAMPLE_RATE as f32,
            language = %result.language,
            confidence = result.confidence,
            chars = result.text.chars().count(),
            "Audio transcribed"
        );

        Ok(result.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, MultisumError};
    use crate::stt::transcriber::MockTranscriber;

    fn write_tone(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..1600 {
            writer
                .write_sample(((i as f32 * 0.1).sin() * 8000.0) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }

    fn transcriber_with(mock: MockTranscriber) -> AudioTranscriber {
        let model: Arc<dyn Transcriber> = Arc::new(mock);
        AudioTranscriber::new(Arc::new(LazyModel::ready("mock", model)))
    }

    #[test]
    fn transcribes_decoded_audio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech.wav");
        write_tone(&path);
        let mock = MockTranscriber::new("mock").with_response("hello there");

        let text = transcriber_with(mock.clone()).transcribe(&path).unwrap();

        assert_eq!(text, "hello there");
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn model_failure_is_model_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech.wav");
        write_tone(&path);

        let err = transcriber_with(MockTranscriber::new("mock").with_failure())
            .transcribe(&path)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelError);
    }

    #[test]
    fn undecodable_audio_never_loads_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"not audio").unwrap();

        let lazy: Arc<LazyModel<dyn Transcriber>> = Arc::new(LazyModel::new("never", || {
            Err(MultisumError::model("loader must not run"))
        }));
        let err = AudioTranscriber::new(Arc::clone(&lazy))
            .transcribe(&path)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ExtractionFailed);
        assert!(!lazy.is_loaded());
    }
}
