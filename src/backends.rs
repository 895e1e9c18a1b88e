//! Construction of the shared speech and summarization model handles.

use crate::config::{SttConfig, SummarizerConfig};
use crate::error::{MultisumError, Result};
use crate::models::download::resolve_model_path;
use crate::models::lazy::LazyModel;
use crate::models::summary_catalog::get_summary_model;
use crate::stt::transcriber::Transcriber;
use crate::stt::whisper::{WhisperConfig, WhisperTranscriber};
use crate::summarize::summarizer::Summarizer;
use std::sync::Arc;

/// Lazily loaded Whisper model for the configured `stt.model`.
pub fn transcriber_handle(config: &SttConfig) -> Arc<LazyModel<dyn Transcriber>> {
    let whisper = WhisperConfig {
        model_path: resolve_model_path(&config.model),
        language: config.language.clone(),
        threads: config.threads,
    };

    Arc::new(LazyModel::new(
        format!("whisper/{}", config.model),
        move || -> Result<Arc<dyn Transcriber>> {
            Ok(Arc::new(WhisperTranscriber::new(whisper.clone())?))
        },
    ))
}

/// Lazily loaded summarization model for the configured `summarizer.model`.
///
/// Fails right away when the model name is not in the catalog.
pub fn summarizer_handle(
    config: &SummarizerConfig,
    allow_download: bool,
) -> Result<Arc<LazyModel<dyn Summarizer>>> {
    let info = get_summary_model(&config.model).ok_or_else(|| MultisumError::ConfigInvalidValue {
        key: "summarizer.model".to_string(),
        message: format!(
            "unknown model '{}'. Run 'multisum models summarizers' to see available models.",
            config.model
        ),
    })?;

    #[cfg(feature = "summarizer")]
    let loader = {
        use crate::summarize::candle_t5::{CandleT5Summarizer, GenerationOptions};
        let options = GenerationOptions::from(config);
        move || -> Result<Arc<dyn Summarizer>> {
            Ok(Arc::new(CandleT5Summarizer::load(
                info,
                options.clone(),
                allow_download,
            )?))
        }
    };

    #[cfg(not(feature = "summarizer"))]
    let loader = move || -> Result<Arc<dyn Summarizer>> {
        let _ = allow_download;
        Err(MultisumError::model(
            "Summarizer feature not enabled. Rebuild with --features summarizer",
        ))
    };

    Ok(Arc::new(LazyModel::new(info.name, loader)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcriber_handle_is_lazy() {
        let config = SttConfig {
            model: "definitely-missing".to_string(),
            ..SttConfig::default()
        };
        let handle = transcriber_handle(&config);

        assert!(!handle.is_loaded());
        assert_eq!(handle.name(), "whisper/definitely-missing");
        assert!(matches!(
            handle.get(),
            Err(MultisumError::ModelNotFound { .. })
        ));
    }

    #[test]
    fn unknown_summarizer_is_config_error() {
        let config = SummarizerConfig {
            model: "gpt-17".to_string(),
            ..SummarizerConfig::default()
        };
        match summarizer_handle(&config, false) {
            Err(MultisumError::ConfigInvalidValue { key, .. }) => {
                assert_eq!(key, "summarizer.model")
            }
            other => panic!("Expected ConfigInvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn summarizer_handle_does_not_load_eagerly() {
        let handle = summarizer_handle(&SummarizerConfig::default(), false).unwrap();
        assert!(!handle.is_loaded());
        assert_eq!(handle.name(), "flan-t5-large");
    }
}
