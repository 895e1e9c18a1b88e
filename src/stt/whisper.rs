//! Whisper speech recognition through whisper.cpp bindings.
//!
//! Without the `whisper` feature the type still exists so the rest of the
//! crate builds, but every transcription fails with a model error.

use crate::defaults;
use crate::error::{MultisumError, Result};
use crate::stt::transcriber::{Transcriber, TranscriptionResult};
use std::path::PathBuf;

#[cfg(feature = "whisper")]
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperState,
};

/// Where to load the model from and how to decode.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    pub model_path: PathBuf,
    /// ISO code such as "en", or "auto" to let Whisper detect it.
    pub language: String,
    /// Inference threads; whisper.cpp picks when unset.
    pub threads: Option<usize>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: crate::models::download::model_path(defaults::DEFAULT_STT_MODEL),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            threads: None,
        }
    }
}

pub struct WhisperTranscriber {
    /// whisper.cpp states are created per call; the context itself is not reentrant.
    #[cfg(feature = "whisper")]
    context: std::sync::Mutex<WhisperContext>,
    config: WhisperConfig,
    model_name: String,
}

impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("model_name", &self.model_name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Scale 16-bit PCM into the [-1.0, 1.0] floats whisper.cpp expects.
pub fn pcm_to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| f32::from(s) / 32768.0).collect()
}

impl WhisperTranscriber {
    /// Load the model at `config.model_path`.
    ///
    /// A missing file is `ModelNotFound`; a file whisper.cpp rejects is a
    /// model error.
    pub fn new(config: WhisperConfig) -> Result<Self> {
        if !config.model_path.is_file() {
            return Err(MultisumError::ModelNotFound {
                path: config.model_path.display().to_string(),
            });
        }

        let model_name = config
            .model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "whisper".to_string());

        #[cfg(feature = "whisper")]
        let context = {
            silence_whisper_cpp();
            tracing::info!(
                model = %model_name,
                path = %config.model_path.display(),
                "Loading Whisper model"
            );

            let path = config
                .model_path
                .to_str()
                .ok_or_else(|| MultisumError::model("Whisper model path is not valid UTF-8"))?;
            let context = WhisperContext::new_with_params(path, WhisperContextParameters::default())
                .map_err(|e| MultisumError::model(format!("Failed to load Whisper model: {e}")))?;
            std::sync::Mutex::new(context)
        };

        Ok(Self {
            #[cfg(feature = "whisper")]
            context,
            config,
            model_name,
        })
    }

    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }

    #[cfg(feature = "whisper")]
    fn params(&self) -> FullParams<'_, '_> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        let language = match self.config.language.as_str() {
            defaults::AUTO_LANGUAGE => None,
            code => Some(code),
        };
        params.set_language(language);
        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params
    }
}

/// Route whisper.cpp's own logging into `tracing` instead of stderr.
#[cfg(feature = "whisper")]
fn silence_whisper_cpp() {
    static HOOKS: std::sync::Once = std::sync::Once::new();
    HOOKS.call_once(whisper_rs::install_logging_hooks);
}

/// Join all segment texts; confidence is the mean of `1 - no_speech_probability`.
#[cfg(feature = "whisper")]
fn collect_segments(state: &WhisperState) -> (String, f32) {
    let (text, confidence_sum, segments) = state.as_iter().fold(
        (String::new(), 0.0_f32, 0u32),
        |(mut text, sum, n), segment| {
            text.push_str(&segment.to_string());
            (text, sum + (1.0 - segment.no_speech_probability()), n + 1)
        },
    );
    let confidence = if segments == 0 {
        0.0
    } else {
        (confidence_sum / segments as f32).clamp(0.0, 1.0)
    };
    (text.trim().to_string(), confidence)
}

impl Transcriber for WhisperTranscriber {
    #[cfg(feature = "whisper")]
    fn transcribe(&self, audio: &[i16]) -> Result<TranscriptionResult> {
        let samples = pcm_to_f32(audio);

        let context = self
            .context
            .lock()
            .map_err(|e| MultisumError::model(format!("Whisper context lock poisoned: {e}")))?;
        let mut state = context
            .create_state()
            .map_err(|e| MultisumError::model(format!("Failed to create Whisper state: {e}")))?;

        state
            .full(self.params(), &samples)
            .map_err(|e| MultisumError::model(format!("Whisper inference failed: {e}")))?;

        let language = whisper_rs::get_lang_str(state.full_lang_id_from_state())
            .unwrap_or_default()
            .to_string();
        let (text, confidence) = collect_segments(&state);

        Ok(TranscriptionResult {
            text,
            language,
            confidence,
        })
    }

    #[cfg(not(feature = "whisper"))]
    fn transcribe(&self, _audio: &[i16]) -> Result<TranscriptionResult> {
        Err(MultisumError::model(
            "multisum was built without the `whisper` feature; rebuild with default features to transcribe audio",
        ))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
