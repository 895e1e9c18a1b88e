//! Flan-T5 summarizer using candle quantized models.
//!
//! Model artifacts come from the HuggingFace cache, downloaded on first use
//! unless downloads are disabled. Decoding is greedy, so the same input always
//! yields the same summary.

use crate::config::SummarizerConfig;
use crate::error::{MultisumError, Result};
use crate::models::summary_catalog::{SummaryModelInfo, TOKENIZER_FILENAME};
use crate::summarize::decode::select_next_token;
use crate::summarize::summarizer::Summarizer;

use candle_core::{DType, Device, Tensor};
use candle_transformers::models::quantized_t5::{Config as T5Config, T5ForConditionalGeneration};
use candle_transformers::quantized_var_builder::VarBuilder;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Mutex;
use tokenizers::Tokenizer;

/// Decoder start token (pad) for T5.
const T5_PAD_TOKEN: u32 = 0;
/// End-of-sequence token for T5.
const T5_EOS_TOKEN: u32 = 1;

fn model_err<E: Display>(context: &'static str) -> impl FnOnce(E) -> MultisumError {
    move |e| MultisumError::model(format!("{context}: {e}"))
}

/// Generation bounds and task prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: usize,
    pub min_tokens: usize,
    pub prefix: String,
}

impl From<&SummarizerConfig> for GenerationOptions {
    fn from(config: &SummarizerConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            min_tokens: config.min_tokens,
            prefix: config.prefix.clone(),
        }
    }
}

/// Flan-T5 summarizer running quantized inference via candle.
pub struct CandleT5Summarizer {
    model: Mutex<T5ForConditionalGeneration>,
    tokenizer: Tokenizer,
    device: Device,
    options: GenerationOptions,
    model_name: String,
}

impl std::fmt::Debug for CandleT5Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandleT5Summarizer")
            .field("model_name", &self.model_name)
            .field("options", &self.options)
            .finish()
    }
}

fn resolve_artifact(info: &SummaryModelInfo, file: &str, allow_download: bool) -> Result<PathBuf> {
    if allow_download {
        let api = hf_hub::api::sync::Api::new().map_err(model_err("HF Hub API init"))?;
        api.model(info.hf_repo.to_string())
            .get(file)
            .map_err(|e| MultisumError::model(format!("Download {file}: {e}")))
    } else {
        hf_hub::Cache::from_env()
            .model(info.hf_repo.to_string())
            .get(file)
            .ok_or_else(|| MultisumError::ModelNotFound {
                path: format!("{}/{file}", info.hf_repo),
            })
    }
}

impl CandleT5Summarizer {
    /// Load a quantized Flan-T5 model.
    ///
    /// With `allow_download` the artifacts are fetched into the HuggingFace
    /// cache when missing; otherwise only cached artifacts are used.
    pub fn load(
        info: &SummaryModelInfo,
        options: GenerationOptions,
        allow_download: bool,
    ) -> Result<Self> {
        let device = Device::Cpu;

        let model_path = resolve_artifact(info, info.hf_filename, allow_download)?;
        let config_path = resolve_artifact(info, info.config_filename, allow_download)?;
        let tokenizer_path = resolve_artifact(info, TOKENIZER_FILENAME, allow_download)?;

        tracing::info!(
            model = info.name,
            path = %model_path.display(),
            "Loading summarization model"
        );

        let config_bytes = std::fs::read(&config_path).map_err(model_err("Read T5 config"))?;
        let config: T5Config =
            serde_json::from_slice(&config_bytes).map_err(model_err("Parse T5 config"))?;

        let vb = VarBuilder::from_gguf(&model_path, &device).map_err(model_err("Load GGUF model"))?;
        let model =
            T5ForConditionalGeneration::load(vb, &config).map_err(model_err("Init T5 model"))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(model_err("Load tokenizer"))?;

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            device,
            options,
            model_name: info.name.to_string(),
        })
    }

    fn generate(&self, model: &mut T5ForConditionalGeneration, prompt: &str) -> Result<String> {
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(model_err("Tokenize"))?;

        let input_tensor = Tensor::new(encoding.get_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(model_err("Create input tensor"))?;

        let encoder_output = model
            .encode(&input_tensor)
            .map_err(model_err("Encoder forward"))?;

        // Incremental decoding: the KV cache holds every previous step, so
        // each step feeds only the newest token.
        let mut generated: Vec<u32> = Vec::with_capacity(self.options.max_tokens);
        let mut next_input = T5_PAD_TOKEN;

        for _ in 0..self.options.max_tokens {
            let decoder_input = Tensor::new(&[next_input], &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(model_err("Create decoder input"))?;

            let logits = model
                .decode(&decoder_input, &encoder_output)
                .and_then(|l| l.flatten_all())
                .and_then(|l| l.to_dtype(DType::F32))
                .and_then(|l| l.to_vec1::<f32>())
                .map_err(model_err("Decoder forward"))?;

            let token = select_next_token(
                &logits,
                generated.len(),
                self.options.min_tokens,
                T5_EOS_TOKEN,
            )
            .ok_or_else(|| MultisumError::model("Decoder produced no usable logits"))?;

            if token == T5_EOS_TOKEN {
                break;
            }
            generated.push(token);
            next_input = token;
        }

        tracing::debug!(
            input_tokens = encoding.get_ids().len(),
            output_tokens = generated.len(),
            "T5 generation finished"
        );

        self.tokenizer
            .decode(&generated, true)
            .map_err(model_err("Detokenize"))
    }
}

impl Summarizer for CandleT5Summarizer {
    fn summarize(&self, text: &str) -> Result<String> {
        let prompt = format!("{}{}", self.options.prefix, text);

        let mut model = self
            .model
            .lock()
            .map_err(|e| MultisumError::model(format!("Failed to acquire model lock: {e}")))?;
        model.clear_kv_cache();

        let summary = self.generate(&mut model, &prompt)?;
        Ok(summary.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::summary_catalog::get_summary_model;

    #[test]
    fn candle_t5_summarizer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<CandleT5Summarizer>();
    }

    #[test]
    fn generation_options_follow_config() {
        let config = SummarizerConfig::default();
        let options = GenerationOptions::from(&config);
        assert_eq!(options.max_tokens, 150);
        assert_eq!(options.min_tokens, 30);
        assert_eq!(options.prefix, "summarize: ");
    }

    #[test]
    fn offline_load_of_uncached_model_is_model_not_found() {
        let info = get_summary_model("flan-t5-small").unwrap();
        if crate::models::summary_catalog::is_cached(info) {
            eprintln!("Skipping: flan-t5-small is cached locally");
            return;
        }

        let options = GenerationOptions::from(&SummarizerConfig::default());
        match CandleT5Summarizer::load(info, options, false) {
            Err(MultisumError::ModelNotFound { path }) => {
                assert!(path.starts_with("lmz/candle-quantized-t5/"));
            }
            other => panic!("Expected ModelNotFound, got {other:?}"),
        }
    }
}
