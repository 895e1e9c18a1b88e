//! Catalog of quantized Flan-T5 summarization models.

/// Metadata for a summarization model.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryModelInfo {
    /// Short name used in config and CLI (e.g. "flan-t5-large").
    pub name: &'static str,
    /// Human-readable display name.
    pub display_name: &'static str,
    /// Approximate download size in MB.
    pub size_mb: u32,
    /// HuggingFace repository containing the model.
    pub hf_repo: &'static str,
    /// GGUF weights filename within the repository.
    pub hf_filename: &'static str,
    /// JSON config filename within the repository.
    pub config_filename: &'static str,
}

/// Tokenizer filename shared by every Flan-T5 variant.
pub const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// HuggingFace repository for quantized T5 models.
pub const SUMMARY_MODEL_REPO: &str = "lmz/candle-quantized-t5";

/// Available summarization models, ordered by size (smallest first).
pub const SUMMARY_MODELS: &[SummaryModelInfo] = &[
    SummaryModelInfo {
        name: "flan-t5-small",
        display_name: "Flan-T5 Small (64 MB)",
        size_mb: 64,
        hf_repo: SUMMARY_MODEL_REPO,
        hf_filename: "model.gguf",
        config_filename: "config.json",
    },
    SummaryModelInfo {
        name: "flan-t5-base",
        display_name: "Flan-T5 Base (263 MB)",
        size_mb: 263,
        hf_repo: SUMMARY_MODEL_REPO,
        hf_filename: "model-flan-t5-base.gguf",
        config_filename: "config-flan-t5-base.json",
    },
    SummaryModelInfo {
        name: "flan-t5-large",
        display_name: "Flan-T5 Large (852 MB)",
        size_mb: 852,
        hf_repo: SUMMARY_MODEL_REPO,
        hf_filename: "model-flan-t5-large.gguf",
        config_filename: "config-flan-t5-large.json",
    },
];

/// Look up a summarization model by name.
pub fn get_summary_model(name: &str) -> Option<&'static SummaryModelInfo> {
    SUMMARY_MODELS.iter().find(|m| m.name == name)
}

/// List all available summarization models.
pub fn list_summary_models() -> &'static [SummaryModelInfo] {
    SUMMARY_MODELS
}

/// Whether every artifact of `model` is already in the local HuggingFace cache.
#[cfg(feature = "summarizer")]
pub fn is_cached(model: &SummaryModelInfo) -> bool {
    let repo = hf_hub::Cache::from_env().model(model.hf_repo.to_string());
    [model.hf_filename, model.config_filename, TOKENIZER_FILENAME]
        .iter()
        .all(|file| repo.get(file).is_some())
}

#[cfg(not(feature = "summarizer"))]
pub fn is_cached(_model: &SummaryModelInfo) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;

    #[test]
    fn test_default_summary_model_is_in_catalog() {
        let model = get_summary_model(defaults::DEFAULT_SUMMARY_MODEL).unwrap();
        assert_eq!(model.name, "flan-t5-large");
        assert_eq!(model.hf_filename, "model-flan-t5-large.gguf");
        assert_eq!(model.config_filename, "config-flan-t5-large.json");
    }

    #[test]
    fn test_small_model_uses_plain_filenames() {
        let model = get_summary_model("flan-t5-small").unwrap();
        assert_eq!(model.size_mb, 64);
        assert_eq!(model.hf_filename, "model.gguf");
        assert_eq!(model.config_filename, "config.json");
    }

    #[test]
    fn test_get_summary_model_nonexistent() {
        assert!(get_summary_model("lamini-flan-t5-783m").is_none());
    }

    #[test]
    fn test_models_ordered_by_size() {
        for window in list_summary_models().windows(2) {
            assert!(
                window[0].size_mb < window[1].size_mb,
                "{} should come before {}",
                window[0].name,
                window[1].name,
            );
        }
    }

    #[test]
    fn test_all_models_share_repo() {
        for model in SUMMARY_MODELS {
            assert_eq!(model.hf_repo, SUMMARY_MODEL_REPO);
        }
    }
}
