//! Default configuration constants for multisum.
//!
//! Shared by the config types, the CLI and the pipeline components so the
//! same values are used everywhere.

/// Sample rate expected by the speech model, in Hz.
pub const SAMPLE_RATE: u32 = 16000;

/// Default Whisper model name.
///
/// "base" (multilingual) matches the fixed-size model the pipeline was
/// designed around and handles any spoken language.
pub const DEFAULT_STT_MODEL: &str = "base";

/// Default language code for transcription.
pub const DEFAULT_LANGUAGE: &str = "auto";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Default summarization model (see `models::summary_catalog`).
pub const DEFAULT_SUMMARY_MODEL: &str = "flan-t5-large";

/// Maximum number of tokens generated for a summary.
pub const MAX_SUMMARY_TOKENS: usize = 150;

/// Minimum number of tokens generated for a summary.
///
/// End-of-sequence is suppressed until this many tokens exist.
pub const MIN_SUMMARY_TOKENS: usize = 30;

/// Task prefix prepended to the input text for T5-family models.
pub const SUMMARY_PREFIX: &str = "summarize: ";

/// Separator inserted between the texts of consecutive PDF pages.
pub const PAGE_SEPARATOR: &str = "\n";

/// Name of the staging directory created under the system temp dir.
pub const STAGING_DIR_NAME: &str = "multisum";

/// Default ffmpeg executable used to demux video.
pub const FFMPEG: &str = "ffmpeg";

/// Default ffprobe executable used to look for audio streams.
pub const FFPROBE: &str = "ffprobe";

/// Report the GPU backend compiled into this build.
///
/// Returns a human-readable name based on the compile-time feature flags.
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else if cfg!(feature = "openblas") {
        "OpenBLAS"
    } else {
        "CPU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_backend_matches_compiled_feature() {
        let expected = if cfg!(feature = "cuda") {
            "CUDA"
        } else if cfg!(feature = "vulkan") {
            "Vulkan"
        } else if cfg!(feature = "openblas") {
            "OpenBLAS"
        } else {
            "CPU"
        };
        assert_eq!(gpu_backend(), expected);
    }

    #[test]
    fn summary_token_bounds_are_ordered() {
        assert!(MIN_SUMMARY_TOKENS < MAX_SUMMARY_TOKENS);
    }
}
