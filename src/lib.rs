//! multisum - Summarize text, PDF, audio and video files
//!
//! Offline-first: Whisper transcribes speech, a quantized Flan-T5 model
//! writes the summary.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod backends;
pub mod config;
pub mod defaults;
pub mod error;
pub mod extract;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod staging;
pub mod stt;
pub mod summarize;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod diagnostics;

// Composition root - needs model downloads and the CLI stack
#[cfg(feature = "cli")]
pub mod app;

// Core seams (extract → summarize)
pub use extract::command::{CommandExecutor, SystemCommandExecutor};
pub use stt::transcriber::Transcriber;
pub use summarize::summarizer::Summarizer;

// Pipeline
pub use pipeline::{Pipeline, get_summary};

// Error handling
pub use error::{MultisumError, Result};

// Config and data model
pub use config::Config;
pub use types::{Modality, SourceFile, Summary};

/// Crate version, suffixed with the git short hash when the build had one.
///
/// `"0.1.0+abc1234"` from a git checkout, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    option_env!("GIT_HASH")
        .filter(|hash| !hash.is_empty())
        .map_or_else(|| version.to_string(), |hash| format!("{version}+{hash}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_package_version() {
        assert!(version_string().starts_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn version_string_suffix_matches_build_environment() {
        let version = version_string();
        match option_env!("GIT_HASH").filter(|h| !h.is_empty()) {
            Some(hash) => {
                assert_eq!(version, format!("{}+{hash}", env!("CARGO_PKG_VERSION")));
                assert_eq!(hash.len(), 7);
            }
            None => assert_eq!(version, env!("CARGO_PKG_VERSION")),
        }
    }
}
