//! Application entry points behind the CLI.
//!
//! Orchestrates one summarization request:
//! stage input → prepare models → run pipeline → clean up

use crate::backends::{summarizer_handle, transcriber_handle};
use crate::config::Config;
use crate::error::{MultisumError, Result};
use crate::extract::command::SystemCommandExecutor;
use crate::models::download::{download_model, find_any_installed_model, resolve_model_path};
use crate::pipeline::Pipeline;
use crate::staging::{StagedFile, StagingArea};
use crate::types::{Modality, SourceFile, Summary};
use std::path::Path;
use std::sync::Arc;

/// Flags shared by every summarizing command.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Suppress status messages
    pub quiet: bool,
    /// Never download missing models
    pub no_download: bool,
}

/// Summarize a file, with the modality given as a tag or detected from its name.
pub async fn summarize_file(
    config: Config,
    path: &Path,
    file_type: Option<&str>,
    options: RunOptions,
) -> Result<Summary> {
    let modality = match file_type {
        Some(tag) => tag.parse()?,
        None => Modality::detect(path)?,
    };

    let staging = StagingArea::new(config.staging.resolved_dir());
    let staged = staging.stage_copy(path)?;
    tracing::debug!(
        source = %path.display(),
        staged = %staged.path().display(),
        %modality,
        "Input staged"
    );

    run_staged(config, staged, modality, options).await
}

/// Summarize text given directly rather than as a file.
pub async fn summarize_text(config: Config, text: &str, options: RunOptions) -> Result<Summary> {
    let staging = StagingArea::new(config.staging.resolved_dir());
    let staged = staging.stage_text(text)?;
    run_staged(config, staged, Modality::Text, options).await
}

async fn run_staged(
    mut config: Config,
    staged: StagedFile,
    modality: Modality,
    options: RunOptions,
) -> Result<Summary> {
    if matches!(modality, Modality::Audio | Modality::Video) {
        prepare_stt_model(&mut config, options.quiet, options.no_download).await?;
    }

    let pipeline = build_pipeline(&config, options.no_download)?;

    // Model inference is CPU-bound and blocking
    tokio::task::spawn_blocking(move || {
        let source = SourceFile::new(staged.path(), modality);
        let result = pipeline.run(&source);
        staged.close();
        result
    })
    .await
    .map_err(|e| MultisumError::Other(format!("Pipeline task failed: {e}")))?
}

/// Wire a pipeline with the real model backends and system tools.
pub fn build_pipeline(config: &Config, no_download: bool) -> Result<Pipeline> {
    Ok(Pipeline::from_config(
        config,
        transcriber_handle(&config.stt),
        summarizer_handle(&config.summarizer, !no_download)?,
        Arc::new(SystemCommandExecutor::new()),
    ))
}

/// Make sure the configured Whisper model is on disk, downloading it if allowed.
///
/// With `no_download` a missing model falls back to any installed catalog model.
pub async fn prepare_stt_model(config: &mut Config, quiet: bool, no_download: bool) -> Result<()> {
    let configured = config.stt.model.clone();

    if resolve_model_path(&configured).exists() {
        return Ok(());
    }

    if no_download {
        let fallback = find_any_installed_model().ok_or_else(|| {
            MultisumError::ModelNotFound {
                path: format!(
                    "{} (not installed and --no-download specified; run: multisum models install {configured})",
                    resolve_model_path(&configured).display()
                ),
            }
        })?;
        if !quiet {
            eprintln!("Model '{configured}' not installed (--no-download). Using '{fallback}'.");
        }
        tracing::warn!(
            configured = %configured,
            fallback = %fallback,
            "Using fallback Whisper model"
        );
        config.stt.model = fallback;
        return Ok(());
    }

    download_model(&configured, !quiet).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_staging(dir: &Path) -> Config {
        let mut config = Config::default();
        config.staging.dir = Some(dir.join("staging"));
        config
    }

    #[tokio::test]
    async fn unknown_tag_fails_before_staging() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_staging(dir.path());

        let err = summarize_file(
            config,
            &dir.path().join("photo.png"),
            Some("image"),
            RunOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MultisumError::UnsupportedModality { .. }));
        assert!(!dir.path().join("staging").exists());
    }

    #[tokio::test]
    async fn undetectable_file_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.zip");
        std::fs::write(&path, b"PK").unwrap();

        let config = config_with_staging(dir.path());
        let err = summarize_file(config, &path, None, RunOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, MultisumError::UnsupportedModality { .. }));
    }

    #[tokio::test]
    async fn extension_outside_upload_list_is_rejected_before_staging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.flac");
        std::fs::write(&path, b"fLaC").unwrap();

        let config = config_with_staging(dir.path());
        let err = summarize_file(config, &path, None, RunOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, MultisumError::UnsupportedModality { .. }));
        assert!(!dir.path().join("staging").exists());
    }

    #[tokio::test]
    async fn empty_text_leaves_no_staged_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_staging(dir.path());
        let options = RunOptions {
            quiet: true,
            no_download: true,
        };

        let err = summarize_text(config, "   ", options).await.unwrap_err();

        assert!(matches!(err, MultisumError::NothingToSummarize { .. }));
        assert!(!dir.path().join("staging").exists());
    }

    #[tokio::test]
    async fn no_download_without_any_model_is_model_not_found() {
        if find_any_installed_model().is_some() {
            eprintln!("Skipping: a Whisper model is installed locally");
            return;
        }
        let mut config = Config::default();
        config.stt.model = "tiny.en".to_string();

        let err = prepare_stt_model(&mut config, true, true).await.unwrap_err();
        assert!(matches!(err, MultisumError::ModelNotFound { .. }));
    }
}
