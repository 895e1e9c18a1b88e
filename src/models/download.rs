//! Whisper model download and installation management.
//!
//! Models are fetched from HuggingFace, verified against the catalog SHA-1
//! and stored in the user's cache directory.

use crate::models::catalog::{ModelInfo, list_models};
use std::fs;
use std::path::PathBuf;

#[cfg(feature = "model-download")]
use crate::error::{MultisumError, Result};
#[cfg(feature = "model-download")]
use std::path::Path;

/// Get the directory where models are stored.
///
/// Uses `~/.cache/multisum/models/` on Linux/Unix.
pub fn models_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("multisum")
        .join("models")
}

/// Get the full path for a model file.
///
/// The file may or may not exist on disk.
pub fn model_path(name: &str) -> PathBuf {
    models_dir().join(format!("ggml-{name}.bin"))
}

/// Resolve the configured `stt.model` value to a model file path.
///
/// Absolute paths and anything containing a path separator are used as-is;
/// plain names refer to `ggml-<name>.bin` in the models directory.
pub fn resolve_model_path(model: &str) -> PathBuf {
    let path = PathBuf::from(model);
    if path.is_absolute() || model.contains('/') || model.contains('\\') {
        return path;
    }
    model_path(model.strip_suffix(".bin").map_or(model, |m| {
        m.strip_prefix("ggml-").unwrap_or(m)
    }))
}

/// Check if a model is installed.
pub fn is_model_installed(name: &str) -> bool {
    model_path(name).exists()
}

#[cfg(feature = "model-download")]
async fn download_to_path(info: &ModelInfo, output_path: &Path, progress: bool) -> Result<()> {
    use futures_util::StreamExt;
    use indicatif::{ProgressBar, ProgressStyle};
    use sha1::{Digest, Sha1};
    use std::io::Write;

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            MultisumError::Other(format!("Failed to create models directory: {e}"))
        })?;
    }

    if progress {
        eprintln!("Downloading {} ({} MB)...", info.name, info.size_mb);
    }
    tracing::info!(model = info.name, url = %info.url(), "Downloading Whisper model");

    let response = reqwest::Client::new()
        .get(info.url())
        .send()
        .await
        .map_err(|e| MultisumError::Other(format!("Failed to start download: {e}")))?;

    if !response.status().is_success() {
        return Err(MultisumError::Other(format!(
            "Download failed with status: {}",
            response.status()
        )));
    }

    let pb = if progress {
        let pb = ProgressBar::new(response.content_length().unwrap_or(0));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    // Write to a partial file so an interrupted download never looks installed
    let partial_path = output_path.with_extension("bin.part");
    let mut hasher = Sha1::new();
    let mut stream = response.bytes_stream();
    let mut file = fs::File::create(&partial_path)
        .map_err(|e| MultisumError::Other(format!("Failed to create output file: {e}")))?;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| MultisumError::Other(format!("Failed to read download chunk: {e}")))?;
        file.write_all(&chunk)
            .map_err(|e| MultisumError::Other(format!("Failed to write to file: {e}")))?;
        hasher.update(&chunk);
        if let Some(ref pb) = pb {
            pb.inc(chunk.len() as u64);
        }
    }
    drop(file);

    if let Some(pb) = pb {
        pb.finish_with_message("Downloaded");
    }

    if !info.sha1.is_empty() {
        let calculated = format!("{:x}", hasher.finalize());
        if calculated != info.sha1 {
            if let Err(e) = fs::remove_file(&partial_path) {
                tracing::warn!(error = %e, "Failed to remove corrupted download");
            }
            return Err(MultisumError::Other(format!(
                "SHA-1 checksum mismatch. Expected: {}, got: {calculated}",
                info.sha1
            )));
        }
        tracing::debug!(model = info.name, "Checksum verified");
    }

    fs::rename(&partial_path, output_path)?;

    if progress {
        eprintln!("Model installed to: {}", output_path.display());
    }

    Ok(())
}

/// Download a Whisper model from the catalog.
///
/// Returns the installed path; an already installed model is not fetched again.
///
/// # Errors
///
/// Returns an error if:
/// - The model is not in the catalog
/// - The download fails
/// - The SHA-1 checksum doesn't match
/// - The file cannot be written
#[cfg(feature = "model-download")]
pub async fn download_model(name: &str, progress: bool) -> Result<PathBuf> {
    let path = model_path(name);
    if path.exists() {
        tracing::debug!(model = name, path = %path.display(), "Model already installed");
        return Ok(path);
    }

    let info = crate::models::catalog::get_model(name).ok_or_else(|| {
        MultisumError::Other(format!(
            "Model '{name}' not found in catalog.\n\
             Run 'multisum models list' to see available models."
        ))
    })?;

    download_to_path(info, &path, progress).await?;
    Ok(path)
}

/// Find any installed model from the catalog, smallest first.
pub fn find_any_installed_model() -> Option<String> {
    list_models()
        .iter()
        .find(|m| is_model_installed(m.name))
        .map(|m| m.name.to_string())
}

/// List all installed model names by scanning the models directory.
///
/// Discovers every `ggml-*.bin` file, not just catalog models.
pub fn list_installed_models() -> Vec<String> {
    let Ok(entries) = fs::read_dir(models_dir()) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let file_name = entry.file_name();
            let model = file_name
                .to_str()?
                .strip_prefix("ggml-")?
                .strip_suffix(".bin")?
                .to_string();
            entry.path().is_file().then_some(model)
        })
        .collect();

    names.sort();
    names
}

/// Format model information for display.
pub fn format_model_info(model: &ModelInfo) -> String {
    let status = if is_model_installed(model.name) {
        "[installed]"
    } else {
        "[not installed]"
    };
    format!("{:12} {:5} MB   {}", model.name, model.size_mb, status)
}
