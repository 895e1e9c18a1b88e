//! System diagnostics and dependency checking.
//!
//! Verifies that the external tools and models each modality needs are in place.

use crate::config::Config;
use crate::defaults;
use crate::error::MultisumError;
use crate::extract::command::CommandExecutor;
use crate::models::download::resolve_model_path;
use crate::models::summary_catalog::{get_summary_model, is_cached};
use owo_colors::OwoColorize;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Available and working
    Ok,
    /// Not found
    NotFound,
    /// Found but has issues
    Warning(String),
}

/// Check if an ffmpeg-style tool runs (`<tool> -version`).
pub fn check_tool(executor: &dyn CommandExecutor, tool: &str) -> CheckResult {
    match executor.execute(tool, &["-version"]) {
        Ok(_) => CheckResult::Ok,
        Err(MultisumError::ToolNotFound { .. }) => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(e.to_string()),
    }
}

/// Check that the configured Whisper model file exists.
pub fn check_stt_model(config: &Config) -> CheckResult {
    if resolve_model_path(&config.stt.model).exists() {
        CheckResult::Ok
    } else {
        CheckResult::NotFound
    }
}

/// Check that the configured summarization model is known and cached.
pub fn check_summary_model(config: &Config) -> CheckResult {
    match get_summary_model(&config.summarizer.model) {
        None => CheckResult::Warning(format!(
            "unknown model '{}'",
            config.summarizer.model
        )),
        Some(info) if is_cached(info) => CheckResult::Ok,
        Some(_) => CheckResult::NotFound,
    }
}

fn print_result(label: &str, result: &CheckResult, hint: &str) -> bool {
    print!("{label}: ");
    match result {
        CheckResult::Ok => {
            println!("{}", "✓ OK".green());
            true
        }
        CheckResult::NotFound => {
            println!("{}", "✗ NOT FOUND".red());
            println!("  {hint}");
            false
        }
        CheckResult::Warning(msg) => {
            println!("{} {msg}", "⚠ WARNING:".yellow());
            false
        }
    }
}

/// Run all dependency checks and print results.
///
/// Returns true when every check passed.
pub fn check_dependencies(config: &Config, executor: &dyn CommandExecutor) -> bool {
    println!("Checking system dependencies...\n");

    let mut all_ok = true;

    all_ok &= print_result(
        &format!("{} (video demuxing)", config.video.ffmpeg),
        &check_tool(executor, &config.video.ffmpeg),
        "Install ffmpeg: sudo apt install ffmpeg",
    );
    all_ok &= print_result(
        &format!("{} (audio stream probing)", config.video.ffprobe),
        &check_tool(executor, &config.video.ffprobe),
        "ffprobe ships with ffmpeg: sudo apt install ffmpeg",
    );
    all_ok &= print_result(
        &format!("Whisper model '{}'", config.stt.model),
        &check_stt_model(config),
        &format!(
            "Run: multisum models install {} (or let the first audio run download it)",
            config.stt.model
        ),
    );
    all_ok &= print_result(
        &format!("Summarization model '{}'", config.summarizer.model),
        &check_summary_model(config),
        "Downloaded from HuggingFace on first use",
    );

    println!();
    println!("Build:");
    println!("  version:    {}", crate::version_string());
    println!("  backend:    {}", defaults::gpu_backend());
    println!("  whisper:    {}", cfg!(feature = "whisper"));
    println!("  summarizer: {}", cfg!(feature = "summarizer"));

    all_ok
}
