use crate::defaults;
use crate::error::{MultisumError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub stt: SttConfig,
    pub summarizer: SummarizerConfig,
    pub document: DocumentConfig,
    pub video: VideoConfig,
    pub staging: StagingConfig,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model: String,
    pub language: String,
    pub threads: Option<usize>,
}

/// Summarization model configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummarizerConfig {
    pub model: String,
    pub max_tokens: usize,
    pub min_tokens: usize,
    pub prefix: String,
}

/// PDF extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocumentConfig {
    pub page_separator: String,
    pub blank_pages: BlankPagePolicy,
}

/// What to do with a PDF page that yields no text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlankPagePolicy {
    /// Fail the whole extraction.
    #[default]
    Fail,
    /// Leave the page out of the concatenation.
    Skip,
}

/// Video demuxing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VideoConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
    pub audio_format: AudioFormat,
}

/// Format of the intermediate audio track extracted from video.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }

    /// ffmpeg output arguments selecting codec and container.
    pub fn ffmpeg_args(&self) -> &'static [&'static str] {
        match self {
            Self::Mp3 => &["-acodec", "libmp3lame", "-f", "mp3"],
            Self::Wav => &["-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1", "-f", "wav"],
        }
    }
}

/// Staging directory configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StagingConfig {
    pub dir: Option<PathBuf>,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_STT_MODEL.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            threads: None,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_SUMMARY_MODEL.to_string(),
            max_tokens: defaults::MAX_SUMMARY_TOKENS,
            min_tokens: defaults::MIN_SUMMARY_TOKENS,
            prefix: defaults::SUMMARY_PREFIX.to_string(),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            page_separator: defaults::PAGE_SEPARATOR.to_string(),
            blank_pages: BlankPagePolicy::default(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            ffmpeg: defaults::FFMPEG.to_string(),
            ffprobe: defaults::FFPROBE.to_string(),
            audio_format: AudioFormat::default(),
        }
    }
}

impl StagingConfig {
    /// Effective staging directory: configured path or `<tmp>/multisum`.
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(defaults::STAGING_DIR_NAME))
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MultisumError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                MultisumError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist
    ///
    /// Only a missing file falls back to defaults; invalid TOML is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(MultisumError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - MULTISUM_STT_MODEL → stt.model
    /// - MULTISUM_LANGUAGE → stt.language
    /// - MULTISUM_SUMMARY_MODEL → summarizer.model
    /// - MULTISUM_STAGING_DIR → staging.dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("MULTISUM_STT_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(language) = std::env::var("MULTISUM_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(model) = std::env::var("MULTISUM_SUMMARY_MODEL")
            && !model.is_empty()
        {
            self.summarizer.model = model;
        }

        if let Ok(dir) = std::env::var("MULTISUM_STAGING_DIR")
            && !dir.is_empty()
        {
            self.staging.dir = Some(PathBuf::from(dir));
        }

        self
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.summarizer.max_tokens == 0 {
            return Err(MultisumError::ConfigInvalidValue {
                key: "summarizer.max_tokens".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.summarizer.min_tokens > self.summarizer.max_tokens {
            return Err(MultisumError::ConfigInvalidValue {
                key: "summarizer.min_tokens".to_string(),
                message: format!(
                    "{} exceeds summarizer.max_tokens ({})",
                    self.summarizer.min_tokens, self.summarizer.max_tokens
                ),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/multisum/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("multisum")
            .join("config.toml")
    }

    /// Render the effective configuration as TOML.
    pub fn to_display_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MultisumError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Look up a single value by dotted path, e.g. `summarizer.max_tokens`.
    pub fn get_value_by_path(&self, key: &str) -> Result<String> {
        let value = toml::Value::try_from(self).map_err(|e| MultisumError::ConfigParse {
            message: e.to_string(),
        })?;

        let mut current = &value;
        for part in key.split('.') {
            current = current
                .get(part)
                .ok_or_else(|| MultisumError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: "unknown configuration key".to_string(),
                })?;
        }

        Ok(match current {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Commented template with every default spelled out.
    pub fn dump_template() -> String {
        format!(
            r#"# multisum configuration
# Location: {path}

[stt]
# Whisper model (run `multisum models list`)
model = "{stt_model}"
# Language code or "auto"
language = "{language}"
# threads = 4

[summarizer]
# Summarization model (run `multisum models summarizers`)
model = "{summary_model}"
max_tokens = {max_tokens}
min_tokens = {min_tokens}
prefix = "{prefix}"

[document]
# Inserted between consecutive PDF pages
page_separator = "\n"
# "fail" rejects PDFs with text-less pages, "skip" leaves those pages out
blank_pages = "fail"

[video]
ffmpeg = "{ffmpeg}"
ffprobe = "{ffprobe}"
# Intermediate audio track format: "mp3" or "wav"
audio_format = "mp3"

[staging]
# dir = "/tmp/{staging}"
"#,
            path = Self::default_path().display(),
            stt_model = defaults::DEFAULT_STT_MODEL,
            language = defaults::DEFAULT_LANGUAGE,
            summary_model = defaults::DEFAULT_SUMMARY_MODEL,
            max_tokens = defaults::MAX_SUMMARY_TOKENS,
            min_tokens = defaults::MIN_SUMMARY_TOKENS,
            prefix = defaults::SUMMARY_PREFIX,
            ffmpeg = defaults::FFMPEG,
            ffprobe = defaults::FFPROBE,
            staging = defaults::STAGING_DIR_NAME,
        )
    }
}
