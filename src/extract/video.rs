//! Audio track extraction from video containers via ffprobe and ffmpeg.

use crate::config::{AudioFormat, VideoConfig};
use crate::error::{MultisumError, Result};
use crate::extract::command::CommandExecutor;
use crate::staging::{StagedFile, StagingArea};
use crate::types::Modality;
use std::path::Path;
use std::sync::Arc;

/// Temporary audio track pulled out of a video.
///
/// The file is deleted when the value is closed or dropped.
#[derive(Debug)]
pub struct TempAudio {
    file: StagedFile,
    format: AudioFormat,
}

impl TempAudio {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Delete the file now.
    pub fn close(self) {
        self.file.close();
    }
}

fn failure(message: impl Into<String>) -> MultisumError {
    MultisumError::extraction(Modality::Video, message)
}

/// Splits the audio stream out of a video container.
#[derive(Clone)]
pub struct VideoDemuxer {
    executor: Arc<dyn CommandExecutor>,
    config: VideoConfig,
    staging: StagingArea,
}

impl std::fmt::Debug for VideoDemuxer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDemuxer")
            .field("config", &self.config)
            .field("staging", &self.staging)
            .finish()
    }
}

impl VideoDemuxer {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        config: VideoConfig,
        staging: StagingArea,
    ) -> Self {
        Self {
            executor,
            config,
            staging,
        }
    }

    /// Extract the first audio stream of `path` into a temporary file.
    ///
    /// Fails without running ffmpeg when the container has no audio stream.
    pub fn demux(&self, path: &Path) -> Result<TempAudio> {
        let input = path
            .to_str()
            .ok_or_else(|| failure(format!("non UTF-8 path: {}", path.display())))?;

        if !self.has_audio_stream(input)? {
            return Err(failure(format!("{} has no audio track", path.display())));
        }

        let format = self.config.audio_format;
        let file = self.staging.reserve("audio-", format.extension())?;
        let output = file
            .path()
            .to_str()
            .ok_or_else(|| failure("non UTF-8 staging path"))?
            .to_string();

        let mut args: Vec<&str> = vec![
            "-nostdin", "-y", "-v", "error", "-i", input, "-vn", "-map", "0:a:0",
        ];
        args.extend_from_slice(format.ffmpeg_args());
        args.push(&output);

        // `file` is dropped on error, removing the partial output
        self.executor
            .execute(&self.config.ffmpeg, &args)
            .map_err(|e| failure(format!("audio extraction failed: {e}")))?;

        let written = std::fs::metadata(file.path()).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            return Err(failure("ffmpeg produced an empty audio track"));
        }

        tracing::info!(
            format = format.extension(),
            bytes = written,
            path = %file.path().display(),
            "Audio track extracted from video"
        );

        Ok(TempAudio { file, format })
    }

    fn has_audio_stream(&self, input: &str) -> Result<bool> {
        let stdout = self
            .executor
            .execute(
                &self.config.ffprobe,
                &[
                    "-v",
                    "error",
                    "-select_streams",
                    "a",
                    "-show_entries",
                    "stream=codec_type",
                    "-of",
                    "csv=p=0",
                    input,
                ],
            )
            .map_err(|e| failure(format!("cannot probe container: {e}")))?;

        Ok(stdout.lines().any(|line| line.trim() == "audio"))
    }
}
