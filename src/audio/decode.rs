//! Audio file decoding for the transcriber.
//!
//! WAV files go through hound; every other container (MP3, MP4/M4A, ...)
//! is probed and decoded with symphonia. Output is always 16kHz mono PCM.

use crate::audio::wav::{decode_wav, downmix, f32_to_i16, resample};
use crate::defaults::SAMPLE_RATE;
use crate::error::{MultisumError, Result};
use crate::types::Modality;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode an audio file into 16kHz mono samples.
///
/// Fails when the file cannot be opened, has no audio track, or decodes to
/// zero samples.
pub fn decode_file(path: &Path) -> Result<Vec<i16>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let samples = if extension.as_deref() == Some("wav") {
        let file = File::open(path).map_err(|e| open_error(path, e))?;
        decode_wav(BufReader::new(file))?
    } else {
        decode_compressed(path, extension.as_deref())?
    };

    if samples.is_empty() {
        return Err(MultisumError::extraction(
            Modality::Audio,
            format!("no audio samples decoded from {}", path.display()),
        ));
    }

    tracing::debug!(
        samples = samples.len(),
        duration_secs = samples.len() as f32 / SAMPLE_RATE as f32,
        "Audio decoded to 16kHz mono PCM"
    );

    Ok(samples)
}

fn open_error(path: &Path, e: std::io::Error) -> MultisumError {
    MultisumError::extraction(
        Modality::Audio,
        format!("failed to open {}: {e}", path.display()),
    )
}

fn decode_error(context: &str, e: impl std::fmt::Display) -> MultisumError {
    MultisumError::extraction(Modality::Audio, format!("{context}: {e}"))
}

fn decode_compressed(path: &Path, extension: Option<&str>) -> Result<Vec<i16>> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| decode_error("probe", e))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| MultisumError::extraction(Modality::Audio, "no audio track found"))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let source_rate = match codec_params.sample_rate {
        None => return Err(MultisumError::extraction(Modality::Audio, "unknown sample rate")),
        Some(0) => {
            return Err(MultisumError::extraction(Modality::Audio, "invalid sample rate 0"));
        }
        Some(rate) => rate,
    };

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| decode_error("codec", e))?;

    let mut mono: Vec<i16> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(decode_error("packet", e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => return Err(decode_error("decode", e)),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        if num_frames == 0 {
            continue;
        }

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        let pcm: Vec<i16> = sample_buf.samples().iter().map(|&s| f32_to_i16(s)).collect();

        mono.extend(downmix(&pcm, spec.channels.count()));
    }

    Ok(resample(&mono, source_rate, SAMPLE_RATE))
}
