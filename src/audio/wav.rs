//! WAV decoding to 16kHz mono PCM.

use crate::defaults::SAMPLE_RATE;
use crate::error::{MultisumError, Result};
use crate::types::Modality;
use std::io::Read;

/// Decode WAV data from any reader.
///
/// Supports arbitrary sample rates, channel counts and both integer and
/// float sample formats. The result is 16kHz mono 16-bit PCM.
pub fn decode_wav<R: Read>(reader: R) -> Result<Vec<i16>> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| {
        MultisumError::extraction(Modality::Audio, format!("Failed to parse WAV file: {e}"))
    })?;

    let spec = wav_reader.spec();
    if spec.channels == 0 {
        return Err(MultisumError::extraction(Modality::Audio, "WAV file declares zero channels"));
    }
    if spec.sample_rate == 0 {
        return Err(MultisumError::extraction(Modality::Audio, "invalid sample rate 0"));
    }

    let raw_samples: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Int if spec.bits_per_sample <= 16 => wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>(),
        hound::SampleFormat::Int => {
            let shift = spec.bits_per_sample.saturating_sub(16);
            wav_reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> shift) as i16))
                .collect::<std::result::Result<Vec<_>, _>>()
        }
        hound::SampleFormat::Float => wav_reader
            .samples::<f32>()
            .map(|s| s.map(f32_to_i16))
            .collect::<std::result::Result<Vec<_>, _>>(),
    }
    .map_err(|e| {
        MultisumError::extraction(Modality::Audio, format!("Failed to read WAV samples: {e}"))
    })?;

    let mono = downmix(&raw_samples, spec.channels as usize);
    Ok(resample(&mono, spec.sample_rate, SAMPLE_RATE))
}

/// Average interleaved channels into a single channel.
pub(crate) fn downmix(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Convert a normalized float sample to 16-bit PCM.
pub(crate) fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Simple linear interpolation resampling.
///
/// A zero rate on either side yields no samples.
pub(crate) fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == 0 || to_rate == 0 {
        return Vec::new();
    }
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = (source_pos.floor() as usize).min(samples.len() - 1);
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
