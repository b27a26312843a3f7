//! WAV file decoding.
//!
//! Reads a WAV stream of arbitrary sample rate and channel count and returns
//! 16kHz mono PCM, which is what the segmenter and recognizers consume.

use crate::defaults::SAMPLE_RATE;
use crate::error::{Result, SubgenError};
use std::io::Read;
use std::path::Path;

/// Read a WAV file from disk and convert it to 16kHz mono samples.
pub fn read_file(path: &Path) -> Result<Vec<i16>> {
    let file = std::fs::File::open(path).map_err(|e| SubgenError::AudioDecode {
        message: format!("Cannot open {}: {}", path.display(), e),
    })?;
    read_samples(file)
}

/// Read WAV data from any reader and convert it to 16kHz mono samples.
pub fn read_samples<R: Read>(reader: R) -> Result<Vec<i16>> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| SubgenError::AudioDecode {
        message: format!("Failed to parse WAV data: {}", e),
    })?;

    let spec = wav_reader.spec();
    let source_rate = spec.sample_rate;
    let source_channels = spec.channels;

    let raw_samples: Vec<i16> = wav_reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| SubgenError::AudioDecode {
            message: format!("Failed to read WAV samples: {}", e),
        })?;

    let mono = downmix(&raw_samples, source_channels);

    if source_rate == SAMPLE_RATE {
        Ok(mono)
    } else {
        Ok(resample(&mono, source_rate, SAMPLE_RATE))
    }
}

/// Average interleaved channels down to mono.
fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
