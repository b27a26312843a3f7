//! Speech segmentation.
//!
//! Splits a decoded recording into ordered, non-overlapping speech regions
//! using RMS-based energy thresholding with a silence-gap hangover. Each call
//! runs over the full buffer with fresh state, so nothing leaks between files.

use crate::defaults;
use std::time::Duration;

/// A detected speech region, in sample indices into the analyzed buffer.
///
/// Invariant: `start < end`; spans returned from one segmentation pass are
/// ordered and non-overlapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechSpan {
    pub start: usize,
    pub end: usize,
}

impl SpeechSpan {
    /// Start of the span as a duration from the beginning of the recording.
    pub fn start_time(&self, sample_rate: u32) -> Duration {
        samples_to_duration(self.start, sample_rate)
    }

    /// End of the span as a duration from the beginning of the recording.
    pub fn end_time(&self, sample_rate: u32) -> Duration {
        samples_to_duration(self.end, sample_rate)
    }
}

fn samples_to_duration(samples: usize, sample_rate: u32) -> Duration {
    Duration::from_nanos((samples as u64) * 1_000_000_000 / sample_rate as u64)
}

/// Trait for speech segmentation engines.
///
/// Allows swapping implementations (energy-based vs mock).
pub trait SpeechSegmenter: Send + Sync {
    /// Detect speech regions in 16-bit PCM audio.
    ///
    /// Returns ordered, non-overlapping spans within `[0, samples.len()]`.
    /// An empty result means no speech was detected and is not an error.
    fn segment(&self, samples: &[i16], sample_rate: u32) -> Vec<SpeechSpan>;
}

/// Configuration for the energy-based segmenter.
#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    /// RMS threshold for detecting speech (0.0 to 1.0).
    pub speech_threshold: f32,
    /// Silence duration that closes a speech region (milliseconds).
    pub silence_gap_ms: u32,
    /// Minimum duration of a region before padding (milliseconds).
    pub min_speech_ms: u32,
    /// Padding prepended to each region (milliseconds).
    pub pre_speech_ms: u32,
    /// Padding appended to each region (milliseconds).
    pub post_speech_ms: u32,
    /// Analysis frame length (milliseconds).
    pub frame_ms: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            speech_threshold: defaults::SPEECH_THRESHOLD,
            silence_gap_ms: defaults::SILENCE_GAP_MS,
            min_speech_ms: defaults::MIN_SPEECH_MS,
            pre_speech_ms: defaults::PRE_SPEECH_MS,
            post_speech_ms: defaults::POST_SPEECH_MS,
            frame_ms: defaults::SEGMENTER_FRAME_MS,
        }
    }
}

/// Energy-based speech segmenter.
#[derive(Debug, Clone, Default)]
pub struct EnergySegmenter {
    config: SegmenterConfig,
}

impl EnergySegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    fn ms_to_samples(&self, ms: u32, sample_rate: u32) -> usize {
        (ms as u64 * sample_rate as u64 / 1000) as usize
    }
}

impl SpeechSegmenter for EnergySegmenter {
    fn segment(&self, samples: &[i16], sample_rate: u32) -> Vec<SpeechSpan> {
        let frame_len = self.ms_to_samples(self.config.frame_ms, sample_rate).max(1);
        let silence_gap = self.ms_to_samples(self.config.silence_gap_ms, sample_rate);
        let min_speech = self.ms_to_samples(self.config.min_speech_ms, sample_rate);
        let pre_pad = self.ms_to_samples(self.config.pre_speech_ms, sample_rate);
        let post_pad = self.ms_to_samples(self.config.post_speech_ms, sample_rate);

        // First pass: raw voiced regions, closed after a long enough gap.
        let mut raw: Vec<SpeechSpan> = Vec::new();
        let mut region_start: Option<usize> = None;
        let mut last_voiced_end = 0usize;

        let mut offset = 0usize;
        while offset < samples.len() {
            let frame_end = (offset + frame_len).min(samples.len());
            let voiced = calculate_rms(&samples[offset..frame_end]) > self.config.speech_threshold;

            if voiced {
                if region_start.is_none() {
                    region_start = Some(offset);
                }
                last_voiced_end = frame_end;
            } else if let Some(start) = region_start {
                if frame_end.saturating_sub(last_voiced_end) >= silence_gap {
                    raw.push(SpeechSpan {
                        start,
                        end: last_voiced_end,
                    });
                    region_start = None;
                }
            }

            offset = frame_end;
        }
        if let Some(start) = region_start {
            raw.push(SpeechSpan {
                start,
                end: last_voiced_end,
            });
        }

        // Second pass: drop too-short regions, pad, and keep spans disjoint.
        let mut spans: Vec<SpeechSpan> = Vec::with_capacity(raw.len());
        for region in raw {
            if region.end - region.start < min_speech {
                continue;
            }
            let mut start = region.start.saturating_sub(pre_pad);
            let end = (region.end + post_pad).min(samples.len());
            if let Some(prev) = spans.last() {
                start = start.max(prev.end);
            }
            if start < end {
                spans.push(SpeechSpan { start, end });
            }
        }
        spans
    }
}

/// Calculates the Root Mean Square (RMS) of audio samples.
///
/// Returns a normalized value in 0.0 to 1.0, where 0.0 is silence and
/// ~0.707 is a full-scale sine wave.
pub fn calculate_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let normalized = sample as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    mean_square.sqrt() as f32
}

/// Segmenter returning a fixed span list, for tests.
#[derive(Debug, Clone, Default)]
pub struct MockSegmenter {
    spans: Vec<SpeechSpan>,
}

impl MockSegmenter {
    pub fn new(spans: Vec<SpeechSpan>) -> Self {
        Self { spans }
    }
}

impl SpeechSegmenter for MockSegmenter {
    fn segment(&self, samples: &[i16], _sample_rate: u32) -> Vec<SpeechSpan> {
        // Clamp to the buffer so callers can index with the result.
        self.spans
            .iter()
            .filter_map(|span| {
                let end = span.end.min(samples.len());
                (span.start < end).then_some(SpeechSpan {
                    start: span.start,
                    end,
                })
            })
            .collect()
    }
}
