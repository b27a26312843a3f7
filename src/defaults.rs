//! Default configuration constants for subgen.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Audio sample rate in Hz that the whole pipeline operates at.
///
/// 16kHz is the standard for speech recognition; every decoded input is
/// downmixed to mono and resampled to this rate before segmentation.
pub const SAMPLE_RATE: u32 = 16000;

/// Default energy threshold for the speech segmenter.
///
/// RMS-based threshold (0.0 to 1.0) above which a frame counts as speech.
/// 0.02 is tuned for typical recorded speech levels while rejecting room noise.
pub const SPEECH_THRESHOLD: f32 = 0.02;

/// Silence gap in milliseconds that closes a speech region.
///
/// A pause shorter than this stays inside one subtitle segment; a longer one
/// ends the segment.
pub const SILENCE_GAP_MS: u32 = 500;

/// Minimum speech duration in milliseconds for a region to be kept.
///
/// Regions shorter than this are treated as clicks/noise and discarded.
pub const MIN_SPEECH_MS: u32 = 200;

/// Padding in milliseconds prepended to each detected speech region.
///
/// Captures soft onsets (plosives, fricatives) that occur before the energy
/// crosses the threshold.
pub const PRE_SPEECH_MS: u32 = 150;

/// Padding in milliseconds appended to each detected speech region.
///
/// Ensures word endings are not clipped when the silence gap is short.
pub const POST_SPEECH_MS: u32 = 150;

/// Frame length in milliseconds used for energy analysis.
pub const SEGMENTER_FRAME_MS: u32 = 30;

/// Default language key into the model catalog.
pub const DEFAULT_LANGUAGE: &str = "English";

/// File extension of the generated subtitle document.
pub const SRT_EXTENSION: &str = "srt";

/// External tool used for media probing.
pub const PROBE_TOOL: &str = "ffprobe";

/// External tool used for audio extraction and subtitle muxing.
pub const MUX_TOOL: &str = "ffmpeg";

/// Fixed staged filename for the video input of the mux workflow.
///
/// The mux gateway copies caller-supplied files to fixed names inside the
/// staging directory so that the argument vector handed to the external tool
/// never contains caller-controlled path strings.
pub const STAGED_VIDEO_NAME: &str = "uploaded_video.mp4";

/// Fixed staged filename for the subtitle input of the mux workflow.
pub const STAGED_SUBTITLE_NAME: &str = "uploaded_subtitles.srt";

/// Fixed filename of the muxed output video inside the staging directory.
pub const STAGED_OUTPUT_NAME: &str = "output_video.mp4";
