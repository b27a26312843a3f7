//! SRT document assembly and parsing.
//!
//! Renders timestamped segments into the SubRip format:
//!
//! ```text
//! 1
//! 00:00:01,200 --> 00:00:03,450
//! caption text
//!
//! 2
//! ...
//! ```
//!
//! Indices are 1-based and contiguous; an empty-text segment still emits an
//! entry. Timestamps truncate to milliseconds (no rounding) so rendered times
//! never run ahead of the audio clock. `parse` is the inverse of `render`
//! modulo that truncation.

use crate::error::{Result, SubgenError};
use std::time::Duration;

/// A speech interval with its recognized text.
///
/// Invariant: `start < end`; segments of one document are ordered and
/// non-overlapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}

impl Segment {
    pub fn new(start: Duration, end: Duration, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Render segments as an SRT document.
///
/// An empty segment list yields an empty document.
pub fn render(segments: &[Segment]) -> String {
    let mut doc = String::new();
    for (i, segment) in segments.iter().enumerate() {
        doc.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_timestamp(segment.start),
            format_timestamp(segment.end),
            segment.text
        ));
    }
    doc
}

/// Concatenate segment texts in order, separated by single spaces.
pub fn flat_transcript(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a duration as `HH:MM:SS,mmm`, truncating sub-millisecond time.
pub fn format_timestamp(time: Duration) -> String {
    let total_ms = time.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Parse an SRT document back into segments.
///
/// Accepts exactly the shape `render` produces: index line, timing line,
/// text lines until a blank line. Caption text may be empty.
pub fn parse(doc: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut lines = doc.lines().peekable();

    while let Some(line) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }
        line.trim().parse::<u32>().map_err(|_| invalid_srt(format!(
            "expected entry index, got {:?}",
            line
        )))?;

        let timing = lines
            .next()
            .ok_or_else(|| invalid_srt("missing timing line".to_string()))?;
        let (start_str, end_str) = timing
            .split_once(" --> ")
            .ok_or_else(|| invalid_srt(format!("bad timing line {:?}", timing)))?;
        let start = parse_timestamp(start_str)?;
        let end = parse_timestamp(end_str)?;

        let mut text_lines: Vec<&str> = Vec::new();
        for text_line in lines.by_ref() {
            if text_line.is_empty() {
                break;
            }
            text_lines.push(text_line);
        }

        segments.push(Segment::new(start, end, text_lines.join("\n")));
    }

    Ok(segments)
}

/// Parse a `HH:MM:SS,mmm` timestamp.
pub fn parse_timestamp(s: &str) -> Result<Duration> {
    let s = s.trim();
    let (clock, millis) = s
        .split_once(',')
        .ok_or_else(|| invalid_srt(format!("bad timestamp {:?}", s)))?;
    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 3 {
        return Err(invalid_srt(format!("bad timestamp {:?}", s)));
    }
    let field = |p: &str| {
        p.parse::<u64>()
            .map_err(|_| invalid_srt(format!("bad timestamp {:?}", s)))
    };
    let hours = field(parts[0])?;
    let minutes = field(parts[1])?;
    let seconds = field(parts[2])?;
    let ms = field(millis)?;
    Ok(Duration::from_millis(
        ((hours * 60 + minutes) * 60 + seconds) * 1000 + ms,
    ))
}

fn invalid_srt(message: String) -> SubgenError {
    SubgenError::Other(format!("Malformed SRT: {}", message))
}
