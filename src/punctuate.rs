//! Punctuation restoration for raw recognizer output.
//!
//! Transducer-style acoustic models emit lowercase text without punctuation.
//! The `PunctuationRestorer` trait is the seam for restoring it; the shipped
//! implementation is rule-based and deterministic. A model-backed restorer
//! can implement the same trait.

use crate::error::Result;

/// Trait for post-ASR punctuation restoration.
///
/// Implementations must be pure: identical input text yields identical
/// output, with no knowledge of segment boundaries.
pub trait PunctuationRestorer: Send + Sync {
    /// Restore punctuation and casing in recognized text.
    fn restore(&self, text: &str) -> Result<String>;

    /// Return the name of this restorer for logging.
    fn name(&self) -> &str;
}

/// Passthrough restorer that returns the text unchanged.
///
/// Used when punctuation restoration is disabled or forced off for a model
/// family that already emits punctuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPunctuator;

impl PunctuationRestorer for NoopPunctuator {
    fn restore(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// Rule-based punctuation restorer.
///
/// Uppercases the first letter of the text and of each sentence following
/// terminal punctuation, and appends a final period when the text ends
/// without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct RulePunctuator;

impl PunctuationRestorer for RulePunctuator {
    fn restore(&self, text: &str) -> Result<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(String::new());
        }

        let mut out = String::with_capacity(trimmed.len() + 1);
        let mut capitalize_next = true;
        for ch in trimmed.chars() {
            if capitalize_next && ch.is_alphabetic() {
                out.extend(ch.to_uppercase());
                capitalize_next = false;
            } else {
                out.push(ch);
                if matches!(ch, '.' | '!' | '?' | '。' | '！' | '？') {
                    capitalize_next = true;
                }
            }
        }

        if !out.ends_with(['.', '!', '?', ',', ';', ':', '。', '！', '？']) {
            out.push('.');
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "rule-based"
    }
}
