//! Speech-to-text backends.

pub mod recognizer;
pub mod whisper;
