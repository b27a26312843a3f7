//! subgen - Offline subtitle generation for audio and video files
//!
//! Transcribes a media file into time-aligned SRT subtitles plus a flat
//! transcript, and can burn a subtitle file back into a video via ffmpeg.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod exec;
pub mod media;
pub mod mux;
pub mod pipeline;
pub mod punctuate;
pub mod segmenter;
pub mod srt;
pub mod stt;

// Core traits (decode → segment → recognize → assemble)
pub use exec::{CommandExecutor, SystemCommandExecutor};
pub use punctuate::PunctuationRestorer;
pub use segmenter::SpeechSegmenter;
pub use stt::recognizer::{Recognizer, RecognizerFactory};

// Pipeline
pub use pipeline::{TranscribeRequest, TranscriptResult, TranscriptionPipeline};

// Muxing
pub use mux::{MuxResult, MuxingGateway};

// Error handling
pub use error::{Result, SubgenError};

// Config and catalog
pub use catalog::LanguageModelCatalog;
pub use config::Config;
