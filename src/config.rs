//! Configuration loading.
//!
//! TOML file with defaults for every field, plus SUBGEN_* environment
//! overrides applied on top. The file lives at
//! `~/.config/subgen/config.toml` unless the caller points elsewhere.

use crate::defaults;
use crate::segmenter::SegmenterConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub stt: SttConfig,
    pub segmenter: SegmenterSection,
    pub mux: MuxConfig,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    /// Catalog language name
    pub language: String,
    /// Model id, or None for the language default
    pub model: Option<String>,
    /// Whether punctuation restoration is requested
    pub punctuation: bool,
    /// Directory holding downloaded model files, or None for the cache default
    pub models_dir: Option<PathBuf>,
    /// Inference threads, or None for auto-detect
    pub threads: Option<usize>,
}

/// Speech segmentation tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmenterSection {
    pub speech_threshold: f32,
    pub silence_gap_ms: u32,
    pub min_speech_ms: u32,
    pub pre_speech_ms: u32,
    pub post_speech_ms: u32,
}

/// Muxing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MuxConfig {
    /// Directory where mux inputs and output are staged
    pub staging_dir: PathBuf,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            model: None,
            punctuation: true,
            models_dir: None,
            threads: None,
        }
    }
}

impl Default for SegmenterSection {
    fn default() -> Self {
        Self {
            speech_threshold: defaults::SPEECH_THRESHOLD,
            silence_gap_ms: defaults::SILENCE_GAP_MS,
            min_speech_ms: defaults::MIN_SPEECH_MS,
            pre_speech_ms: defaults::PRE_SPEECH_MS,
            post_speech_ms: defaults::POST_SPEECH_MS,
        }
    }
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("uploads"),
        }
    }
}

impl SegmenterSection {
    /// Translate the file section into the segmenter's runtime config.
    pub fn to_segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            speech_threshold: self.speech_threshold,
            silence_gap_ms: self.silence_gap_ms,
            min_speech_ms: self.min_speech_ms,
            pre_speech_ms: self.pre_speech_ms,
            post_speech_ms: self.post_speech_ms,
            frame_ms: defaults::SEGMENTER_FRAME_MS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file is
    /// missing. Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> crate::error::Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config: Config = toml::from_str(&contents)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SUBGEN_LANGUAGE → stt.language
    /// - SUBGEN_MODEL → stt.model
    /// - SUBGEN_MODELS_DIR → stt.models_dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("SUBGEN_LANGUAGE") {
            if !language.is_empty() {
                self.stt.language = language;
            }
        }

        if let Ok(model) = std::env::var("SUBGEN_MODEL") {
            if !model.is_empty() {
                self.stt.model = Some(model);
            }
        }

        if let Ok(dir) = std::env::var("SUBGEN_MODELS_DIR") {
            if !dir.is_empty() {
                self.stt.models_dir = Some(PathBuf::from(dir));
            }
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/subgen/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("subgen")
            .join("config.toml")
    }
}
