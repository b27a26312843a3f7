//! Error types for subgen.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubgenError {
    // Input validation errors
    #[error("Invalid input file: {message}")]
    InvalidInput { message: String },

    // Catalog errors
    #[error("Unsupported language: {language}")]
    UnsupportedLanguage { language: String },

    #[error("Model {model} is not available for language {language}")]
    UnsupportedModel { language: String, model: String },

    // Recognition errors
    #[error("Recognition model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Recognition failed: {message}")]
    Recognition { message: String },

    // Media decoding errors
    #[error("Failed to decode audio: {message}")]
    AudioDecode { message: String },

    // External tool errors
    #[error("External tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("Muxing failed: {message}")]
    Muxing { message: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SubgenError>;
