//! Whisper-based speech recognition.
//!
//! Provides a Whisper implementation of the Recognizer trait using whisper-rs,
//! plus the factory that builds whisper-family models from catalog descriptors.
//!
//! # Feature Gate
//!
//! Real inference requires the `whisper` feature (and cmake to build). Without
//! it a stub is compiled that reports the missing feature at recognize time.

use crate::catalog::{ModelDescriptor, ModelFamily};
use crate::error::{Result, SubgenError};
use crate::stt::recognizer::{Recognizer, RecognizerFactory};
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(feature = "whisper")]
use std::sync::{Mutex, Once};
#[cfg(feature = "whisper")]
use whisper_rs::{
    install_logging_hooks, FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters,
};

#[cfg(feature = "whisper")]
static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Language value that lets Whisper detect the spoken language.
pub const AUTO_LANGUAGE: &str = "auto";

/// Configuration for a Whisper recognizer.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Path to the ggml model file
    pub model_path: PathBuf,
    /// Language code (e.g., "en", "zh") or "auto"
    pub language: String,
    /// Number of threads for inference (None = auto-detect)
    pub threads: Option<usize>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            language: AUTO_LANGUAGE.to_string(),
            threads: None,
        }
    }
}

/// Whisper-based recognizer.
///
/// The WhisperContext is wrapped in a Mutex: inference on one model is
/// serialized while different models may run in parallel.
#[cfg(feature = "whisper")]
pub struct WhisperRecognizer {
    context: Mutex<WhisperContext>,
    config: WhisperConfig,
    model_id: String,
}

#[cfg(feature = "whisper")]
impl std::fmt::Debug for WhisperRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperRecognizer")
            .field("config", &self.config)
            .field("model_id", &self.model_id)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

/// Whisper recognizer placeholder (without the whisper feature).
#[cfg(not(feature = "whisper"))]
#[derive(Debug)]
pub struct WhisperRecognizer {
    config: WhisperConfig,
    model_id: String,
}

impl WhisperRecognizer {
    fn check_model(config: &WhisperConfig) -> Result<String> {
        if !config.model_path.exists() {
            return Err(SubgenError::ModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }
        Ok(config
            .model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string())
    }

    /// Convert i16 audio samples to f32 normalized to [-1.0, 1.0].
    ///
    /// Whisper expects f32 audio; input is 16-bit PCM.
    pub fn convert_audio(samples: &[i16]) -> Vec<f32> {
        samples
            .iter()
            .map(|&sample| sample as f32 / 32768.0)
            .collect()
    }

    /// Get the configuration
    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }
}

#[cfg(feature = "whisper")]
impl WhisperRecognizer {
    /// Create a new Whisper recognizer.
    ///
    /// # Errors
    /// Returns `SubgenError::ModelNotFound` if the model file doesn't exist
    /// and `SubgenError::Recognition` if model loading fails.
    pub fn new(config: WhisperConfig) -> Result<Self> {
        // Install logging hooks to suppress whisper.cpp output (only once)
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        let model_id = Self::check_model(&config)?;

        let context_params = WhisperContextParameters::default();
        let context = WhisperContext::new_with_params(
            config
                .model_path
                .to_str()
                .ok_or_else(|| SubgenError::Recognition {
                    message: "Invalid UTF-8 in model path".to_string(),
                })?,
            context_params,
        )
        .map_err(|e| SubgenError::Recognition {
            message: format!("Failed to load Whisper model: {}", e),
        })?;

        Ok(Self {
            context: Mutex::new(context),
            config,
            model_id,
        })
    }
}

#[cfg(not(feature = "whisper"))]
impl WhisperRecognizer {
    /// Create a new Whisper recognizer (stub implementation).
    pub fn new(config: WhisperConfig) -> Result<Self> {
        let model_id = Self::check_model(&config)?;
        Ok(Self { config, model_id })
    }
}

#[cfg(feature = "whisper")]
impl Recognizer for WhisperRecognizer {
    fn recognize(&self, audio: &[i16]) -> Result<String> {
        let audio_f32 = Self::convert_audio(audio);

        let context = self.context.lock().map_err(|e| SubgenError::Recognition {
            message: format!("Failed to acquire context lock: {}", e),
        })?;

        let mut state = context.create_state().map_err(|e| SubgenError::Recognition {
            message: format!("Failed to create Whisper state: {}", e),
        })?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        if self.config.language == AUTO_LANGUAGE {
            params.set_language(None);
        } else {
            params.set_language(Some(&self.config.language));
        }

        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }

        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &audio_f32)
            .map_err(|e| SubgenError::Recognition {
                message: format!("Whisper inference failed: {}", e),
            })?;

        let mut text = String::new();
        for segment in state.as_iter() {
            text.push_str(&segment.to_string());
        }

        Ok(text.trim().to_string())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(not(feature = "whisper"))]
impl Recognizer for WhisperRecognizer {
    fn recognize(&self, _audio: &[i16]) -> Result<String> {
        Err(SubgenError::Recognition {
            message: concat!(
                "Whisper feature not enabled. This binary was built without speech recognition.\n",
                "To fix: cargo build --features whisper\n",
                "If the build fails with cmake errors, install: sudo apt install cmake"
            )
            .to_string(),
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn is_ready(&self) -> bool {
        false
    }
}

/// Factory building whisper-family recognizers from catalog descriptors.
///
/// Selecting a model family with no registered backend fails here, at
/// resolve time, rather than deep inside the pipeline.
#[derive(Debug, Clone)]
pub struct WhisperRecognizerFactory {
    models_dir: PathBuf,
    language: String,
    threads: Option<usize>,
}

impl WhisperRecognizerFactory {
    pub fn new(models_dir: PathBuf, language: String, threads: Option<usize>) -> Self {
        Self {
            models_dir,
            language,
            threads,
        }
    }

    /// Default model cache directory: `~/.cache/subgen/models`.
    pub fn default_models_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("subgen")
            .join("models")
    }

    /// Map a catalog id like `whisper-base.en` to its ggml file name.
    fn model_file(&self, id: &str) -> PathBuf {
        let suffix = id.strip_prefix("whisper-").unwrap_or(id);
        self.models_dir.join(format!("ggml-{}.bin", suffix))
    }
}

impl Default for WhisperRecognizerFactory {
    fn default() -> Self {
        Self::new(Self::default_models_dir(), AUTO_LANGUAGE.to_string(), None)
    }
}

impl RecognizerFactory for WhisperRecognizerFactory {
    fn create(&self, model: &ModelDescriptor) -> Result<Arc<dyn Recognizer>> {
        if model.family != ModelFamily::Whisper {
            return Err(SubgenError::Recognition {
                message: format!(
                    "No backend is compiled in for model {} ({:?} family); \
                     select a whisper-* model",
                    model.id, model.family
                ),
            });
        }

        let config = WhisperConfig {
            model_path: self.model_file(&model.id),
            language: self.language.clone(),
            threads: self.threads,
        };
        Ok(Arc::new(WhisperRecognizer::new(config)?))
    }
}
