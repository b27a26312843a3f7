//! Language and model catalog.
//!
//! Maps each supported language to an ordered list of recognition models.
//! The first model of a language is its default. The catalog is built once,
//! is read-only afterwards, and is passed into the pipeline as a value so
//! tests can substitute a fake catalog.

use crate::error::{Result, SubgenError};

/// Acoustic model family, derived from the model id when the catalog is built.
///
/// The family decides whether a model already emits punctuation in its output
/// (whisper does) or whether an external punctuation restorer is applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// OpenAI Whisper models. Output is already punctuated and cased.
    Whisper,
    /// Zipformer transducer models. Raw lowercase output without punctuation.
    Zipformer,
    /// Paraformer models. Raw output without punctuation.
    Paraformer,
}

impl ModelFamily {
    /// Classify a model id into a family.
    ///
    /// Anything not recognized as whisper or paraformer is treated as a
    /// transducer-style acoustic model, which does not emit punctuation.
    pub fn from_id(id: &str) -> Self {
        if id.contains("whisper") {
            ModelFamily::Whisper
        } else if id.contains("paraformer") {
            ModelFamily::Paraformer
        } else {
            ModelFamily::Zipformer
        }
    }

    /// Whether models of this family produce punctuated, cased text on their own.
    pub fn emits_punctuation(&self) -> bool {
        matches!(self, ModelFamily::Whisper)
    }
}

/// Metadata for one recognition model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    /// Model identifier (e.g., "whisper-base.en", "zipformer-en-2023-06-26")
    pub id: String,
    /// Model family, resolved once from the id
    pub family: ModelFamily,
    /// Whether an external punctuation restorer may run on this model's output
    pub supports_external_punctuation: bool,
}

impl ModelDescriptor {
    fn new(id: &str) -> Self {
        let family = ModelFamily::from_id(id);
        Self {
            id: id.to_string(),
            family,
            supports_external_punctuation: !family.emits_punctuation(),
        }
    }
}

/// Immutable mapping from language to its ordered list of models.
///
/// Invariant: every language has at least one model; the first entry is the
/// language's default.
#[derive(Debug, Clone)]
pub struct LanguageModelCatalog {
    entries: Vec<(String, Vec<ModelDescriptor>)>,
}

impl LanguageModelCatalog {
    /// Build a catalog from (language, model ids) pairs.
    ///
    /// Returns an error if any language has an empty model list.
    pub fn from_entries(entries: &[(&str, &[&str])]) -> Result<Self> {
        let mut built = Vec::with_capacity(entries.len());
        for (language, ids) in entries {
            if ids.is_empty() {
                return Err(SubgenError::Other(format!(
                    "Catalog language {} has no models",
                    language
                )));
            }
            let models = ids.iter().map(|id| ModelDescriptor::new(id)).collect();
            built.push((language.to_string(), models));
        }
        Ok(Self { entries: built })
    }

    /// The built-in catalog, modeled on the upstream language/model map.
    pub fn builtin() -> Self {
        let entries: &[(&str, &[&str])] = &[
            (
                "English",
                &[
                    "zipformer-en-2023-06-26",
                    "whisper-tiny.en",
                    "whisper-base.en",
                ],
            ),
            (
                "Chinese",
                &["zipformer-zh-2023-05-17", "paraformer-zh-2023-03-28"],
            ),
            ("Chinese+English", &["paraformer-zh-en-2023-02-20"]),
            ("French", &["zipformer-fr-2023-04-14", "whisper-base"]),
            ("German", &["zipformer-de-2023-05-12", "whisper-base"]),
            ("Russian", &["zipformer-ru-2023-09-18", "whisper-base"]),
            ("Japanese", &["zipformer-ja-2023-09-27", "whisper-base"]),
            ("Korean", &["zipformer-ko-2023-10-02", "whisper-base"]),
            ("Spanish", &["whisper-base", "whisper-small"]),
        ];
        // Built-in data always has a model per language.
        Self::from_entries(entries).unwrap_or(Self { entries: Vec::new() })
    }

    /// Supported languages, in catalog order.
    pub fn languages(&self) -> Vec<&str> {
        self.entries.iter().map(|(lang, _)| lang.as_str()).collect()
    }

    /// Ordered model list for a language.
    ///
    /// # Errors
    /// Returns `SubgenError::UnsupportedLanguage` if the language is not in
    /// the catalog.
    pub fn models_for(&self, language: &str) -> Result<&[ModelDescriptor]> {
        self.entries
            .iter()
            .find(|(lang, _)| lang == language)
            .map(|(_, models)| models.as_slice())
            .ok_or_else(|| SubgenError::UnsupportedLanguage {
                language: language.to_string(),
            })
    }

    /// The default model for a language (the first catalog entry).
    pub fn default_model(&self, language: &str) -> Result<&ModelDescriptor> {
        let models = self.models_for(language)?;
        // from_entries guarantees non-empty lists
        models.first().ok_or_else(|| SubgenError::UnsupportedLanguage {
            language: language.to_string(),
        })
    }

    /// Resolve a (language, model) selection.
    ///
    /// `None` selects the language's default model, which is also what a
    /// caller gets after switching language: a model id carried over from
    /// another language is rejected here rather than silently accepted, so a
    /// model can never be paired with an incompatible language.
    pub fn resolve(&self, language: &str, model_id: Option<&str>) -> Result<&ModelDescriptor> {
        let models = self.models_for(language)?;
        match model_id {
            None => self.default_model(language),
            Some(id) => models.iter().find(|m| m.id == id).ok_or_else(|| {
                SubgenError::UnsupportedModel {
                    language: language.to_string(),
                    model: id.to_string(),
                }
            }),
        }
    }
}

impl Default for LanguageModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
