//! Recognizer trait, mock implementation, and the per-model instance cache.

use crate::catalog::ModelDescriptor;
use crate::error::{Result, SubgenError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Trait for speech recognition over one audio segment.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait Recognizer: Send + Sync {
    /// Recognize speech in audio samples.
    ///
    /// # Arguments
    /// * `audio` - Audio samples as 16-bit PCM at 16kHz mono
    ///
    /// # Returns
    /// Recognized text (possibly empty for silence) or error
    fn recognize(&self, audio: &[i16]) -> Result<String>;

    /// Get the id of the loaded model
    fn model_id(&self) -> &str;

    /// Check if the recognizer is ready
    fn is_ready(&self) -> bool;
}

/// Implement Recognizer for Arc<T> to allow sharing across invocations.
impl<T: Recognizer> Recognizer for Arc<T> {
    fn recognize(&self, audio: &[i16]) -> Result<String> {
        (**self).recognize(audio)
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Trait for constructing recognizer backends from catalog descriptors.
///
/// Construction is assumed expensive; callers go through `RecognizerCache`
/// so each model id is built at most once per process.
pub trait RecognizerFactory: Send + Sync {
    fn create(&self, model: &ModelDescriptor) -> Result<Arc<dyn Recognizer>>;
}

/// Lazy per-model-id recognizer cache.
///
/// Different model ids can be resolved and used concurrently; the lock is
/// held only around the map, never during inference.
pub struct RecognizerCache {
    factory: Box<dyn RecognizerFactory>,
    cache: Mutex<HashMap<String, Arc<dyn Recognizer>>>,
}

impl RecognizerCache {
    pub fn new(factory: Box<dyn RecognizerFactory>) -> Self {
        Self {
            factory,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached recognizer for a model, constructing it on first use.
    pub fn resolve(&self, model: &ModelDescriptor) -> Result<Arc<dyn Recognizer>> {
        let mut cache = self.cache.lock().map_err(|e| SubgenError::Recognition {
            message: format!("Recognizer cache poisoned: {}", e),
        })?;

        if let Some(recognizer) = cache.get(&model.id) {
            return Ok(Arc::clone(recognizer));
        }

        let recognizer = self.factory.create(model)?;
        cache.insert(model.id.clone(), Arc::clone(&recognizer));
        Ok(recognizer)
    }

    /// Number of constructed backends (for diagnostics and tests).
    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mock recognizer for testing.
///
/// Returns either a fixed response or a scripted sequence of responses, one
/// per call.
#[derive(Debug)]
pub struct MockRecognizer {
    model_id: String,
    response: String,
    script: Mutex<VecDeque<String>>,
    should_fail: bool,
}

impl MockRecognizer {
    /// Create a new mock recognizer with default settings
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            response: "mock recognition".to_string(),
            script: Mutex::new(VecDeque::new()),
            should_fail: false,
        }
    }

    /// Configure the mock to return a specific response on every call
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to return these responses in order, one per call,
    /// falling back to the fixed response when exhausted
    pub fn with_script(self, responses: &[&str]) -> Self {
        {
            let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
            script.extend(responses.iter().map(|r| r.to_string()));
        }
        self
    }

    /// Configure the mock to fail on recognize
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Recognizer for MockRecognizer {
    fn recognize(&self, _audio: &[i16]) -> Result<String> {
        if self.should_fail {
            return Err(SubgenError::Recognition {
                message: "mock recognition failure".to_string(),
            });
        }
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        Ok(script.pop_front().unwrap_or_else(|| self.response.clone()))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}

/// Mock factory handing out prepared recognizers, for testing.
///
/// Records every descriptor it is asked to build so tests can assert the
/// cache constructs each model id exactly once. Clones share state, so a
/// test can keep a handle after moving the factory into a cache.
#[derive(Default, Clone)]
pub struct MockRecognizerFactory {
    prepared: Arc<Mutex<HashMap<String, Arc<dyn Recognizer>>>>,
    created: Arc<Mutex<Vec<String>>>,
    should_fail: bool,
}

impl MockRecognizerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recognizer to hand out for a model id.
    pub fn with_recognizer(self, id: &str, recognizer: Arc<dyn Recognizer>) -> Self {
        {
            let mut prepared = self.prepared.lock().unwrap_or_else(|e| e.into_inner());
            prepared.insert(id.to_string(), recognizer);
        }
        self
    }

    /// Configure the factory to fail on create
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Model ids this factory was asked to build, in order.
    pub fn created_ids(&self) -> Vec<String> {
        self.created
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

impl RecognizerFactory for MockRecognizerFactory {
    fn create(&self, model: &ModelDescriptor) -> Result<Arc<dyn Recognizer>> {
        {
            let mut created = self.created.lock().unwrap_or_else(|e| e.into_inner());
            created.push(model.id.clone());
        }
        if self.should_fail {
            return Err(SubgenError::Recognition {
                message: format!("mock factory failure for {}", model.id),
            });
        }
        let prepared = self.prepared.lock().unwrap_or_else(|e| e.into_inner());
        match prepared.get(&model.id) {
            Some(recognizer) => Ok(Arc::clone(recognizer)),
            None => Ok(Arc::new(MockRecognizer::new(&model.id))),
        }
    }
}
