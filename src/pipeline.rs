//! End-to-end transcription pipeline.
//!
//! Validates the input, resolves the (language, model) selection against the
//! catalog, decodes, segments, recognizes each speech region in order, and
//! assembles the SRT document plus the flat transcript. The subtitle file is
//! written once at the very end, so a failing stage never leaves a partial
//! `.srt` behind.

use crate::catalog::LanguageModelCatalog;
use crate::defaults::{SAMPLE_RATE, SRT_EXTENSION};
use crate::error::{Result, SubgenError};
use crate::exec::CommandExecutor;
use crate::media::MediaDecoder;
use crate::punctuate::PunctuationRestorer;
use crate::segmenter::SpeechSegmenter;
use crate::srt::{self, Segment};
use crate::stt::recognizer::RecognizerCache;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One transcription request.
#[derive(Debug, Clone)]
pub struct TranscribeRequest {
    /// Catalog language name (e.g., "English")
    pub language: String,
    /// Model id within the language, or None for the language default
    pub model: Option<String>,
    /// Whether the caller wants punctuation restoration
    pub punctuation: bool,
    /// Audio or video file to transcribe
    pub input: PathBuf,
}

/// Result of a completed transcription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptResult {
    /// The full SRT document, exactly as written to `srt_path`
    pub srt_document: String,
    /// Segment texts joined with single spaces
    pub flat_text: String,
    /// The input that was transcribed
    pub source_path: PathBuf,
    /// Where the subtitle file was written
    pub srt_path: PathBuf,
    /// Model that produced the text
    pub model_id: String,
    /// Whether the punctuation restorer actually ran.
    ///
    /// False when the caller disabled it or the model family already emits
    /// punctuated text.
    pub punctuation_applied: bool,
}

/// The transcription pipeline with its injected collaborators.
pub struct TranscriptionPipeline<E: CommandExecutor> {
    catalog: LanguageModelCatalog,
    recognizers: RecognizerCache,
    segmenter: Arc<dyn SpeechSegmenter>,
    punctuator: Arc<dyn PunctuationRestorer>,
    decoder: MediaDecoder<E>,
}

impl<E: CommandExecutor> TranscriptionPipeline<E> {
    pub fn new(
        catalog: LanguageModelCatalog,
        recognizers: RecognizerCache,
        segmenter: Arc<dyn SpeechSegmenter>,
        punctuator: Arc<dyn PunctuationRestorer>,
        decoder: MediaDecoder<E>,
    ) -> Self {
        Self {
            catalog,
            recognizers,
            segmenter,
            punctuator,
            decoder,
        }
    }

    /// The catalog this pipeline resolves selections against.
    pub fn catalog(&self) -> &LanguageModelCatalog {
        &self.catalog
    }

    /// Transcribe one file and write its subtitle sibling.
    ///
    /// The subtitle path is the input path with its extension replaced by
    /// `.srt`. No file is written unless every stage succeeds.
    pub fn transcribe(&self, request: &TranscribeRequest) -> Result<TranscriptResult> {
        validate_input(&request.input)?;

        let model = self
            .catalog
            .resolve(&request.language, request.model.as_deref())?
            .clone();

        // Punctuation restoration only applies to model families that emit
        // raw, unpunctuated text.
        let apply_punctuation = request.punctuation && model.supports_external_punctuation;
        if request.punctuation && !apply_punctuation {
            debug!(
                "Model {} already emits punctuation; restorer skipped",
                model.id
            );
        }

        info!(
            "Transcribing {} ({}, model {})",
            request.input.display(),
            request.language,
            model.id
        );

        let recognizer = self.recognizers.resolve(&model)?;
        let samples = self.decoder.read_samples(&request.input)?;
        let spans = self.segmenter.segment(&samples, SAMPLE_RATE);
        debug!(
            "Detected {} speech region(s) in {} samples",
            spans.len(),
            samples.len()
        );

        let mut segments = Vec::with_capacity(spans.len());
        for span in spans {
            let mut text = recognizer.recognize(&samples[span.start..span.end])?;
            if apply_punctuation {
                text = self.punctuator.restore(&text)?;
            }
            segments.push(Segment::new(
                span.start_time(SAMPLE_RATE),
                span.end_time(SAMPLE_RATE),
                text,
            ));
        }

        let srt_document = srt::render(&segments);
        let flat_text = srt::flat_transcript(&segments);
        let srt_path = request.input.with_extension(SRT_EXTENSION);

        // Single write after all stages succeeded.
        std::fs::write(&srt_path, &srt_document)?;
        info!(
            "Wrote {} subtitle entr{} to {}",
            segments.len(),
            if segments.len() == 1 { "y" } else { "ies" },
            srt_path.display()
        );

        Ok(TranscriptResult {
            srt_document,
            flat_text,
            source_path: request.input.clone(),
            srt_path,
            model_id: model.id,
            punctuation_applied: apply_punctuation,
        })
    }
}

/// Reject empty and missing input paths before any work happens.
fn validate_input(input: &Path) -> Result<()> {
    if input.as_os_str().is_empty() {
        return Err(SubgenError::InvalidInput {
            message: "no input file given".to_string(),
        });
    }
    if !input.is_file() {
        return Err(SubgenError::InvalidInput {
            message: format!("{} is not a readable file", input.display()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::MockCommandExecutor;
    use crate::punctuate::RulePunctuator;
    use crate::segmenter::{MockSegmenter, SpeechSpan};
    use crate::stt::recognizer::{MockRecognizer, MockRecognizerFactory};
    use std::time::Duration;

    fn write_wav(path: &Path, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn test_catalog() -> LanguageModelCatalog {
        LanguageModelCatalog::from_entries(&[("English", &["zipformer-test", "whisper-test"])])
            .unwrap()
    }

    fn pipeline_with(
        factory: MockRecognizerFactory,
        spans: Vec<SpeechSpan>,
    ) -> TranscriptionPipeline<MockCommandExecutor> {
        TranscriptionPipeline::new(
            test_catalog(),
            RecognizerCache::new(Box::new(factory)),
            Arc::new(MockSegmenter::new(spans)),
            Arc::new(RulePunctuator),
            MediaDecoder::new(MockCommandExecutor::new()),
        )
    }

    fn request(input: &Path) -> TranscribeRequest {
        TranscribeRequest {
            language: "English".to_string(),
            model: None,
            punctuation: true,
            input: input.to_path_buf(),
        }
    }

    #[test]
    fn transcribes_and_writes_subtitle_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        write_wav(&input, &vec![2000i16; 32000]);

        let factory = MockRecognizerFactory::new().with_recognizer(
            "zipformer-test",
            Arc::new(MockRecognizer::new("zipformer-test").with_script(&["hello world", "again"])),
        );
        let pipeline = pipeline_with(
            factory,
            vec![
                SpeechSpan { start: 0, end: 16000 },
                SpeechSpan {
                    start: 16000,
                    end: 32000,
                },
            ],
        );

        let result = pipeline.transcribe(&request(&input)).unwrap();

        assert_eq!(result.srt_path, dir.path().join("clip.srt"));
        assert_eq!(result.model_id, "zipformer-test");
        assert!(result.punctuation_applied);
        assert_eq!(result.flat_text, "Hello world. Again.");

        let written = std::fs::read_to_string(&result.srt_path).unwrap();
        assert_eq!(written, result.srt_document);
        let parsed = srt::parse(&written).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].start, Duration::ZERO);
        assert_eq!(parsed[0].end, Duration::from_secs(1));
        assert_eq!(parsed[1].text, "Again.");
    }

    #[test]
    fn empty_path_is_invalid_input() {
        let pipeline = pipeline_with(MockRecognizerFactory::new(), vec![]);
        let result = pipeline.transcribe(&request(Path::new("")));
        assert!(matches!(result, Err(SubgenError::InvalidInput { .. })));
    }

    #[test]
    fn missing_file_is_invalid_input_before_catalog_lookup() {
        let pipeline = pipeline_with(MockRecognizerFactory::new(), vec![]);
        // Even with a bogus language the path error must win.
        let result = pipeline.transcribe(&TranscribeRequest {
            language: "Klingon".to_string(),
            model: None,
            punctuation: true,
            input: PathBuf::from("/nonexistent/clip.wav"),
        });
        assert!(matches!(result, Err(SubgenError::InvalidInput { .. })));
    }

    #[test]
    fn unknown_model_fails_before_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        write_wav(&input, &[0i16; 100]);

        let pipeline = pipeline_with(MockRecognizerFactory::new(), vec![]);
        let mut req = request(&input);
        req.model = Some("whisper-base".to_string());
        let result = pipeline.transcribe(&req);
        assert!(matches!(result, Err(SubgenError::UnsupportedModel { .. })));
        assert!(!dir.path().join("clip.srt").exists());
    }

    #[test]
    fn whisper_family_skips_punctuation_restorer() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        write_wav(&input, &vec![2000i16; 16000]);

        let factory = MockRecognizerFactory::new().with_recognizer(
            "whisper-test",
            Arc::new(MockRecognizer::new("whisper-test").with_response("Already punctuated.")),
        );
        let pipeline = pipeline_with(factory, vec![SpeechSpan { start: 0, end: 16000 }]);

        let mut req = request(&input);
        req.model = Some("whisper-test".to_string());
        let result = pipeline.transcribe(&req).unwrap();

        assert!(!result.punctuation_applied);
        assert_eq!(result.flat_text, "Already punctuated.");
    }

    #[test]
    fn punctuation_off_leaves_raw_text() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        write_wav(&input, &vec![2000i16; 16000]);

        let factory = MockRecognizerFactory::new().with_recognizer(
            "zipformer-test",
            Arc::new(MockRecognizer::new("zipformer-test").with_response("raw lowercase")),
        );
        let pipeline = pipeline_with(factory, vec![SpeechSpan { start: 0, end: 16000 }]);

        let mut req = request(&input);
        req.punctuation = false;
        let result = pipeline.transcribe(&req).unwrap();

        assert!(!result.punctuation_applied);
        assert_eq!(result.flat_text, "raw lowercase");
    }

    #[test]
    fn silent_input_yields_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("quiet.wav");
        write_wav(&input, &vec![0i16; 16000]);

        // No spans at all.
        let pipeline = pipeline_with(MockRecognizerFactory::new(), vec![]);
        let result = pipeline.transcribe(&request(&input)).unwrap();

        assert_eq!(result.srt_document, "");
        assert_eq!(result.flat_text, "");
        let written = std::fs::read_to_string(&result.srt_path).unwrap();
        assert_eq!(written, "");
    }

    #[test]
    fn recognition_failure_leaves_no_subtitle_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        write_wav(&input, &vec![2000i16; 16000]);

        let factory = MockRecognizerFactory::new().with_recognizer(
            "zipformer-test",
            Arc::new(MockRecognizer::new("zipformer-test").with_failure()),
        );
        let pipeline = pipeline_with(factory, vec![SpeechSpan { start: 0, end: 16000 }]);

        let result = pipeline.transcribe(&request(&input));
        assert!(matches!(result, Err(SubgenError::Recognition { .. })));
        assert!(
            !dir.path().join("clip.srt").exists(),
            "no partial file on failure"
        );
    }

    #[test]
    fn rerun_overwrites_with_identical_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        write_wav(&input, &vec![2000i16; 16000]);

        let factory = MockRecognizerFactory::new().with_recognizer(
            "zipformer-test",
            Arc::new(MockRecognizer::new("zipformer-test").with_response("stable text")),
        );
        let pipeline = pipeline_with(factory, vec![SpeechSpan { start: 0, end: 16000 }]);

        let first = pipeline.transcribe(&request(&input)).unwrap();
        let second = pipeline.transcribe(&request(&input)).unwrap();
        assert_eq!(first.srt_document, second.srt_document);
        assert_eq!(
            std::fs::read_to_string(&second.srt_path).unwrap(),
            first.srt_document
        );
    }
}
