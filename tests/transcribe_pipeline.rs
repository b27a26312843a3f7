//! End-to-end tests for the transcription pipeline over real WAV files.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use subgen::catalog::LanguageModelCatalog;
use subgen::exec::MockCommandExecutor;
use subgen::media::MediaDecoder;
use subgen::pipeline::{TranscribeRequest, TranscriptionPipeline};
use subgen::punctuate::RulePunctuator;
use subgen::segmenter::EnergySegmenter;
use subgen::srt;
use subgen::stt::recognizer::{MockRecognizer, MockRecognizerFactory, RecognizerCache};
use subgen::SubgenError;

const RATE: u32 = 16000;

/// Write a mono 16kHz WAV with the given sections of (amplitude, ms).
fn write_wav(path: &Path, sections: &[(i16, u32)]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for &(amplitude, ms) in sections {
        for _ in 0..(ms as usize * 16) {
            writer.write_sample(amplitude).expect("write sample");
        }
    }
    writer.finalize().expect("finalize wav");
}

fn catalog() -> LanguageModelCatalog {
    LanguageModelCatalog::from_entries(&[("English", &["zipformer-e2e", "whisper-e2e"])])
        .expect("catalog")
}

fn pipeline(factory: MockRecognizerFactory) -> TranscriptionPipeline<MockCommandExecutor> {
    TranscriptionPipeline::new(
        catalog(),
        RecognizerCache::new(Box::new(factory)),
        Arc::new(EnergySegmenter::default()),
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
fn two_utterances_produce_two_aligned_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("interview.wav");
    // Two clear utterances with a silence gap well above the segmenter's.
    write_wav(
        &input,
        &[(0, 500), (4000, 900), (0, 1500), (4000, 900), (0, 500)],
    );

    let factory = MockRecognizerFactory::new().with_recognizer(
        "zipformer-e2e",
        Arc::new(
            MockRecognizer::new("zipformer-e2e").with_script(&["good morning", "thanks for coming"]),
        ),
    );
    let result = pipeline(factory).transcribe(&request(&input)).expect("transcribe");

    assert_eq!(result.srt_path, dir.path().join("interview.srt"));
    assert!(result.punctuation_applied);
    assert_eq!(result.flat_text, "Good morning. Thanks for coming.");

    // The written file is the rendered document, bit for bit.
    let written = std::fs::read_to_string(&result.srt_path).expect("read srt");
    assert_eq!(written, result.srt_document);

    // Entries are contiguous from 1, ordered, and inside the recording.
    let segments = srt::parse(&written).expect("parse srt");
    assert_eq!(segments.len(), 2);
    assert!(segments[0].start < segments[0].end);
    assert!(segments[0].end <= segments[1].start);
    assert!(segments[1].end <= Duration::from_millis(4300));
    assert_eq!(segments[0].text, "Good morning.");
    assert_eq!(segments[1].text, "Thanks for coming.");

    let indices: Vec<&str> = written
        .lines()
        .filter(|l| !l.contains("-->") && !l.is_empty() && l.parse::<u32>().is_ok())
        .collect();
    assert_eq!(indices, vec!["1", "2"]);
}

#[test]
fn silent_recording_writes_valid_empty_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("silence.wav");
    write_wav(&input, &[(0, 2000)]);

    let result = pipeline(MockRecognizerFactory::new())
        .transcribe(&request(&input))
        .expect("transcribe");

    assert_eq!(result.srt_document, "");
    assert_eq!(result.flat_text, "");
    let written = std::fs::read_to_string(&result.srt_path).expect("read srt");
    assert!(srt::parse(&written).expect("parse").is_empty());
}

#[test]
fn empty_input_path_fails_without_writing() {
    let result = pipeline(MockRecognizerFactory::new()).transcribe(&TranscribeRequest {
        language: "English".to_string(),
        model: None,
        punctuation: true,
        input: PathBuf::new(),
    });
    assert!(matches!(result, Err(SubgenError::InvalidInput { .. })));
}

#[test]
fn whisper_family_model_disables_external_punctuation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("talk.wav");
    write_wav(&input, &[(4000, 900)]);

    let factory = MockRecognizerFactory::new().with_recognizer(
        "whisper-e2e",
        Arc::new(MockRecognizer::new("whisper-e2e").with_response("Punctuated already, thanks.")),
    );
    let mut req = request(&input);
    req.model = Some("whisper-e2e".to_string());

    let result = pipeline(factory).transcribe(&req).expect("transcribe");
    assert!(!result.punctuation_applied);
    assert_eq!(result.flat_text, "Punctuated already, thanks.");
}

#[test]
fn rerun_is_byte_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("clip.wav");
    write_wav(&input, &[(0, 300), (4000, 700), (0, 300)]);

    let factory = MockRecognizerFactory::new().with_recognizer(
        "zipformer-e2e",
        Arc::new(MockRecognizer::new("zipformer-e2e").with_response("same words every time")),
    );
    let pipeline = pipeline(factory);

    let first = pipeline.transcribe(&request(&input)).expect("first run");
    let second = pipeline.transcribe(&request(&input)).expect("second run");

    assert_eq!(first.srt_document, second.srt_document);
    assert_eq!(
        std::fs::read(&first.srt_path).expect("read"),
        first.srt_document.as_bytes()
    );
}

#[test]
fn recognizer_is_constructed_once_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("clip.wav");
    write_wav(&input, &[(4000, 700)]);

    let factory = MockRecognizerFactory::new();
    let handle = factory.clone();
    let pipeline = pipeline(factory);

    pipeline.transcribe(&request(&input)).expect("first run");
    pipeline.transcribe(&request(&input)).expect("second run");

    assert_eq!(handle.created_ids(), vec!["zipformer-e2e".to_string()]);
}

#[test]
fn unknown_language_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("clip.wav");
    write_wav(&input, &[(0, 100)]);

    let mut req = request(&input);
    req.language = "Klingon".to_string();
    let result = pipeline(MockRecognizerFactory::new()).transcribe(&req);
    assert!(matches!(
        result,
        Err(SubgenError::UnsupportedLanguage { language }) if language == "Klingon"
    ));
    assert!(!dir.path().join("clip.srt").exists());
}
