//! Media decoding front end.
//!
//! Turns any supported audio or video file into 16kHz mono PCM. WAV files
//! are decoded in-process; everything else is extracted by ffmpeg with raw
//! PCM streamed over stdout, so no intermediate file is written.

use crate::audio::wav;
use crate::defaults::{MUX_TOOL, SAMPLE_RATE};
use crate::error::{Result, SubgenError};
use crate::exec::{CommandExecutor, SystemCommandExecutor};
use log::debug;
use std::path::Path;

/// Decodes media files to pipeline-ready samples.
pub struct MediaDecoder<E: CommandExecutor> {
    executor: E,
}

impl<E: CommandExecutor> MediaDecoder<E> {
    /// Create a new MediaDecoder with the given executor.
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Decode a media file to 16kHz mono 16-bit PCM.
    pub fn read_samples(&self, path: &Path) -> Result<Vec<i16>> {
        let is_wav = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));

        if is_wav {
            debug!("Decoding {} with the built-in WAV reader", path.display());
            return wav::read_file(path);
        }

        self.extract_with_ffmpeg(path)
    }

    fn extract_with_ffmpeg(&self, path: &Path) -> Result<Vec<i16>> {
        let input = path.to_string_lossy();
        let rate = SAMPLE_RATE.to_string();
        debug!("Extracting audio from {} via {}", path.display(), MUX_TOOL);

        let output = self.executor.execute(
            MUX_TOOL,
            &[
                "-hide_banner",
                "-nostdin",
                "-i",
                input.as_ref(),
                "-vn",
                "-f",
                "s16le",
                "-ac",
                "1",
                "-ar",
                rate.as_str(),
                "-",
            ],
        )?;

        if !output.success {
            return Err(SubgenError::AudioDecode {
                message: format!("{} could not read {}: {}", MUX_TOOL, path.display(), output.stderr),
            });
        }

        Ok(pcm_from_le_bytes(&output.stdout))
    }
}

impl MediaDecoder<SystemCommandExecutor> {
    /// Create a MediaDecoder with the system command executor.
    pub fn system() -> Self {
        Self::new(SystemCommandExecutor::new())
    }
}

/// Interpret raw little-endian s16 bytes as samples. A trailing odd byte
/// (truncated stream) is dropped.
fn pcm_from_le_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}
