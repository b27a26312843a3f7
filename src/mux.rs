//! Subtitle muxing and media probing via the external ffmpeg tools.
//!
//! Caller-supplied files are copied to fixed staged names inside the staging
//! directory before the external tool runs, so the argument vector never
//! carries caller-controlled path strings. The burn-in writes to a temporary
//! name and renames on success; a failed run leaves no new output behind.

use crate::defaults::{
    MUX_TOOL, PROBE_TOOL, STAGED_OUTPUT_NAME, STAGED_SUBTITLE_NAME, STAGED_VIDEO_NAME,
};
use crate::error::{Result, SubgenError};
use crate::exec::{CommandExecutor, SystemCommandExecutor};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// Outcome of one mux invocation.
///
/// Transient: nothing here is persisted beyond the produced output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxResult {
    /// Path of the muxed video (meaningful when `succeeded`)
    pub output_path: PathBuf,
    /// Whether the external tool completed successfully
    pub succeeded: bool,
    /// The tool's captured standard error on failure, empty on success
    pub diagnostic: String,
}

/// Gateway to the external probing/muxing tool.
pub struct MuxingGateway<E: CommandExecutor> {
    executor: E,
    staging_dir: PathBuf,
}

impl<E: CommandExecutor> MuxingGateway<E> {
    /// Create a gateway staging its files under `staging_dir`.
    pub fn new(executor: E, staging_dir: PathBuf) -> Self {
        Self {
            executor,
            staging_dir,
        }
    }

    /// Probe a media file for metadata.
    ///
    /// Best-effort and diagnostic-only: a failing probe is logged and
    /// reported in the returned text, never treated as fatal. ffprobe prints
    /// stream metadata on stderr.
    pub fn probe(&self, path: &Path) -> String {
        let input = path.to_string_lossy();
        match self
            .executor
            .execute(PROBE_TOOL, &["-hide_banner", "-i", input.as_ref()])
        {
            Ok(output) => output.stderr,
            Err(e) => {
                warn!("Probe of {} failed: {}", path.display(), e);
                format!("probe unavailable: {}", e)
            }
        }
    }

    /// Burn a subtitle file into a video.
    ///
    /// Never returns an error: every failure mode ends up as a `MuxResult`
    /// with `succeeded == false` and a human-readable diagnostic.
    pub fn mux(&self, video: &Path, subtitles: &Path) -> MuxResult {
        let output_path = self.staging_dir.join(STAGED_OUTPUT_NAME);
        match self.try_mux(video, subtitles, &output_path) {
            Ok(result) => result,
            Err(e) => {
                error!("Muxing {} failed: {}", video.display(), e);
                MuxResult {
                    output_path,
                    succeeded: false,
                    diagnostic: e.to_string(),
                }
            }
        }
    }

    fn try_mux(&self, video: &Path, subtitles: &Path, output_path: &Path) -> Result<MuxResult> {
        let staged_video = self.stage(video, STAGED_VIDEO_NAME)?;
        let staged_subtitles = self.stage(subtitles, STAGED_SUBTITLE_NAME)?;

        // Write to a temporary name so a failed run never clobbers a
        // previously produced output.
        let tmp_path = output_path.with_extension("mp4.tmp");
        let filter = format!("subtitles={}", staged_subtitles.to_string_lossy());

        info!(
            "Burning subtitles {} into {}",
            staged_subtitles.display(),
            staged_video.display()
        );
        let output = self.executor.execute(
            MUX_TOOL,
            &[
                "-hide_banner",
                "-nostdin",
                "-y",
                "-i",
                staged_video.to_string_lossy().as_ref(),
                "-vf",
                filter.as_str(),
                "-f",
                "mp4",
                tmp_path.to_string_lossy().as_ref(),
            ],
        )?;

        if !output.success {
            let _ = std::fs::remove_file(&tmp_path);
            error!("{} exited non-zero: {}", MUX_TOOL, output.stderr.trim_end());
            return Ok(MuxResult {
                output_path: output_path.to_path_buf(),
                succeeded: false,
                diagnostic: output.stderr,
            });
        }

        std::fs::rename(&tmp_path, output_path)?;
        info!("Wrote muxed video to {}", output_path.display());
        Ok(MuxResult {
            output_path: output_path.to_path_buf(),
            succeeded: true,
            diagnostic: String::new(),
        })
    }

    /// Copy a caller-supplied file to its fixed staged name.
    fn stage(&self, source: &Path, staged_name: &str) -> Result<PathBuf> {
        if !source.is_file() {
            return Err(SubgenError::InvalidInput {
                message: format!("{} does not exist", source.display()),
            });
        }
        std::fs::create_dir_all(&self.staging_dir).map_err(|e| SubgenError::Muxing {
            message: format!(
                "cannot prepare staging directory {}: {}",
                self.staging_dir.display(),
                e
            ),
        })?;
        let staged = self.staging_dir.join(staged_name);
        std::fs::copy(source, &staged).map_err(|e| SubgenError::Muxing {
            message: format!("cannot stage {}: {}", source.display(), e),
        })?;
        Ok(staged)
    }
}

impl MuxingGateway<SystemCommandExecutor> {
    /// Create a gateway with the system command executor.
    pub fn system(staging_dir: PathBuf) -> Self {
        Self::new(SystemCommandExecutor::new(), staging_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::MockCommandExecutor;

    struct Fixture {
        executor: MockCommandExecutor,
        gateway: MuxingGateway<MockCommandExecutor>,
        dir: tempfile::TempDir,
        video: PathBuf,
        subtitles: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("my movie; rm -rf.mp4");
        let subtitles = dir.path().join("subs.srt");
        std::fs::write(&video, b"fake video").unwrap();
        std::fs::write(&subtitles, b"1\n00:00:00,000 --> 00:00:01,000\nhi\n\n").unwrap();

        let executor = MockCommandExecutor::new();
        let gateway = MuxingGateway::new(executor.clone(), dir.path().join("staging"));
        Fixture {
            executor,
            gateway,
            dir,
            video,
            subtitles,
        }
    }

    #[test]
    fn mux_success_stages_and_renames_output() {
        let f = fixture();
        let staging = f.dir.path().join("staging");
        // Simulate ffmpeg writing the temporary output before exiting zero.
        std::fs::create_dir_all(&staging).unwrap();
        std::fs::write(staging.join("output_video.mp4.tmp"), b"muxed").unwrap();
        f.executor.push_success(b"");

        let result = f.gateway.mux(&f.video, &f.subtitles);

        assert!(result.succeeded);
        assert!(result.diagnostic.is_empty());
        assert_eq!(result.output_path, staging.join("output_video.mp4"));
        assert!(result.output_path.is_file());
        // Caller files were copied to fixed names.
        assert!(staging.join("uploaded_video.mp4").is_file());
        assert!(staging.join("uploaded_subtitles.srt").is_file());
    }

    #[test]
    fn mux_passes_only_staged_paths_to_the_tool() {
        let f = fixture();
        let staging = f.dir.path().join("staging");
        std::fs::create_dir_all(&staging).unwrap();
        std::fs::write(staging.join("output_video.mp4.tmp"), b"muxed").unwrap();
        f.executor.push_success(b"");

        f.gateway.mux(&f.video, &f.subtitles);

        let calls = f.executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "ffmpeg");
        // The caller-chosen filename (with shell metacharacters) never
        // reaches the argument vector.
        assert!(calls[0].1.iter().all(|arg| !arg.contains("rm -rf")));
        assert!(calls[0]
            .1
            .iter()
            .any(|arg| arg.ends_with("uploaded_video.mp4")));
    }

    #[test]
    fn mux_failure_surfaces_stderr_verbatim() {
        let f = fixture();
        f.executor
            .push_failure("Error initializing filter 'subtitles'\n");

        let result = f.gateway.mux(&f.video, &f.subtitles);

        assert!(!result.succeeded);
        assert_eq!(result.diagnostic, "Error initializing filter 'subtitles'\n");
        assert!(!result.output_path.exists(), "no output on failure");
    }

    #[test]
    fn mux_failure_preserves_previous_output() {
        let f = fixture();
        let staging = f.dir.path().join("staging");
        std::fs::create_dir_all(&staging).unwrap();
        std::fs::write(staging.join("output_video.mp4"), b"previous run").unwrap();
        f.executor.push_failure("boom");

        let result = f.gateway.mux(&f.video, &f.subtitles);

        assert!(!result.succeeded);
        let previous = std::fs::read(staging.join("output_video.mp4")).unwrap();
        assert_eq!(previous, b"previous run");
    }

    #[test]
    fn mux_missing_video_reports_without_invoking_tool() {
        let f = fixture();
        let result = f
            .gateway
            .mux(Path::new("/nonexistent/movie.mp4"), &f.subtitles);

        assert!(!result.succeeded);
        assert!(result.diagnostic.contains("does not exist"));
        assert!(f.executor.calls().is_empty());
    }

    #[test]
    fn mux_missing_tool_becomes_diagnostic() {
        let f = fixture();
        f.executor.push_response(Err(SubgenError::ToolNotFound {
            tool: "ffmpeg".to_string(),
        }));

        let result = f.gateway.mux(&f.video, &f.subtitles);
        assert!(!result.succeeded);
        assert!(result.diagnostic.contains("ffmpeg"));
    }

    #[test]
    fn probe_returns_tool_stderr() {
        let f = fixture();
        f.executor.push_response(Ok(crate::exec::ToolOutput {
            success: true,
            stdout: Vec::new(),
            stderr: "Duration: 00:01:00.00, bitrate: 128 kb/s".to_string(),
        }));

        let text = f.gateway.probe(&f.video);
        assert!(text.contains("Duration"));

        let calls = f.executor.calls();
        assert_eq!(calls[0].0, "ffprobe");
    }

    #[test]
    fn probe_failure_is_not_fatal() {
        let f = fixture();
        f.executor.push_response(Err(SubgenError::ToolNotFound {
            tool: "ffprobe".to_string(),
        }));

        let text = f.gateway.probe(&f.video);
        assert!(text.contains("probe unavailable"));
    }
}
