//! Command-line interface for subgen
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Offline subtitle generation for audio and video files
#[derive(Parser, Debug)]
#[command(
    name = "subgen",
    version,
    about = "Generate SRT subtitles from audio and video files"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Audio or video file to transcribe (default command)
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: stage progress, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Language to transcribe (default: English). Run `subgen models` for the list
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Model id within the language (default: the language's first model)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Skip punctuation restoration for raw acoustic model output
    #[arg(long)]
    pub no_punctuation: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List supported languages and their models
    Models {
        /// Show models for one language only
        #[arg(long, value_name = "LANG")]
        language: Option<String>,
    },

    /// Show media metadata for a file (via ffprobe)
    Probe {
        /// Media file to inspect
        file: PathBuf,
    },

    /// Burn a subtitle file into a video
    Mux {
        /// Video file
        video: PathBuf,
        /// SRT subtitle file
        subtitles: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}
