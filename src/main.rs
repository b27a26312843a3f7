use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;
use subgen::catalog::LanguageModelCatalog;
use subgen::cli::{Cli, Commands};
use subgen::config::Config;
use subgen::media::MediaDecoder;
use subgen::mux::MuxingGateway;
use subgen::pipeline::{TranscribeRequest, TranscriptionPipeline};
use subgen::punctuate::RulePunctuator;
use subgen::segmenter::EnergySegmenter;
use subgen::stt::recognizer::RecognizerCache;
use subgen::stt::whisper::WhisperRecognizerFactory;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match cli.command {
        None => match cli.input {
            Some(ref input) => {
                let config = load_config(cli.config.as_deref())?;
                run_transcribe(&cli, config, input)?;
            }
            None => {
                Cli::command().print_help()?;
                std::process::exit(2);
            }
        },
        Some(Commands::Models { ref language }) => {
            list_models(language.as_deref())?;
        }
        Some(Commands::Probe { ref file }) => {
            let config = load_config(cli.config.as_deref())?;
            let gateway = MuxingGateway::system(config.mux.staging_dir);
            print!("{}", gateway.probe(file));
        }
        Some(Commands::Mux {
            ref video,
            ref subtitles,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            let gateway = MuxingGateway::system(config.mux.staging_dir);
            let result = gateway.mux(video, subtitles);
            if result.succeeded {
                println!(
                    "{} {}",
                    "Muxed video written to".green(),
                    result.output_path.display()
                );
            } else {
                eprintln!("{}", "Muxing failed:".red());
                eprintln!("{}", result.diagnostic.trim_end());
                std::process::exit(1);
            }
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "subgen", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Map quiet/verbose flags to a log filter, honoring RUST_LOG when set.
fn init_logging(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/subgen/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };
    Ok(config.with_env_overrides())
}

/// Run the default transcription command.
fn run_transcribe(cli: &Cli, config: Config, input: &Path) -> Result<()> {
    let language = cli
        .language
        .clone()
        .unwrap_or_else(|| config.stt.language.clone());
    let model = cli.model.clone().or_else(|| config.stt.model.clone());
    let punctuation = !cli.no_punctuation && config.stt.punctuation;

    let models_dir = config
        .stt
        .models_dir
        .clone()
        .unwrap_or_else(WhisperRecognizerFactory::default_models_dir);
    let factory = WhisperRecognizerFactory::new(
        models_dir,
        subgen::stt::whisper::AUTO_LANGUAGE.to_string(),
        config.stt.threads,
    );

    let pipeline = TranscriptionPipeline::new(
        LanguageModelCatalog::builtin(),
        RecognizerCache::new(Box::new(factory)),
        Arc::new(EnergySegmenter::new(config.segmenter.to_segmenter_config())),
        Arc::new(RulePunctuator),
        MediaDecoder::system(),
    );

    let request = TranscribeRequest {
        language,
        model,
        punctuation,
        input: input.to_path_buf(),
    };

    match pipeline.transcribe(&request) {
        Ok(result) => {
            if !cli.quiet {
                println!(
                    "{} {}",
                    "Subtitles written to".green(),
                    result.srt_path.display()
                );
                if !result.flat_text.is_empty() {
                    println!();
                    println!("{}", result.flat_text);
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            std::process::exit(1);
        }
    }
}

/// Print the language/model catalog.
fn list_models(language: Option<&str>) -> Result<()> {
    let catalog = LanguageModelCatalog::builtin();
    let languages: Vec<String> = match language {
        Some(lang) => {
            // Fail early with the catalog's own error for unknown languages.
            catalog.models_for(lang)?;
            vec![lang.to_string()]
        }
        None => catalog.languages().iter().map(|l| l.to_string()).collect(),
    };

    for lang in languages {
        println!("{}", lang.bold());
        for (i, model) in catalog.models_for(&lang)?.iter().enumerate() {
            if i == 0 {
                println!("  {} {} {}", "●".green(), model.id, "(default)".dimmed());
            } else {
                println!("  ○ {}", model.id);
            }
        }
    }
    Ok(())
}
