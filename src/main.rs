use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use subtool::{Action, Config, TranslationPipeline, Workflow};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "subtool")]
#[command(version, about = "Extract, transcribe and translate subtitles")]
#[command(long_about = "Extract subtitle tracks from video containers, generate SRT subtitles with Whisper, and translate SRT files in batches with an OpenAI chat model.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Read configuration from this TOML file instead of the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Hide progress spinners
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Extract embedded subtitle tracks from a video file or folder
    Extract {
        /// Video file or folder
        path: PathBuf,
    },
    /// Generate subtitles with Whisper for a video file or folder
    Transcribe {
        /// Video file or folder
        path: PathBuf,

        /// Source language code (e.g., en, ja, es)
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Translate an SRT file or every SRT file in a folder
    Translate {
        /// SRT file or folder
        path: PathBuf,

        /// Target language name (e.g., Swedish, French)
        #[arg(short, long)]
        to: String,

        /// Subtitle blocks per translation request
        #[arg(short, long)]
        batch_size: Option<usize>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn action_for(command: &Command) -> (&Path, Action) {
    match command {
        Command::Extract { path } => (path.as_path(), Action::Extract),
        Command::Transcribe { path, .. } => (path.as_path(), Action::Transcribe),
        Command::Translate { path, to, .. } => (
            path.as_path(),
            Action::Translate {
                target_language: to.clone(),
            },
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    match &cli.command {
        Command::Translate {
            batch_size: Some(n),
            ..
        } => config.batch_size = *n,
        Command::Transcribe {
            language: Some(lang),
            ..
        } => config.language = lang.clone(),
        _ => {}
    }
    config.validate().context("Configuration validation failed")?;

    let (path, action) = action_for(&cli.command);
    let show_progress = !cli.no_progress;

    // Capabilities are built once and shared read-only for the whole run.
    let translator = match action {
        Action::Translate { .. } => config.translator(),
        _ => None,
    };
    let translation = TranslationPipeline::new(translator)
        .with_batch_size(config.batch_size)
        .with_progress(show_progress);
    if matches!(action, Action::Translate { .. }) && !translation.is_configured() {
        return Ok(());
    }

    let mut workflow = Workflow::new(translation)
        .with_language(config.language.clone())
        .with_progress(show_progress);
    if action == Action::Transcribe {
        match config.transcriber() {
            Ok(client) => workflow = workflow.with_transcriber(Box::new(client)),
            Err(e) => {
                error!("{}", e);
                return Ok(());
            }
        }
    }

    if path.is_dir() {
        let summary = workflow.process_folder(path, &action).await?;
        info!(
            "{} files processed, {} failed",
            summary.processed, summary.failed
        );
    } else if !path.exists() {
        error!("File does not exist: {}", path.display());
    } else if let Some(outputs) = workflow.run(path, &action).await {
        for output in outputs {
            info!("Output: {}", output.display());
        }
    }

    Ok(())
}
