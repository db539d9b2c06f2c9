//! Modera CLI: moderate a local image or video before publishing it.
//!
//! Configuration comes from the environment (or `.env`); S3_BUCKET is required.

use anyhow::Context;
use clap::{Parser, Subcommand};
use modera_cli::{
    exit_code, init_tracing, render_result, stage_copy, watch_interrupts, LogFormat,
    EXIT_INTERRUPTED, EXIT_SETUP_ERROR,
};
use modera_core::{classify, content_type_for, Config};
use modera_services::build_pipeline;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "modera", about = "Moderate images and videos before publishing")]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Moderate a file; exits 0 when approved, 2 when rejected
    Moderate {
        /// Path to the image or video
        file: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Transcription language (e.g. fr-FR, en-US)
        #[arg(long)]
        language: Option<String>,
        /// Video offset in seconds of the moderated frame
        #[arg(long, value_name = "SECS")]
        frame_offset: Option<f64>,
    },
    /// Print the file kind inferred from the file name
    Classify {
        /// Path to the file
        file: PathBuf,
    },
}

async fn moderate(
    file: PathBuf,
    json: bool,
    language: Option<String>,
    frame_offset: Option<f64>,
) -> anyhow::Result<ExitCode> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(language) = language {
        config.transcription.language_code = language;
    }
    if let Some(offset) = frame_offset {
        config.frame.offset_secs = offset;
    }
    config.validate().context("Invalid configuration")?;

    let pipeline = build_pipeline(&config).await?;

    let staging = tempfile::Builder::new()
        .prefix("modera-upload-")
        .tempdir()
        .context("Failed to create staging directory")?;
    let staged = stage_copy(&file, staging.path())?;

    let handle = pipeline.spawn(staged);
    let cancel = handle.cancellation_token();
    tokio::spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, cancel).await {
            std::process::exit(EXIT_INTERRUPTED);
        }
    });
    let result = handle.join().await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Serialize result")?
        );
    } else {
        print!("{}", render_result(&result));
    }

    Ok(exit_code(&result))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let outcome = match cli.command {
        Commands::Moderate {
            file,
            json,
            language,
            frame_offset,
        } => moderate(file, json, language, frame_offset).await,
        Commands::Classify { file } => {
            let kind = classify(&file);
            match content_type_for(&file) {
                Some(content_type) => println!("{} ({})", kind, content_type),
                None => println!("{}", kind),
            }
            Ok(ExitCode::SUCCESS)
        }
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_SETUP_ERROR)
        }
    }
}
