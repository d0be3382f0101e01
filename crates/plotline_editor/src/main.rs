// SPDX-License-Identifier: MIT OR Apache-2.0
//! `plotline` command line tool.
//!
//! Creates, checks and reformats project documents, and moves them in and
//! out of the file-backed project store.

use clap::{Parser, Subcommand};
use plotline_editor::{
    ConfigError, EditorConfig, EditorState, ExportError, FileStorage, ImportError, PersistenceError,
    ProjectPersistence,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Plotline narrative project tool
#[derive(Parser, Debug)]
#[command(name = "plotline")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to an editor config file (RON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a new empty project document
    New {
        /// Project name
        name: String,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a document and report structural warnings
    Check {
        /// Project document
        file: PathBuf,
    },

    /// Rewrite a document in canonical form
    Fmt {
        /// Project document
        file: PathBuf,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Store a document in the project store
    Save {
        /// Project document
        file: PathBuf,
    },

    /// Restore the document held in the project store
    Load {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Nothing stored under key {0:?}")]
    NothingStored(String),
}

fn init_tracing(config: &EditorConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn write_output(output: Option<&Path>, text: &str) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => println!("{text}"),
    }
    Ok(())
}

fn load_document(config: &EditorConfig, file: &Path) -> Result<EditorState, CliError> {
    let text = std::fs::read_to_string(file)?;
    let mut state = EditorState::with_history_limit("", config.history_limit);
    state.import_project(&text)?;
    Ok(state)
}

fn persistence(config: &EditorConfig) -> ProjectPersistence<FileStorage> {
    ProjectPersistence::with_key(FileStorage::new(&config.storage_dir), config.storage_key.clone())
}

fn block_on<F: std::future::Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;
    Ok(runtime.block_on(future))
}

fn run(cli: Cli, config: &EditorConfig) -> Result<ExitCode, CliError> {
    match cli.command {
        Commands::New { name, output } => {
            let state = EditorState::with_history_limit(name, config.history_limit);
            write_output(output.as_deref(), &state.export_project()?)?;
        }
        Commands::Check { file } => {
            let state = match load_document(config, &file) {
                Ok(state) => state,
                Err(err) => {
                    eprintln!("{}: {err}", file.display());
                    return Ok(ExitCode::FAILURE);
                }
            };
            let report = state.validate_all();
            let mut total = 0;
            for (graph_id, warnings) in &report {
                for warning in warnings {
                    let node = warning.node_id.as_ref().map_or("-", |id| id.as_str());
                    println!("{graph_id}\t{node}\t{}\t{}", warning.rule, warning.message);
                    total += 1;
                }
            }
            println!("{} graph(s), {total} warning(s)", report.len());
        }
        Commands::Fmt { file, output } => {
            let state = load_document(config, &file)?;
            write_output(output.as_deref(), &state.export_project()?)?;
        }
        Commands::Save { file } => {
            let state = load_document(config, &file)?;
            block_on(persistence(config).save(&state))??;
            println!("Saved {} to {}", file.display(), config.storage_dir.display());
        }
        Commands::Load { output } => {
            let store = persistence(config);
            let mut state = EditorState::with_history_limit("", config.history_limit);
            if !block_on(store.load(&mut state))?? {
                return Err(CliError::NothingStored(config.storage_key.clone()));
            }
            write_output(output.as_deref(), &state.export_project()?)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match EditorConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    match run(cli, &config) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
