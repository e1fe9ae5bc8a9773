//! Deckhand CLI binary.
//!
//! This binary provides command-line access to the upload pipeline:
//! - Validate and store a local file
//! - Delete a stored file by reference

use clap::Parser;
use deckhand::{
    DeckhandConfig, DeckhandError, DeckhandResult, LoggingConfig, init_logging_with_config,
};
use std::process::ExitCode;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    use cli::Cli;

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    if let Err(e) =
        init_logging_with_config(LoggingConfig::new(log_level).with_json_logs(cli.json_logs))
    {
        eprintln!("failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let result = run(&cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

/// Load configuration and dispatch the selected command.
async fn run(args: &cli::Cli) -> DeckhandResult<()> {
    use cli::{Commands, delete_reference, save_file};

    let config = match &args.config {
        Some(path) => DeckhandConfig::from_file(path)?,
        None => DeckhandConfig::load()?,
    };

    match &args.command {
        Commands::Save { path, name } => save_file(&config, path, name.as_deref()).await,
        Commands::Delete { reference } => delete_reference(&config, reference).await,
    }
}

/// Print an error with its remediation and pick an exit code.
///
/// Caller errors exit with 2, everything else with 1.
fn report(err: &DeckhandError) -> ExitCode {
    match err.storage_kind() {
        Some(kind) if kind.is_rejection() => {
            eprintln!("rejected: {} ({})", kind, kind.remediation());
            ExitCode::from(2)
        }
        Some(kind) if kind.is_caller_error() => {
            eprintln!("refused: {} ({})", kind, kind.remediation());
            ExitCode::from(2)
        }
        Some(kind) => {
            eprintln!("storage failed: {} ({})", kind, kind.remediation());
            ExitCode::FAILURE
        }
        None => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
