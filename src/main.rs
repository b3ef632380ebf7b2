//! emn-import: convert an IDF/EMN/BDF board file into a JSON board export
//!
//! Reads the mechanical description of a board, rebuilds its geometry and
//! writes the parsed document plus mapped features for a code generator.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use emn_importer::config::{self, Config};
use emn_importer::error::ImportError;
use emn_importer::export::Export;
use emn_importer::features::map_features;
use emn_importer::idf;

/// Import an IDF/EMN/BDF board file.
///
/// Parses the board outline, cutouts, keepouts, holes, notes and placement,
/// and writes them as a JSON export.
#[derive(Parser, Debug)]
#[command(name = "emn-import")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the EMN/IDF/BDF file to import
    #[arg(value_name = "EMN_FILE")]
    input: PathBuf,

    /// Name for the imported board (sanitised into an identifier)
    #[arg(value_name = "NAME")]
    name: String,

    /// Output file path
    #[arg(value_name = "OUTPUT_FILE")]
    output: PathBuf,

    /// Path to configuration file
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Parses the input, maps features and writes the export.
fn run(input: &Path, name: &str, output: &Path, cfg: &Config) -> Result<(), ImportError> {
    let document = idf::read_file(input)?;
    let features = map_features(&document, &cfg.features);

    info!(
        outline = if document.board_outline.as_circle().is_some() { "circle" } else { "polygon" },
        cutouts = document.board_cutouts.len(),
        holes = document.holes.len(),
        notes = document.notes.len(),
        parts = document.placement.len(),
        units = ?document.units(),
        "Parsed board"
    );

    Export::new(name, input, &document, features).write(output, &cfg.output)?;
    Ok(())
}

/// Entry point for the emn-import command.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let cfg = match config::load_config_or_default(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        input = %args.input.display(),
        "Starting import"
    );

    match run(&args.input, &args.name, &args.output, &cfg) {
        Ok(()) => {
            info!(output = %args.output.display(), "Import complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Import failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
