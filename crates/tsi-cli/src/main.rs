//! # tsi CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros; handlers live in the library crate and return
//! the process exit code.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tsi_cli::generate::{run_generate, GenerateArgs};
use tsi_cli::list::{run_list, ListArgs};
use tsi_cli::validate::{run_validate, ValidateArgs};

/// Standard Interfaces toolchain.
///
/// Generates JSON Schemas from CDL definition files, validates data
/// documents against the generated schemas, and lists resource trees.
#[derive(Parser, Debug)]
#[command(name = "tsi", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate JSON Schemas from a definition file or directory tree.
    Generate(GenerateArgs),

    /// Validate data documents against a generated schema.
    Validate(ValidateArgs),

    /// List resource categories and files.
    List(ListArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Generate(args) => run_generate(&args),
        Commands::Validate(args) => run_validate(&args),
        Commands::List(args) => run_list(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
