//! # Validate Subcommand
//!
//! Validates data documents (JSON or YAML) against a generated schema.
//! Prints one line per document, with structured violation detail on
//! failure; the exit code is non-zero if any document failed.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tsi_schema::SchemaValidator;

/// Arguments for the `tsi validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory tree of generated schemas.
    #[arg(long)]
    pub schemas: PathBuf,

    /// Schema to validate against, by domain-qualified name
    /// (e.g. "vessel/vessel-outline.schema.json") or bare file name.
    #[arg(long)]
    pub schema: String,

    /// Data documents to validate (JSON or YAML).
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let validator = SchemaValidator::new(&args.schemas)?;
    tracing::debug!(
        schemas = validator.schema_names().len(),
        dir = %validator.schema_dir().display(),
        "loaded schema directory"
    );

    let mut failed = 0usize;
    for document in &args.documents {
        match validator.validate_file(document, &args.schema) {
            Ok(()) => println!("{}: ok", document.display()),
            Err(e) => {
                failed += 1;
                println!("{}: {e}", document.display());
            }
        }
    }

    println!(
        "{} validated, {} failed",
        args.documents.len() - failed,
        failed
    );
    Ok(if failed == 0 { 0 } else { 1 })
}
