//! # Generate Subcommand
//!
//! Batch schema generation. Walks the input for definition files,
//! translates each one independently, and writes the generated schemas
//! into the output directory, mirroring the domain subdirectory layout.
//! Individual failures are printed one per line and the run continues;
//! the exit code is non-zero if any file failed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;

use tsi_schema::{run_batch, BatchOptions, DEFAULT_BASE_URL};

/// Arguments for the `tsi generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Definition file, or directory searched recursively for *.cdl files.
    pub input: PathBuf,

    /// Output directory for generated schemas.
    pub output: PathBuf,

    /// Base URL used to build schema $id URIs.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Provenance timestamp (RFC 3339) for reproducible output.
    /// Defaults to the current time.
    #[arg(long)]
    pub generated_at: Option<String>,
}

/// Execute the generate subcommand.
pub fn run_generate(args: &GenerateArgs) -> Result<u8> {
    let generated_at = args
        .generated_at
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;

    let opts = BatchOptions {
        input: args.input.clone(),
        output: args.output.clone(),
        base_url: args.base_url.clone(),
        generated_at,
    };

    let report = run_batch(&opts)?;

    for generated in &report.generated {
        for warning in &generated.warnings {
            println!("warning: {}: {warning}", generated.source.display());
        }
    }
    for failed in &report.failed {
        println!("{}: {}", failed.source.display(), failed.error);
    }
    println!("{}", report.summary());

    Ok(if report.is_success() { 0 } else { 1 })
}

/// Parse an RFC 3339 timestamp into UTC.
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("invalid --generated-at timestamp: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTLINE: &str = r#"
netcdf vessel_outline {
:title = "Vessel Outline" ;
dimensions:
    vessel_node = UNLIMITED ;
    vessel_element = UNLIMITED ;
variables:
    int vessel_geometry ;
        vessel_geometry:geometry_type = "polygon" ;
        vessel_geometry:node_coordinates = "vessel_r vessel_z" ;
        vessel_geometry:node_count = "vessel_node_count" ;
    double vessel_r(vessel_node) ;
        vessel_r:units = "m" ;
    double vessel_z(vessel_node) ;
        vessel_z:units = "m" ;
    int vessel_node_count(vessel_element) ;
}
"#;

    #[test]
    fn parse_timestamp_accepts_rfc3339() {
        let t = parse_timestamp("2026-03-14T09:26:53Z").unwrap();
        assert_eq!(t.to_rfc3339(), "2026-03-14T09:26:53+00:00");
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn generate_reports_success() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("definitions").join("vessel");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("vessel-outline.cdl"), OUTLINE).unwrap();

        let args = GenerateArgs {
            input: dir.path().join("definitions"),
            output: dir.path().join("schemas"),
            base_url: DEFAULT_BASE_URL.to_string(),
            generated_at: Some("2026-03-14T09:26:53Z".to_string()),
        };
        let code = run_generate(&args).unwrap();
        assert_eq!(code, 0);
        assert!(dir
            .path()
            .join("schemas/vessel/vessel-outline.schema.json")
            .is_file());
    }

    #[test]
    fn generate_exit_code_reflects_failures() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("definitions");
        std::fs::create_dir_all(&input).unwrap();
        // Undeclared dimension reference: parse error.
        std::fs::write(
            input.join("broken.cdl"),
            "netcdf broken { dimensions: x = 1 ; variables: int f(y) ; }",
        )
        .unwrap();

        let args = GenerateArgs {
            input,
            output: dir.path().join("schemas"),
            base_url: DEFAULT_BASE_URL.to_string(),
            generated_at: None,
        };
        let code = run_generate(&args).unwrap();
        assert_eq!(code, 1);
    }
}
