//! # Schema Writer
//!
//! Serializes a generated schema to disk with an `x-source` provenance
//! block: the originating file, a SHA-256 digest of its bytes, the
//! generation timestamp, and the generator identity. Provenance is
//! informational only; validation semantics live entirely in the
//! constraint tree produced by the translator.
//!
//! Regeneration always overwrites the previous artifact. Output is
//! deterministic modulo the timestamp, which can be pinned via
//! [`WriteOptions::generated_at`] for reproducible runs.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use thiserror::Error;

use tsi_core::ContentDigest;

use crate::translate::GeneratedSchema;

/// Error writing a generated schema to disk. Fatal for the file it
/// occurred on; batch callers record the failure and continue.
#[derive(Error, Debug)]
pub enum WriteError {
    /// The destination directory could not be created.
    #[error("cannot create output directory '{path}': {source}")]
    CreateDir {
        /// The directory that could not be created.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The schema file could not be written.
    #[error("cannot write schema '{path}': {source}")]
    WriteFile {
        /// The destination that could not be written.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The schema document could not be serialized.
    #[error("cannot serialize schema: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Identity of the definition source a schema was generated from.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// Source file path as presented to the generator.
    pub path: String,
    /// Digest of the source bytes.
    pub digest: ContentDigest,
}

impl SourceInfo {
    /// Capture the identity of a source text.
    pub fn new(path: impl Into<String>, source_text: &str) -> Self {
        Self {
            path: path.into(),
            digest: ContentDigest::of_bytes(source_text.as_bytes()),
        }
    }
}

/// Options controlling provenance stamping.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Generation timestamp override; defaults to the current UTC time.
    pub generated_at: Option<DateTime<Utc>>,
}

/// Build the non-validating `x-source` provenance object.
pub fn provenance(source: &SourceInfo, generated_at: DateTime<Utc>) -> Value {
    json!({
        "format": "CDL",
        "file": source.path,
        "digest": source.digest.to_string(),
        "generated": generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        "generator": format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    })
}

/// Write a generated schema to `out_path`, stamping provenance.
///
/// Creates missing parent directories and overwrites any existing file.
pub fn write_schema(
    schema: &GeneratedSchema,
    source: &SourceInfo,
    out_path: &Path,
    opts: &WriteOptions,
) -> Result<(), WriteError> {
    let generated_at = opts.generated_at.unwrap_or_else(Utc::now);

    let mut document = schema.document.clone();
    if let Value::Object(map) = &mut document {
        map.insert("x-source".to_string(), provenance(source, generated_at));
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| WriteError::CreateDir {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let mut rendered = serde_json::to_string_pretty(&document)?;
    rendered.push('\n');

    std::fs::write(out_path, rendered).map_err(|e| WriteError::WriteFile {
        path: out_path.display().to_string(),
        source: e,
    })?;

    tracing::debug!(schema = %out_path.display(), "wrote generated schema");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::{translate, TranslateOptions};
    use chrono::TimeZone;
    use tsi_cdl::parse_definition;

    const SOURCE: &str = r#"
netcdf probe {
:title = "Probe" ;
dimensions:
    time = UNLIMITED ;
variables:
    double time(time) ;
        time:units = "s" ;
}
"#;

    fn sample_schema() -> GeneratedSchema {
        let def = parse_definition(SOURCE).unwrap();
        translate(&def, &TranslateOptions::default()).unwrap().schema
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn provenance_fields() {
        let source = SourceInfo::new("definitions/base/probe.cdl", SOURCE);
        let block = provenance(&source, fixed_time());
        assert_eq!(block["format"], json!("CDL"));
        assert_eq!(block["file"], json!("definitions/base/probe.cdl"));
        assert_eq!(block["generated"], json!("2026-03-14T09:26:53Z"));
        let digest = block["digest"].as_str().unwrap();
        assert!(digest.starts_with("sha256:"));
        assert_eq!(digest.len(), 7 + 64);
        assert!(block["generator"]
            .as_str()
            .unwrap()
            .starts_with("tsi-schema"));
    }

    #[test]
    fn write_stamps_provenance_outside_constraints() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("base").join("probe.schema.json");
        let schema = sample_schema();
        let source = SourceInfo::new("probe.cdl", SOURCE);

        write_schema(
            &schema,
            &source,
            &out,
            &WriteOptions {
                generated_at: Some(fixed_time()),
            },
        )
        .unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["x-source"]["format"], json!("CDL"));
        // The constraint tree itself is untouched.
        let mut stripped = written.clone();
        stripped.as_object_mut().unwrap().remove("x-source");
        assert_eq!(stripped, schema.document);
    }

    #[test]
    fn write_is_deterministic_with_pinned_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("probe.schema.json");
        let schema = sample_schema();
        let source = SourceInfo::new("probe.cdl", SOURCE);
        let opts = WriteOptions {
            generated_at: Some(fixed_time()),
        };

        write_schema(&schema, &source, &out, &opts).unwrap();
        let first = std::fs::read_to_string(&out).unwrap();
        write_schema(&schema, &source, &out, &opts).unwrap();
        let second = std::fs::read_to_string(&out).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn write_overwrites_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("probe.schema.json");
        std::fs::write(&out, "stale").unwrap();

        let schema = sample_schema();
        let source = SourceInfo::new("probe.cdl", SOURCE);
        write_schema(&schema, &source, &out, &WriteOptions::default()).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.starts_with('{'));
        assert!(written.contains("x-source"));
    }

    #[test]
    fn unwritable_destination_fails() {
        let schema = sample_schema();
        let source = SourceInfo::new("probe.cdl", SOURCE);
        let err = write_schema(
            &schema,
            &source,
            Path::new("/proc/no-such-dir/probe.schema.json"),
            &WriteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WriteError::CreateDir { .. } | WriteError::WriteFile { .. }
        ));
    }
}
