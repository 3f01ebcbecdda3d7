//! # Batch Driver
//!
//! Translates a directory tree of definition files in one run. Each file
//! is an independent unit of work: parsed fresh, translated, and written
//! on its own, with no ordering dependency between files. A failure in
//! one file never aborts the batch; the driver records the outcome and
//! moves on, and the caller decides the aggregate exit status from the
//! final [`BatchReport`].
//!
//! Output placement mirrors the input's domain subdirectory layout
//! (`definitions/<domain>/<name>.cdl` becomes
//! `schemas/<domain>/<name>.schema.json`). A file given directly, or one
//! sitting at the input root, is placed under its detected domain.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use tsi_cdl::{parse_definition, ParseError};

use crate::translate::{
    translate, TranslateError, TranslateOptions, TypeMismatch, DEFAULT_BASE_URL,
};
use crate::write::{write_schema, SourceInfo, WriteError, WriteOptions};

/// Per-file failure: any stage of the pipeline, isolated to that file.
#[derive(Error, Debug)]
pub enum FileError {
    /// The definition file could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The definition could not be translated.
    #[error("translate error: {0}")]
    Translate(#[from] TranslateError),

    /// The generated schema could not be written.
    #[error("write error: {0}")]
    Write(#[from] WriteError),
}

/// Driver-level failure: the batch itself could not run.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The input path does not exist.
    #[error("input path does not exist: {path}")]
    InputNotFound {
        /// The missing path.
        path: String,
    },

    /// The input directory holds no definition files.
    #[error("no definition files found under {path}")]
    NoDefinitions {
        /// The searched directory.
        path: String,
    },

    /// IO error while walking the input tree.
    #[error("io error walking {path}: {source}")]
    Walk {
        /// The directory being walked.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Options for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// A definition file, or a directory to walk recursively.
    pub input: PathBuf,
    /// Output root for generated schemas.
    pub output: PathBuf,
    /// Base URL for generated `$id` URIs.
    pub base_url: String,
    /// Provenance timestamp override for reproducible output.
    pub generated_at: Option<DateTime<Utc>>,
}

impl BatchOptions {
    /// Options with default base URL and current-time provenance.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            generated_at: None,
        }
    }
}

/// A successfully generated schema.
#[derive(Debug)]
pub struct GeneratedFile {
    /// The definition source.
    pub source: PathBuf,
    /// The written schema artifact.
    pub output: PathBuf,
    /// Recoverable attribute mismatches encountered during translation.
    pub warnings: Vec<TypeMismatch>,
}

/// A definition file that failed to translate.
#[derive(Debug)]
pub struct FailedFile {
    /// The definition source.
    pub source: PathBuf,
    /// Why it failed.
    pub error: FileError,
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files that produced a schema.
    pub generated: Vec<GeneratedFile>,
    /// Files that failed, with reasons.
    pub failed: Vec<FailedFile>,
}

impl BatchReport {
    /// True when every file translated.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// One-line summary for the end of a run.
    pub fn summary(&self) -> String {
        format!(
            "{} generated, {} failed",
            self.generated.len(),
            self.failed.len()
        )
    }
}

/// Run a batch translation.
///
/// # Errors
///
/// Returns [`BatchError`] only when the batch itself cannot run (missing
/// input, empty input directory, unwalkable tree). Per-file failures are
/// reported through the [`BatchReport`], never as an `Err`.
pub fn run_batch(opts: &BatchOptions) -> Result<BatchReport, BatchError> {
    let files = collect_definition_files(&opts.input)?;
    let mut report = BatchReport::default();

    for file in files {
        match generate_one(&file, opts) {
            Ok(generated) => {
                tracing::debug!(
                    source = %generated.source.display(),
                    output = %generated.output.display(),
                    "generated schema"
                );
                report.generated.push(generated);
            }
            Err(error) => {
                tracing::debug!(source = %file.display(), %error, "translation failed");
                report.failed.push(FailedFile {
                    source: file,
                    error,
                });
            }
        }
    }

    Ok(report)
}

/// Translate and write a single definition file.
fn generate_one(file: &Path, opts: &BatchOptions) -> Result<GeneratedFile, FileError> {
    let source_text = std::fs::read_to_string(file).map_err(|e| {
        FileError::Parse(if e.kind() == std::io::ErrorKind::NotFound {
            ParseError::FileNotFound {
                path: file.display().to_string(),
            }
        } else {
            ParseError::Io(e)
        })
    })?;

    let def = parse_definition(&source_text)?;

    // A subdirectory under the input root decides both the `$id` domain
    // and the mirrored output placement; otherwise the domain is detected
    // from variable prefixes.
    let relative_parent = file
        .strip_prefix(&opts.input)
        .ok()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf);
    let domain = relative_parent.as_ref().map(|p| {
        p.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    });

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| def.name.clone());

    let translate_opts = TranslateOptions {
        base_url: opts.base_url.clone(),
        domain,
        file_name: Some(format!("{}.schema.json", stem.replace('_', "-"))),
    };
    let translation = translate(&def, &translate_opts)?;

    let out_path = match &relative_parent {
        Some(rel) => opts.output.join(rel).join(&translation.schema.file_name),
        None => opts
            .output
            .join(&translation.schema.domain)
            .join(&translation.schema.file_name),
    };

    let source_info = SourceInfo::new(file.display().to_string(), &source_text);
    write_schema(
        &translation.schema,
        &source_info,
        &out_path,
        &WriteOptions {
            generated_at: opts.generated_at,
        },
    )?;

    Ok(GeneratedFile {
        source: file.to_path_buf(),
        output: out_path,
        warnings: translation.warnings,
    })
}

/// Collect the definition files for a run: the input itself when it is a
/// file, or every `*.cdl` under it, sorted for deterministic ordering.
fn collect_definition_files(input: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(BatchError::InputNotFound {
            path: input.display().to_string(),
        });
    }

    let mut files = Vec::new();
    walk_cdl(input, &mut files).map_err(|e| BatchError::Walk {
        path: input.display().to_string(),
        source: e,
    })?;
    files.sort();

    if files.is_empty() {
        return Err(BatchError::NoDefinitions {
            path: input.display().to_string(),
        });
    }
    Ok(files)
}

/// Recursively collect `*.cdl` files.
fn walk_cdl(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk_cdl(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("cdl") {
            out.push(path);
        }
    }
    Ok(())
}
