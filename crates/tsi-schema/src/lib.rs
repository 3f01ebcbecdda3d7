//! # tsi-schema — Schema Generation & Validation
//!
//! This crate turns parsed definition files into JSON Schema documents and
//! validates data documents against them.
//!
//! ## Responsibilities
//!
//! - **Translation:** [`translate`] maps a [`tsi_core::DefinitionFile`]
//!   onto a draft-07 schema with three constraint groups: `dimensions`
//!   (closed set, per-dimension lower bounds), `variables` (shape arity,
//!   attribute slots, geometry containers), and `global_attributes`
//!   (typed but fully optional). Translation is a pure function of its
//!   input: no timestamps, no randomness, deterministic key order.
//!
//! - **Writing:** [`write_schema`] serializes a generated schema with an
//!   `x-source` provenance block (source path, SHA-256 digest, generation
//!   timestamp, generator identity). Provenance is informational only and
//!   never participates in validation.
//!
//! - **Validation:** [`SchemaValidator`] loads generated schemas from a
//!   directory tree, compiles draft-07 validators via the `jsonschema`
//!   crate, and reports structured violations for JSON or YAML documents.
//!
//! - **Batch driving:** [`run_batch`] walks a definition tree, translates
//!   every file independently, mirrors the domain subdirectory layout
//!   into the output directory, and aggregates a fail-soft report.
//!
//! ## Error Policy
//!
//! Unresolved or malformed geometry containers abort translation of that
//! file. A recognized attribute holding a value of the wrong type does
//! not: the attribute degrades to an unconstrained passthrough and the
//! mismatch is surfaced as a [`TypeMismatch`] warning.

pub mod batch;
pub mod translate;
pub mod validate;
pub mod write;

// Re-export primary types for ergonomic imports.
pub use batch::{run_batch, BatchError, BatchOptions, BatchReport, FileError};
pub use translate::{
    translate, GeneratedSchema, TranslateError, TranslateOptions, Translation, TypeMismatch,
    DEFAULT_BASE_URL,
};
pub use validate::{SchemaValidationError, SchemaValidator, ValidationViolations, Violation};
pub use write::{write_schema, SourceInfo, WriteError, WriteOptions};
