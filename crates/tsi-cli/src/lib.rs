//! # tsi-cli — Standard Interfaces Command-Line Interface
//!
//! The `tsi` binary drives the toolchain: batch schema generation from
//! CDL definitions, validation of data documents against generated
//! schemas, and resource listing.
//!
//! ## Subcommands
//!
//! - `generate` — Translate a definition file or directory tree into
//!   generated schemas, mirroring the domain layout.
//! - `validate` — Validate JSON/YAML data documents against a generated
//!   schema.
//! - `list` — List resource categories and files under a definitions or
//!   schemas directory.
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to `tsi-schema`; no translation logic here.
//! - Handlers return the process exit code; per-file failures inside a
//!   batch never abort the run.

pub mod generate;
pub mod list;
pub mod validate;
