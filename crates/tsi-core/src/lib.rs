//! # tsi-core — Foundational Types for the Standard Interfaces Toolchain
//!
//! This crate defines the in-memory model of a parsed definition file
//! (dimensions, variables, attributes, geometry containers) shared by
//! the parser (`tsi-cdl`) and the translator (`tsi-schema`). It depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Declaration order is preserved.** Dimensions, variables, and
//!    attributes are stored as ordered sequences, because coordinate order
//!    is semantically meaningful (`r z` is not `z r`) and generated output
//!    must be deterministic.
//!
//! 2. **Attribute values are a tagged union.** [`AttrValue`] covers the
//!    literal forms a definition file can carry (text, integer, float,
//!    list), with unrecognized keys passing through verbatim. No
//!    stringly-typed attribute access.
//!
//! 3. **Geometry policy is an explicit lookup.** The per-geometry-type
//!    node-count minimum lives on [`GeometryType`], keyed by the
//!    container's declared type, never by variable naming conventions.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tsi-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug` and `Clone`.

pub mod attrs;
pub mod definition;
pub mod digest;
pub mod domain;

// Re-export primary types for ergonomic imports.
pub use attrs::AttrKey;
pub use definition::{
    is_identifier, AttrValue, DefinitionFile, Dimension, DimensionSize, GeometryType, VarType,
    Variable, IDENTIFIER_PATTERN,
};
pub use digest::{sha256_hex, ContentDigest};
pub use domain::detect_domain;
