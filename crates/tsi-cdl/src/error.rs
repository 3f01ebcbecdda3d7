//! # Parse Errors
//!
//! Structured errors for CDL parsing. Every variant is fatal for the file
//! it occurred in; batch callers isolate the failure and continue with the
//! next file.

use thiserror::Error;

/// Error produced while parsing a CDL definition file.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The source text does not match the CDL grammar.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        /// 1-based line of the offending construct.
        line: usize,
        /// 1-based column of the offending construct.
        column: usize,
        /// Description of what was expected.
        message: String,
    },

    /// A variable declaration uses a type keyword the format does not define.
    #[error("variable '{variable}' has unknown type keyword '{keyword}'")]
    UnknownType {
        /// The declared variable.
        variable: String,
        /// The unrecognized keyword.
        keyword: String,
    },

    /// The same dimension name was declared twice.
    #[error("duplicate dimension name '{name}'")]
    DuplicateDimension {
        /// The repeated name.
        name: String,
    },

    /// The same variable name was declared twice.
    #[error("duplicate variable name '{name}'")]
    DuplicateVariable {
        /// The repeated name.
        name: String,
    },

    /// The same attribute key was assigned twice for one owner.
    #[error("duplicate attribute '{key}' on '{owner}'")]
    DuplicateAttribute {
        /// Variable name, or the file name for global attributes.
        owner: String,
        /// The repeated key.
        key: String,
    },

    /// A variable shape references a dimension that was never declared.
    #[error("variable '{variable}' references undeclared dimension '{dimension}'")]
    UndeclaredDimension {
        /// The variable whose shape is invalid.
        variable: String,
        /// The missing dimension name.
        dimension: String,
    },

    /// An attribute line names a variable that was never declared.
    #[error("attribute '{key}' belongs to undeclared variable '{variable}'")]
    UndeclaredVariable {
        /// The missing variable name.
        variable: String,
        /// The attribute key on the orphaned line.
        key: String,
    },

    /// A fixed-size dimension declared a size of zero.
    #[error("dimension '{name}' must have a positive size")]
    InvalidDimensionSize {
        /// The offending dimension.
        name: String,
    },

    /// The source file does not exist.
    #[error("definition file not found: {path}")]
    FileNotFound {
        /// The missing path.
        path: String,
    },

    /// IO error reading the source file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
