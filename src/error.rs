//! Error handling for the Strata application.
//! Defines the error types and result alias used throughout the crate.

use std::io;
use thiserror::Error;

/// Errors that can occur while materializing an output tree.
///
/// Every variant is fatal: the run halts immediately with no attempt to roll
/// back files that were already written. Path collisions between overlays are
/// not errors; they are resolved by overlay precedence and surfaced as
/// warnings.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    Io(#[from] io::Error),

    /// Represents errors raised while walking an overlay directory
    #[error("Walk error: {0}.")]
    Walk(#[from] walkdir::Error),

    /// Represents errors during configuration parsing or CLI validation
    #[error("Configuration error: {0}.")]
    Config(String),

    /// The output directory already exists and `--force` was not given
    #[error("Output directory already exists: '{output_dir}'. Use --force to overwrite.")]
    OutputDirectoryExists { output_dir: String },

    /// A template produced content for an extension with no defined serialization
    #[error("Unsupported extension '{extension}' for '{path}'.")]
    UnsupportedExtension { path: String, extension: String },

    /// A `$`-marked template file carries a typed-script extension and cannot
    /// be interpreted without a prior build step
    #[error("Template '{path}' must be compiled before it can be executed.")]
    PrecompiledTemplateRequired { path: String },

    /// A `$`-marked template file has no generator registered for it
    #[error("No template generator registered for '{path}'.")]
    TemplateNotRegistered { path: String },

    /// A template generator failed to produce content
    #[error("Template error: {0}.")]
    Template(String),

    /// A conditional guard used a construct outside the evaluable grammar
    #[error("Unsupported expression in '{path}': {expression}.")]
    UnsupportedExpression { path: String, expression: String },

    /// A conditional guard referenced a marker with no metadata backing it
    #[error("Unknown marker '{marker}' in '{path}'.")]
    UnknownMarker { path: String, marker: String },

    /// A source file could not be parsed into a syntax tree
    #[error("Parse error in '{path}': {message}.")]
    Parse { path: String, message: String },
}

/// Convenience type alias for Results with Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}
