//! Strata materializes a concrete, ready-to-run project tree from layered
//! overlay template trees, driven by build-time feature selections.
//! Later overlays win colliding target paths, and their template generators
//! can read and extend what earlier overlays produced.

/// Command-line interface module for the Strata application
pub mod cli;

/// Build metadata (feature selections) and configuration file loading
pub mod config;

/// Error types and handling for the Strata application
pub mod error;

/// Overlay directory traversal with deterministic ordering
pub mod walker;

/// Source path to target path resolution
/// Strips feature-tag segments and `$`/`$$` template markers
pub mod resolve;

/// Per-file strategy selection
/// Decides between ignore, template execution, conditional compilation and
/// verbatim copy
pub mod dispatch;

/// Template modules, the generator registry and output serialization
pub mod template;

/// Restricted boolean-expression evaluation for conditional guards
pub mod eval;

/// Conditional compilation: dead-branch elimination on script sources
pub mod compiler;

/// Core materialization orchestration
/// Combines all components to generate the final output tree
pub mod engine;
