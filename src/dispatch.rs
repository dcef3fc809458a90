//! Per-file strategy selection.
//! For every source file the dispatcher picks exactly one way to produce the
//! target: skip it, execute it as a template, conditionally compile it, or
//! copy it byte for byte.

use crate::config::MARKER_TOKEN;
use crate::error::{Error, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// How a single source file is turned into target content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Reserved filename, produces nothing and claims no target path
    Ignore,
    /// `$`-marked executable template, resolved through the registry
    Template,
    /// Script file guarded by conditional-compilation markers
    Compile,
    /// Byte-for-byte copy
    Copy,
}

/// Filenames with these prefixes are build-internal and never materialized.
fn ignore_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(chunk-|asset-|#)").unwrap())
}

/// Whether an extension belongs to a script file (candidate for template
/// execution or conditional compilation).
pub fn is_script_extension(extension: &str) -> bool {
    matches!(extension, "ts" | "tsx" | "js" | "jsx")
}

/// Selects the strategy for one source file, in fixed priority order:
/// ignore, precompile check, template execution, conditional compilation,
/// verbatim copy.
///
/// # Errors
/// * `Error::PrecompiledTemplateRequired` for `$`-marked TypeScript files,
///   which cannot be interpreted without a build step this run does not
///   perform
pub fn select_strategy(source: &Path) -> Result<Strategy> {
    let stem = source
        .file_stem()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Config(format!("Invalid path: {}", source.display())))?;
    let extension = source.extension().and_then(|e| e.to_str()).unwrap_or("");

    if ignore_re().is_match(stem) {
        return Ok(Strategy::Ignore);
    }

    if stem.starts_with('$') {
        if matches!(extension, "ts" | "tsx") {
            return Err(Error::PrecompiledTemplateRequired {
                path: source.display().to_string(),
            });
        }
        if matches!(extension, "js" | "jsx") {
            return Ok(Strategy::Template);
        }
        // a `$` name with a non-script extension is just an odd filename
    }

    if is_script_extension(extension) && file_contains_marker(source)? {
        return Ok(Strategy::Compile);
    }

    Ok(Strategy::Copy)
}

/// Checks the raw file text for the conditional-compilation marker token.
fn file_contains_marker(source: &Path) -> Result<bool> {
    let bytes = fs::read(source)?;
    Ok(String::from_utf8_lossy(&bytes).contains(MARKER_TOKEN))
}
