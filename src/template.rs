//! Template modules and output serialization.
//!
//! A template module is the registered generator behind a `$`-marked source
//! file: it produces the *content* of its target path instead of being
//! copied there. Generators are plain Rust implementations of
//! [`TemplateModule`] looked up through a [`TemplateRegistry`] keyed by the
//! overlay-relative source path, which keeps template execution an explicit
//! mapping rather than ambient code loading.

use crate::config::Metadata;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::path::Path;

/// Deferred read of the content an earlier overlay already produced at the
/// same target path. Handed to a generator only when such content exists.
pub type PriorContent = Box<dyn FnOnce() -> Result<String>>;

/// What a template generator produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    /// Plain text, written through unchanged for script and env targets
    Text(String),
    /// Structured data, pretty-printed for manifest targets
    Json(serde_json::Value),
    /// The explicit "produce nothing" signal: no file is written, but the
    /// target path still counts as claimed by this overlay
    Skip,
}

/// A generator producing the content for one target path.
pub trait TemplateModule {
    /// Generates the target content.
    ///
    /// # Arguments
    /// * `prior` - Accessor for the content a previously processed overlay
    ///   wrote at the same target path; `None` when this overlay is the
    ///   first to produce it
    /// * `metadata` - The run's feature selections
    fn generate(&self, prior: Option<PriorContent>, metadata: &Metadata) -> Result<Generated>;
}

impl<F> TemplateModule for F
where
    F: Fn(Option<PriorContent>, &Metadata) -> Result<Generated>,
{
    fn generate(&self, prior: Option<PriorContent>, metadata: &Metadata) -> Result<Generated> {
        self(prior, metadata)
    }
}

/// Explicit mapping from overlay-relative source paths to their generators.
#[derive(Default)]
pub struct TemplateRegistry {
    modules: IndexMap<String, Box<dyn TemplateModule>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self { modules: IndexMap::new() }
    }

    /// Registers a generator under a source path: either overlay-relative
    /// (`files/$package.json.js`, shared by every overlay with that layout)
    /// or the full source path of one overlay's file, which takes priority
    /// at lookup. A later registration for the same path replaces the
    /// earlier one.
    pub fn register(
        &mut self,
        source_path: impl Into<String>,
        module: impl TemplateModule + 'static,
    ) {
        self.modules.insert(normalize_key(&source_path.into()), Box::new(module));
    }

    pub fn get(&self, source_path: &str) -> Option<&dyn TemplateModule> {
        self.modules.get(&normalize_key(source_path)).map(|module| module.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Registry keys always use forward slashes, whatever the platform.
fn normalize_key(path: &str) -> String {
    path.replace('\\', "/")
}

/// Computes the registry key for a source file: its path relative to the
/// overlay root, forward-slash normalized.
pub fn registry_key(source: &Path, overlay_root: &Path) -> Result<String> {
    let relative = source.strip_prefix(overlay_root).map_err(|_| {
        Error::Config(format!(
            "'{}' is not under overlay root '{}'",
            source.display(),
            overlay_root.display()
        ))
    })?;
    let relative = relative
        .to_str()
        .ok_or_else(|| Error::Config(format!("Invalid path: {}", source.display())))?;
    Ok(normalize_key(relative))
}

/// Serializes generated content according to the target path's extension.
///
/// # Returns
/// * `Ok(Some(text))` - serialized content to write
/// * `Ok(None)` - the generator signalled "produce nothing"
///
/// # Errors
/// * `Error::UnsupportedExtension` when the target extension has no defined
///   serialization; raised before anything is written for the path
/// * `Error::Template` when structured data targets a plain-text extension
pub fn serialize_output(target: &Path, generated: Generated) -> Result<Option<String>> {
    let generated = match generated {
        Generated::Skip => return Ok(None),
        other => other,
    };

    // dotfiles like `.env` have no extension in the path sense; their whole
    // name stands in for one
    let extension = target
        .extension()
        .and_then(|e| e.to_str())
        .or_else(|| target.file_name().and_then(|n| n.to_str()).map(|n| n.trim_start_matches('.')))
        .unwrap_or("");

    match extension {
        "ts" | "tsx" | "js" | "jsx" | "env" => match generated {
            Generated::Text(text) => Ok(Some(text)),
            Generated::Json(_) => Err(Error::Template(format!(
                "structured content cannot target '{}'",
                target.display()
            ))),
            Generated::Skip => unreachable!(),
        },
        "json" => {
            let value = match generated {
                Generated::Json(value) => value,
                Generated::Text(text) => serde_json::Value::String(text),
                Generated::Skip => unreachable!(),
            };
            let pretty = serde_json::to_string_pretty(&value)
                .map_err(|e| Error::Template(e.to_string()))?;
            Ok(Some(pretty))
        }
        _ => Err(Error::UnsupportedExtension {
            path: target.display().to_string(),
            extension: extension.to_string(),
        }),
    }
}
