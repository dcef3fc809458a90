//! Materialization engine.
//! Walks every overlay in declared order, dispatches each file, and writes
//! the output tree while tracking which overlay claimed which target path.

use crate::compiler;
use crate::config::Metadata;
use crate::dispatch::{select_strategy, Strategy};
use crate::error::{Error, Result};
use crate::resolve::resolve_target_path;
use crate::template::{
    registry_key, serialize_output, PriorContent, TemplateRegistry,
};
use crate::walker;
use indexmap::IndexMap;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Provenance record for one produced target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntry {
    /// Index into the overlay list of the overlay that last claimed the path
    pub overlay: usize,
    /// Whether content was actually written; a template returning the skip
    /// signal claims its path without producing a readable file
    pub has_content: bool,
}

/// One materialization run over a fixed overlay list and metadata.
///
/// Overlays are processed strictly in the declared order and later overlays
/// win: a later file overwrites a colliding target (surfaced as a warning),
/// and a later template can read what an earlier overlay wrote there. The
/// target map lives and dies with the run.
pub struct Engine {
    overlays: Vec<PathBuf>,
    output_root: PathBuf,
    metadata: Metadata,
    registry: TemplateRegistry,
    targets: IndexMap<PathBuf, TargetEntry>,
}

impl Engine {
    pub fn new(
        overlays: Vec<PathBuf>,
        output_root: impl Into<PathBuf>,
        metadata: Metadata,
        registry: TemplateRegistry,
    ) -> Self {
        Self {
            overlays,
            output_root: output_root.into(),
            metadata,
            registry,
            targets: IndexMap::new(),
        }
    }

    /// Materializes the full output tree.
    ///
    /// Any fatal error aborts the run immediately; files already written
    /// stay in place (no rollback).
    pub fn materialize(&mut self) -> Result<()> {
        let overlays = self.overlays.clone();
        for (overlay_index, overlay) in overlays.iter().enumerate() {
            debug!("Processing overlay: {}", overlay.display());
            for source in walker::walk(overlay) {
                self.process_file(overlay_index, overlay, &source?)?;
            }
        }
        Ok(())
    }

    /// Provenance of every target path produced so far.
    pub fn targets(&self) -> &IndexMap<PathBuf, TargetEntry> {
        &self.targets
    }

    fn process_file(
        &mut self,
        overlay_index: usize,
        overlay: &Path,
        source: &Path,
    ) -> Result<()> {
        let target = resolve_target_path(source, overlay, &self.output_root)?;

        match select_strategy(source)? {
            Strategy::Ignore => {
                debug!("Ignoring: {}", source.display());
            }
            Strategy::Template => {
                // full source path first (distinguishes overlays sharing a
                // relative layout), then the overlay-relative key
                let key = registry_key(source, overlay)?;
                let module = source
                    .to_str()
                    .and_then(|path| self.registry.get(path))
                    .or_else(|| self.registry.get(&key))
                    .ok_or_else(|| Error::TemplateNotRegistered {
                        path: source.display().to_string(),
                    })?;

                let prior = self.prior_content(&target);
                let generated = module.generate(prior, &self.metadata)?;

                match serialize_output(&target, generated)? {
                    Some(content) => {
                        debug!("Generating: {}", target.display());
                        write_file(&content, &target)?;
                        self.claim(target, overlay_index, true);
                    }
                    None => {
                        debug!("Template produced nothing for: {}", target.display());
                        self.claim(target, overlay_index, false);
                    }
                }
            }
            Strategy::Compile => {
                debug!("Compiling: {}", source.display());
                let text = fs::read_to_string(source)?;
                let compiled = compiler::compile(source, &text, &self.metadata)?;
                write_file(&compiled, &target)?;
                self.claim(target, overlay_index, true);
            }
            Strategy::Copy => {
                debug!("Copying: {}", source.display());
                copy_file(source, &target)?;
                self.claim(target, overlay_index, true);
            }
        }

        Ok(())
    }

    /// Deferred read of the content an earlier overlay wrote at this target,
    /// if any. A claimed-but-empty path yields no accessor.
    fn prior_content(&self, target: &Path) -> Option<PriorContent> {
        match self.targets.get(target) {
            Some(entry) if entry.has_content => {
                let path = target.to_path_buf();
                Some(Box::new(move || fs::read_to_string(&path).map_err(Error::Io)))
            }
            _ => None,
        }
    }

    /// Records the target path as produced by the given overlay, warning on
    /// collisions (the later overlay wins). A skip claim leaves any earlier
    /// overlay's file untouched on disk, so it keeps the entry readable.
    fn claim(&mut self, target: PathBuf, overlay_index: usize, has_content: bool) {
        let has_content = match self.targets.get(&target) {
            Some(previous) => {
                if previous.overlay != overlay_index {
                    warn!(
                        "'{}' produced by overlay '{}' overrides overlay '{}'",
                        target.display(),
                        self.overlays[overlay_index].display(),
                        self.overlays[previous.overlay].display(),
                    );
                }
                has_content || previous.has_content
            }
            None => has_content,
        };
        self.targets.insert(target, TargetEntry { overlay: overlay_index, has_content });
    }
}

fn write_file(content: &str, dest_path: &Path) -> Result<()> {
    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent).map_err(Error::Io)?;
    }
    fs::write(dest_path, content).map_err(Error::Io)
}

fn copy_file(source_path: &Path, dest_path: &Path) -> Result<()> {
    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent).map_err(Error::Io)?;
    }
    fs::copy(source_path, dest_path).map(|_| ()).map_err(Error::Io)
}
