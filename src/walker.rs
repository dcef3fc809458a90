//! Overlay directory traversal.
//! Yields every regular file under one overlay root in a stable, name-sorted
//! order so that repeated runs over identical inputs produce identical
//! output trees.

use crate::error::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lazily enumerates the regular files under an overlay root.
///
/// Entries that are neither files nor directories (sockets, broken links)
/// are skipped. A nonexistent root yields nothing rather than an error, so
/// optional overlays cost callers no special casing.
pub fn walk(root: &Path) -> Box<dyn Iterator<Item = Result<PathBuf>>> {
    if !root.exists() {
        return Box::new(std::iter::empty());
    }

    let entries = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    Some(Ok(entry.path().to_path_buf()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e.into())),
        });

    Box::new(entries)
}
