//! Target path resolution for overlay files.
//! Maps a source path under an overlay root to its canonical output-relative
//! path. Resolution is pure: no file system access, same input always yields
//! the same target.

use crate::error::{Error, Result};
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

/// Directory segments with this prefix only group files under a feature tag;
/// they are dropped from the output path.
pub const TAG_SEGMENT_PREFIX: &str = "@";

/// Matches a `$`- or `$$`-marked template filename and captures the semantic
/// name, discarding the trailing script extension: `$package.json.js` →
/// `package.json`.
fn template_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\$\$?(.*)\.[tj]sx?$").unwrap())
}

/// Resolves the output path for a source file.
///
/// Rules, applied in order:
/// 1. the path is taken relative to its overlay root;
/// 2. tag directory segments (`@name`) are dropped;
/// 3. the final segment loses at most one leading `$`/`$$` marker together
///    with its script extension;
/// 4. the remainder is joined onto the output root.
///
/// # Errors
/// * `Error::Config` if the source path is not under the overlay root or is
///   not valid UTF-8
pub fn resolve_target_path(
    source: &Path,
    overlay_root: &Path,
    output_root: &Path,
) -> Result<PathBuf> {
    let relative = source.strip_prefix(overlay_root).map_err(|_| {
        Error::Config(format!(
            "'{}' is not under overlay root '{}'",
            source.display(),
            overlay_root.display()
        ))
    })?;

    let components: Vec<Component> = relative.components().collect();
    let mut target = output_root.to_path_buf();

    for (index, component) in components.iter().enumerate() {
        let segment = component.as_os_str().to_str().ok_or_else(|| {
            Error::Config(format!("Invalid path: {}", source.display()))
        })?;

        if index + 1 < components.len() {
            // directory segment
            if segment.starts_with(TAG_SEGMENT_PREFIX) {
                continue;
            }
            target.push(segment);
        } else if let Some(captures) = template_name_re().captures(segment) {
            target.push(&captures[1]);
        } else {
            target.push(segment);
        }
    }

    Ok(target)
}
