use std::fs;
use std::path::PathBuf;
use strata::dispatch::{select_strategy, Strategy};
use strata::error::Error;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_reserved_names_are_ignored() {
    let dir = TempDir::new().unwrap();
    let chunk = write(&dir, "chunk-vendor.js", "export {};");
    let asset = write(&dir, "asset-logo.png", "");
    let hash = write(&dir, "#notes.txt", "internal");

    assert_eq!(select_strategy(&chunk).unwrap(), Strategy::Ignore);
    assert_eq!(select_strategy(&asset).unwrap(), Strategy::Ignore);
    assert_eq!(select_strategy(&hash).unwrap(), Strategy::Ignore);
}

#[test]
fn test_ignore_prefix_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let chunk = write(&dir, "Chunk-vendor.js", "export {};");
    assert_eq!(select_strategy(&chunk).unwrap(), Strategy::Ignore);
}

#[test]
fn test_typed_script_template_requires_precompilation() {
    let dir = TempDir::new().unwrap();
    let ts = write(&dir, "$page.ts", "export default () => null;");
    let tsx = write(&dir, "$page.tsx", "export default () => null;");

    assert!(matches!(
        select_strategy(&ts),
        Err(Error::PrecompiledTemplateRequired { .. })
    ));
    assert!(matches!(
        select_strategy(&tsx),
        Err(Error::PrecompiledTemplateRequired { .. })
    ));
}

#[test]
fn test_executable_template_marker() {
    let dir = TempDir::new().unwrap();
    let js = write(&dir, "$package.json.js", "export default () => ({});");
    assert_eq!(select_strategy(&js).unwrap(), Strategy::Template);
}

#[test]
fn test_marker_file_is_compiled() {
    let dir = TempDir::new().unwrap();
    let guarded = write(
        &dir,
        "app.ts",
        r#"if (import.meta.STRATA_FRAMEWORK === "react") { console.log("react"); }"#,
    );
    assert_eq!(select_strategy(&guarded).unwrap(), Strategy::Compile);
}

#[test]
fn test_plain_files_are_copied() {
    let dir = TempDir::new().unwrap();
    let plain_script = write(&dir, "util.ts", "export const x = 1;");
    let markdown = write(&dir, "README.md", "# hello");
    // `$` with a non-script extension is just an odd filename
    let css = write(&dir, "$style.css", "body {}");

    assert_eq!(select_strategy(&plain_script).unwrap(), Strategy::Copy);
    assert_eq!(select_strategy(&markdown).unwrap(), Strategy::Copy);
    assert_eq!(select_strategy(&css).unwrap(), Strategy::Copy);
}

#[test]
fn test_ignore_takes_priority_over_template() {
    let dir = TempDir::new().unwrap();
    // `#`-prefixed even though `$`-markers and script extensions would match
    let path = write(&dir, "#$page.js", "export default () => null;");
    assert_eq!(select_strategy(&path).unwrap(), Strategy::Ignore);
}
