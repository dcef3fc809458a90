use strata::config::{find_config_file, load_metadata, Metadata};
use strata::eval::Value;
use tempfile::TempDir;

#[test]
fn test_load_metadata_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strata.json");
    std::fs::write(
        &path,
        r#"{"framework": "react", "database": "sqlite", "flags": {"auth": true}}"#,
    )
    .unwrap();

    let metadata = load_metadata(&path).unwrap();
    assert_eq!(metadata.framework, "react");
    assert_eq!(metadata.database.as_deref(), Some("sqlite"));
    assert_eq!(metadata.flags.get("auth"), Some(&true));
}

#[test]
fn test_load_metadata_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strata.yml");
    std::fs::write(&path, "framework: solid\nflags:\n  telemetry: false\n").unwrap();

    let metadata = load_metadata(&path).unwrap();
    assert_eq!(metadata.framework, "solid");
    assert_eq!(metadata.database, None);
    assert_eq!(metadata.flags.get("telemetry"), Some(&false));
}

#[test]
fn test_invalid_metadata_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strata.json");
    std::fs::write(&path, "framework: [unclosed").unwrap();

    assert!(load_metadata(&path).is_err());
}

#[test]
fn test_find_config_file_order() {
    let dir = TempDir::new().unwrap();
    assert_eq!(find_config_file(dir.path()), None);

    std::fs::write(dir.path().join("strata.yaml"), "framework: react\n").unwrap();
    assert_eq!(find_config_file(dir.path()), Some(dir.path().join("strata.yaml")));

    // json wins over yaml when both exist
    std::fs::write(dir.path().join("strata.json"), "{\"framework\": \"react\"}").unwrap();
    assert_eq!(find_config_file(dir.path()), Some(dir.path().join("strata.json")));
}

#[test]
fn test_marker_values() {
    let mut metadata = Metadata::new("react", Some("sqlite".to_string()));
    metadata.flags.insert("auth".to_string(), true);

    assert_eq!(
        metadata.marker_value("STRATA_FRAMEWORK"),
        Some(Value::Str("react".to_string()))
    );
    assert_eq!(
        metadata.marker_value("STRATA_DATABASE"),
        Some(Value::Str("sqlite".to_string()))
    );
    assert_eq!(metadata.marker_value("STRATA_AUTH"), Some(Value::Bool(true)));
    assert_eq!(metadata.marker_value("STRATA_UNKNOWN"), None);
    // markers live in a reserved namespace
    assert_eq!(metadata.marker_value("FRAMEWORK"), None);
}

#[test]
fn test_missing_database_is_null() {
    let metadata = Metadata::new("react", None);
    assert_eq!(metadata.marker_value("STRATA_DATABASE"), Some(Value::Null));
}
