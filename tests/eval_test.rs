use strata::config::Metadata;
use strata::eval::{evaluate, CondError};

fn metadata() -> Metadata {
    let mut metadata = Metadata::new("react", Some("sqlite".to_string()));
    metadata.flags.insert("auth".to_string(), true);
    metadata.flags.insert("telemetry".to_string(), false);
    metadata
}

#[test]
fn test_framework_equality() {
    let meta = metadata();
    assert!(evaluate(r#"import.meta.STRATA_FRAMEWORK === "react""#, &meta).unwrap());
    assert!(!evaluate(r#"import.meta.STRATA_FRAMEWORK === "solid""#, &meta).unwrap());
    assert!(evaluate(r#"import.meta.STRATA_FRAMEWORK !== "solid""#, &meta).unwrap());
}

#[test]
fn test_single_quoted_strings() {
    let meta = metadata();
    assert!(evaluate("import.meta.STRATA_FRAMEWORK === 'react'", &meta).unwrap());
}

#[test]
fn test_database_none_is_null() {
    let meta = Metadata::new("react", None);
    assert!(evaluate("import.meta.STRATA_DATABASE === null", &meta).unwrap());
    assert!(evaluate("import.meta.STRATA_DATABASE === undefined", &meta).unwrap());
    assert!(!evaluate(r#"import.meta.STRATA_DATABASE === "sqlite""#, &meta).unwrap());
    assert!(evaluate(r#"import.meta.STRATA_DATABASE !== "sqlite""#, &meta).unwrap());
}

#[test]
fn test_boolean_flags() {
    let meta = metadata();
    assert!(evaluate("import.meta.STRATA_AUTH", &meta).unwrap());
    assert!(!evaluate("import.meta.STRATA_TELEMETRY", &meta).unwrap());
    assert!(evaluate("!import.meta.STRATA_TELEMETRY", &meta).unwrap());
    assert!(evaluate("import.meta.STRATA_AUTH === true", &meta).unwrap());
}

#[test]
fn test_logical_operators() {
    let meta = metadata();
    assert!(evaluate(
        r#"import.meta.STRATA_FRAMEWORK === "react" && import.meta.STRATA_DATABASE === "sqlite""#,
        &meta
    )
    .unwrap());
    assert!(evaluate(
        r#"import.meta.STRATA_FRAMEWORK === "solid" || import.meta.STRATA_AUTH"#,
        &meta
    )
    .unwrap());
    assert!(!evaluate(
        r#"import.meta.STRATA_FRAMEWORK === "solid" && import.meta.STRATA_AUTH"#,
        &meta
    )
    .unwrap());
}

#[test]
fn test_parenthesization() {
    let meta = metadata();
    assert!(evaluate(
        r#"(import.meta.STRATA_FRAMEWORK === "react") && (import.meta.STRATA_AUTH || import.meta.STRATA_TELEMETRY)"#,
        &meta
    )
    .unwrap());
    assert!(evaluate(r#"!(import.meta.STRATA_FRAMEWORK === "solid")"#, &meta).unwrap());
}

#[test]
fn test_marker_truthiness() {
    // a string-valued marker is truthy on its own
    let meta = metadata();
    assert!(evaluate("import.meta.STRATA_FRAMEWORK", &meta).unwrap());

    let no_db = Metadata::new("react", None);
    assert!(!evaluate("import.meta.STRATA_DATABASE", &no_db).unwrap());
    assert!(evaluate("!import.meta.STRATA_DATABASE", &no_db).unwrap());
}

#[test]
fn test_unknown_marker_is_fatal() {
    let meta = metadata();
    let result = evaluate("import.meta.STRATA_NOPE", &meta);
    assert_eq!(result, Err(CondError::UnknownMarker("STRATA_NOPE".to_string())));
}

#[test]
fn test_unsupported_constructs_are_fatal() {
    let meta = metadata();

    // loose equality is outside the grammar
    assert!(matches!(
        evaluate(r#"import.meta.STRATA_FRAMEWORK == "react""#, &meta),
        Err(CondError::Unsupported(_))
    ));

    // method calls are outside the grammar
    assert!(matches!(
        evaluate(r#"import.meta.STRATA_FRAMEWORK.startsWith("re")"#, &meta),
        Err(CondError::Unsupported(_))
    ));

    // bare identifiers are outside the grammar
    assert!(matches!(
        evaluate("framework", &meta),
        Err(CondError::Unsupported(_))
    ));

    // arithmetic is outside the grammar
    assert!(matches!(evaluate("1 + 1", &meta), Err(CondError::Unsupported(_))));
}

#[test]
fn test_empty_expression_is_fatal() {
    let meta = metadata();
    assert!(matches!(evaluate("", &meta), Err(CondError::Unsupported(_))));
}
