use std::io;

use strata::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::Io(_) => (),
        _ => panic!("Expected Io variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::PrecompiledTemplateRequired { path: "files/$page.ts".to_string() };
    assert_eq!(
        err.to_string(),
        "Template 'files/$page.ts' must be compiled before it can be executed."
    );

    let err = Error::UnsupportedExtension {
        path: "out/logo.svg".to_string(),
        extension: "svg".to_string(),
    };
    assert_eq!(err.to_string(), "Unsupported extension 'svg' for 'out/logo.svg'.");

    let err = Error::UnknownMarker {
        path: "src/app.ts".to_string(),
        marker: "STRATA_NOPE".to_string(),
    };
    assert_eq!(err.to_string(), "Unknown marker 'STRATA_NOPE' in 'src/app.ts'.");
}
