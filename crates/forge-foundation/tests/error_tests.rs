//! Tests for error handling

use forge_foundation::{ForgeError, ForgeResult, SourceLocation};
use std::io;
use std::path::PathBuf;

#[test]
fn test_error_chain() {
    fn inner_function() -> Result<(), io::Error> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "Access denied",
        ))
    }

    fn outer_function() -> ForgeResult<()> {
        inner_function().map_err(|e| ForgeError::io("Items/MightyBlade.cs", e))?;
        Ok(())
    }

    let error = outer_function().unwrap_err();
    match error {
        ForgeError::Io { path, source } => {
            assert_eq!(path, PathBuf::from("Items/MightyBlade.cs"));
            assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
        }
        _ => panic!("Expected IO error"),
    }
}

#[test]
fn test_io_error_exposes_source() {
    use std::error::Error;

    let error = ForgeError::io("out.cs", io::Error::new(io::ErrorKind::NotFound, "gone"));
    assert!(error.source().is_some());
    assert!(error.to_string().contains("out.cs"));

    let internal = ForgeError::internal("test");
    assert!(internal.source().is_none());
}

#[test]
fn test_error_helpers() {
    match ForgeError::class_not_found("MightyBlade", "TerraDota.Items") {
        ForgeError::ClassNotFound { class, namespace } => {
            assert_eq!(class, "MightyBlade");
            assert_eq!(namespace, "TerraDota.Items");
        }
        _ => panic!("Expected class not found error"),
    }

    match ForgeError::ambiguous("class", "MightyBlade", 2) {
        ForgeError::Ambiguous { kind, name, count } => {
            assert_eq!(kind, "class");
            assert_eq!(name, "MightyBlade");
            assert_eq!(count, 2);
        }
        _ => panic!("Expected ambiguity error"),
    }
}

#[test]
fn test_parse_error_display_includes_location() {
    let error = ForgeError::parse_at("unexpected token", 3, 7);
    assert_eq!(
        error.to_string(),
        "Parse error at line 3, column 7: unexpected token"
    );
    match error {
        ForgeError::Parse { location, .. } => assert_eq!(location, SourceLocation::new(3, 7)),
        _ => panic!("Expected parse error"),
    }
}

#[test]
fn test_error_kinds() {
    assert_eq!(ForgeError::config("bad namespace").kind(), "config");
    assert_eq!(ForgeError::descriptor("a.json", "not an object").kind(), "descriptor");
    assert_eq!(ForgeError::namespace_not_found("TerraDota.Items").kind(), "not_found");
    assert_eq!(ForgeError::base_type_mismatch("A", "ModItem", "Object").kind(), "base_type");
}
