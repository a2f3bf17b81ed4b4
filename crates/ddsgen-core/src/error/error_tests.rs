#![allow(non_snake_case)]

use super::*;

#[test]
fn IdlError___file_not_found___displays_path() {
    let err = IdlError::FileNotFound(PathBuf::from("idl/Missing.idl"));

    assert_eq!(err.to_string(), "file not found: idl/Missing.idl");
}

#[test]
fn IdlError___syntax___displays_position() {
    let err = IdlError::syntax("Shapes.idl", 12, "expected ';'");

    assert_eq!(err.to_string(), "Shapes.idl:12: syntax error: expected ';'");
}

#[test]
fn IdlError___unresolved_type___names_scope() {
    let err = IdlError::UnresolvedType {
        name: "Point".into(),
        scope: "geo::shapes".into(),
    };

    let msg = err.to_string();
    assert!(msg.contains("'Point'"));
    assert!(msg.contains("'geo::shapes'"));
}

#[test]
fn IdlError___from_io_error___converts() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");

    let err: IdlError = io_err.into();

    assert!(matches!(err, IdlError::Io(_)));
}
