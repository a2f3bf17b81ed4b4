#![allow(non_snake_case)]

use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn ArtifactWriter___new_file___is_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Shapes.h");

    let outcome = ArtifactWriter::new(false).write(&path, "// types\n").unwrap();

    assert_eq!(outcome, WriteOutcome::Written);
    assert_eq!(fs::read_to_string(&path).unwrap(), "// types\n");
}

#[test]
fn ArtifactWriter___existing_file_without_overwrite___is_kept() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Shapes.h");
    fs::write(&path, "// hand edited\n").unwrap();

    let outcome = ArtifactWriter::new(false).write(&path, "// fresh\n").unwrap();

    assert_eq!(outcome, WriteOutcome::Skipped);
    assert_eq!(fs::read_to_string(&path).unwrap(), "// hand edited\n");
}

#[test]
fn ArtifactWriter___existing_file_with_overwrite___is_replaced() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Shapes.h");
    fs::write(&path, "// hand edited, much longer than the new content\n").unwrap();

    let outcome = ArtifactWriter::new(true).write(&path, "// fresh\n").unwrap();

    assert_eq!(outcome, WriteOutcome::Written);
    assert_eq!(fs::read_to_string(&path).unwrap(), "// fresh\n");
}

#[test]
fn ArtifactWriter___missing_directory___is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("Shapes.h");

    let err = ArtifactWriter::new(true).write(&path, "x").unwrap_err();

    assert!(matches!(err, GenerateError::Io { .. }));
    assert!(!err.is_unit_local());
}

#[test]
fn ArtifactWriter___write___leaves_no_temporary_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Shapes.cxx");

    ArtifactWriter::new(true).write(&path, "a").unwrap();
    ArtifactWriter::new(true).write(&path, "b").unwrap();

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[cfg(unix)]
#[test]
fn ArtifactWriter___written_file___is_world_readable() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Shapes.h");

    ArtifactWriter::new(false).write(&path, "x").unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}
