#![allow(non_snake_case)]

use super::*;

#[test]
fn Project___new___has_no_files() {
    let project = Project::new("Shapes", "idl/Shapes.idl");

    assert_eq!(project.roles().count(), 0);
    assert!(project.headers(FileRole::Common).is_empty());
    assert!(!project.has_topic());
}

#[test]
fn Project___add_files___grouped_by_role_in_order() {
    let mut project = Project::new("Shapes", "Shapes.idl");

    project.add_header(FileRole::Common, "Shapes.h");
    project.add_source(FileRole::Common, "Shapes.cxx");
    project.add_header(FileRole::Common, "ShapesTypeObject.h");
    project.add_header(FileRole::Topic, "ShapesPubSubTypes.h");

    assert_eq!(project.headers(FileRole::Common), ["Shapes.h", "ShapesTypeObject.h"]);
    assert_eq!(project.sources(FileRole::Common), ["Shapes.cxx"]);
    assert!(project.sources(FileRole::Topic).is_empty());
    assert_eq!(
        project.roles().collect::<Vec<_>>(),
        [FileRole::Common, FileRole::Topic]
    );
}

#[test]
fn Project___dependency_names___are_file_stems() {
    let project = Project::new("Shapes", "Shapes.idl")
        .with_dependencies(["idl/Common.idl".into(), "Color.idl".into()]);

    let names: Vec<_> = project.dependency_names().collect();

    assert_eq!(names, ["Color", "Common"]);
}

#[test]
fn Project___guid___is_stable_across_instances() {
    let a = Project::new("Shapes", "idl/Shapes.idl");
    let b = Project::new("Shapes", "idl/Shapes.idl");

    assert_eq!(a.guid(GuidKind::Types), b.guid(GuidKind::Types));
}

#[test]
fn Project___guid___differs_per_kind_and_path() {
    let a = Project::new("Shapes", "idl/Shapes.idl");
    let b = Project::new("Shapes", "other/Shapes.idl");

    assert_ne!(a.guid(GuidKind::Types), a.guid(GuidKind::PublisherSubscriber));
    assert_ne!(a.guid(GuidKind::Types), a.guid(GuidKind::Jni));
    assert_ne!(a.guid(GuidKind::Types), b.guid(GuidKind::Types));
}

#[test]
fn stable_guid___format___is_upper_case_hyphenated() {
    let guid = stable_guid("Shapes.idlTypes");

    assert_eq!(guid.len(), 36);
    assert_eq!(guid.matches('-').count(), 4);
    assert_eq!(guid, guid.to_uppercase());
}

#[test]
fn Project___serialize___uses_kebab_case_roles() {
    let mut project = Project::new("Shapes", "Shapes.idl");
    project.add_header(FileRole::NativeInterface, "ShapesPubSubJNII.h");

    let json = serde_json::to_value(&project).unwrap();

    assert!(json["files"]["native-interface"]["headers"].is_array());
}
