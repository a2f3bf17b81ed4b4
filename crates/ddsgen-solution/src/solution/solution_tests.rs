#![allow(non_snake_case)]

use super::*;
use std::path::PathBuf;

fn project(name: &str, deps: &[&str]) -> Project {
    Project::new(name, format!("{name}.idl"))
        .with_dependencies(deps.iter().map(|d| PathBuf::from(format!("{d}.idl"))))
}

fn names(projects: Vec<&Project>) -> Vec<&str> {
    projects.into_iter().map(Project::name).collect()
}

fn solution(projects: Vec<Project>) -> Solution {
    let mut solution = Solution::new(Language::Cpp, None, "1.5");
    for p in projects {
        solution.add_project(p);
    }
    solution
}

// ============================================================================
// Accumulation
// ============================================================================

#[test]
fn Solution___add_include___deduplicates_in_order() {
    let mut solution = Solution::new(Language::Cpp, None, "");

    solution.add_include("$(FASTRTPSHOME)/include");
    solution.add_include("$(JAVA_HOME)/include");
    solution.add_include("$(FASTRTPSHOME)/include");

    assert_eq!(
        solution.include_paths(),
        ["$(FASTRTPSHOME)/include", "$(JAVA_HOME)/include"]
    );
}

#[test]
fn Solution___add_library___stores_bare_names() {
    let mut solution = Solution::new(Language::Cpp, None, "1.5");

    solution.add_library("fastcdr");
    solution.add_library("fastrtps");
    solution.add_library("fastcdr");

    assert_eq!(solution.libraries(), ["fastcdr", "fastrtps"]);
}

#[test]
fn Solution___decorated_libraries___computed_per_platform_on_read() {
    let mut solution = Solution::new(Language::Cpp, None, "1.5");
    solution.add_library("fastrtps");
    let debug_static = LinkVariant {
        debug: true,
        shared: false,
    };

    let windows = solution.decorated_libraries(&Platform::new("i86Win32VS2015"), debug_static);
    let linux =
        solution.decorated_libraries(&Platform::new("i86Linux2.6gcc"), LinkVariant::RELEASE);

    assert_eq!(windows, ["libfastrtpsd-1.5"]);
    assert_eq!(linux, ["fastrtps"]);
    assert_eq!(solution.libraries(), ["fastrtps"]);
}

#[test]
fn Solution___has_any_topic___reflects_projects() {
    let mut solution = solution(vec![project("A", &[])]);
    assert!(!solution.has_any_topic());

    solution.add_project(project("B", &[]).with_topic(true));

    assert!(solution.has_any_topic());
}

// ============================================================================
// Dependency closure
// ============================================================================

#[test]
fn Solution___dependency_order___puts_dependency_first() {
    let solution = solution(vec![project("B", &["A"]), project("A", &[])]);

    assert_eq!(names(solution.dependency_order()), ["A", "B"]);
}

#[test]
fn Solution___dependency_order___keeps_insertion_order_when_independent() {
    let solution = solution(vec![project("C", &[]), project("A", &[]), project("B", &[])]);

    assert_eq!(names(solution.dependency_order()), ["C", "A", "B"]);
}

#[test]
fn Solution___dependency_order___ignores_external_names() {
    let solution = solution(vec![project("A", &["Vendor"]), project("B", &["A"])]);

    assert_eq!(names(solution.dependency_order()), ["A", "B"]);
    assert_eq!(solution.external_dependencies("A"), ["Vendor"]);
    assert!(solution.external_dependencies("B").is_empty());
}

#[test]
fn Solution___dependency_order___survives_cycles() {
    let solution = solution(vec![project("A", &["B"]), project("B", &["A"])]);

    let order = names(solution.dependency_order());

    assert_eq!(order.len(), 2);
}

#[test]
fn Solution___closure___is_transitive_and_excludes_self() {
    let solution = solution(vec![
        project("Base", &[]),
        project("Mid", &["Base"]),
        project("Top", &["Mid"]),
        project("Other", &[]),
    ]);

    assert_eq!(names(solution.closure("Top")), ["Base", "Mid"]);
    assert!(solution.closure("Base").is_empty());
    assert!(solution.closure("Missing").is_empty());
}
