//! Whole-run aggregate of projects, search paths and libraries.
//!
//! A [`Solution`] only ever grows: projects, include paths and libraries are
//! appended (deduplicated) and nothing is rewritten. Library names are stored
//! bare; decoration for a platform and link variant happens when they are
//! read, so one solution can feed several backends.

use crate::platform::{LinkVariant, Platform};
use crate::project::Project;
use ddsgen_core::Language;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Solution {
    language: Language,
    platform: Option<Platform>,
    version: String,
    projects: Vec<Project>,
    include_paths: Vec<String>,
    library_paths: Vec<String>,
    libraries: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl Solution {
    /// `platform` is the example/build target, if one was requested.
    pub fn new(language: Language, platform: Option<Platform>, version: impl Into<String>) -> Self {
        Self {
            language,
            platform,
            version: version.into(),
            projects: Vec::new(),
            include_paths: Vec::new(),
            library_paths: Vec::new(),
            libraries: Vec::new(),
        }
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn platform(&self) -> Option<&Platform> {
        self.platform.as_ref()
    }

    /// Middleware version used for versioned library names.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Append a project. Projects keep the order the input files were given.
    pub fn add_project(&mut self, project: Project) {
        self.projects.push(project);
    }

    pub fn add_include(&mut self, path: impl Into<String>) {
        push_unique(&mut self.include_paths, path.into());
    }

    pub fn add_library_path(&mut self, path: impl Into<String>) {
        push_unique(&mut self.library_paths, path.into());
    }

    /// Add a library by its bare name (`fastrtps`).
    pub fn add_library(&mut self, name: impl Into<String>) {
        push_unique(&mut self.libraries, name.into());
    }

    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    #[must_use]
    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name() == name)
    }

    #[must_use]
    pub fn include_paths(&self) -> &[String] {
        &self.include_paths
    }

    #[must_use]
    pub fn library_paths(&self) -> &[String] {
        &self.library_paths
    }

    /// Bare library names in the order they were added.
    #[must_use]
    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }

    /// Library names decorated for `platform` and `variant`.
    #[must_use]
    pub fn decorated_libraries(&self, platform: &Platform, variant: LinkVariant) -> Vec<String> {
        self.libraries
            .iter()
            .map(|name| platform.decorate_library(name, &self.version, variant))
            .collect()
    }

    /// Whether any project selected a topic.
    #[must_use]
    pub fn has_any_topic(&self) -> bool {
        self.projects.iter().any(Project::has_topic)
    }

    /// All projects ordered so that every project comes after the projects it
    /// depends on. Independent projects keep their insertion order.
    /// Dependencies that name no project in the solution are external and
    /// ignored here.
    #[must_use]
    pub fn dependency_order(&self) -> Vec<&Project> {
        let mut marks = HashMap::new();
        let mut order = Vec::with_capacity(self.projects.len());
        for project in &self.projects {
            self.visit(project, &mut marks, &mut order);
        }
        order
    }

    /// Transitive in-solution dependencies of `name`, dependencies first, not
    /// including the project itself.
    #[must_use]
    pub fn closure(&self, name: &str) -> Vec<&Project> {
        let Some(root) = self.project(name) else {
            return Vec::new();
        };
        let mut marks = HashMap::new();
        let mut order = Vec::new();
        self.visit(root, &mut marks, &mut order);
        order.retain(|p| p.name() != name);
        order
    }

    /// Dependency names of `name` that resolve to no project in the solution.
    #[must_use]
    pub fn external_dependencies(&self, name: &str) -> Vec<String> {
        self.project(name)
            .map(|p| {
                p.dependency_names()
                    .filter(|dep| self.project(dep).is_none())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn visit<'a>(
        &'a self,
        project: &'a Project,
        marks: &mut HashMap<&'a str, Mark>,
        order: &mut Vec<&'a Project>,
    ) {
        match marks.get(project.name()) {
            Some(Mark::Done) => return,
            Some(Mark::Visiting) => {
                warn!(
                    project = project.name(),
                    "include cycle between projects, ordering edge ignored"
                );
                return;
            }
            None => {}
        }

        marks.insert(project.name(), Mark::Visiting);
        for dep in project.dependency_names() {
            if let Some(dep) = self.project(&dep) {
                self.visit(dep, marks, order);
            }
        }
        marks.insert(project.name(), Mark::Done);
        order.push(project);
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
#[path = "solution/solution_tests.rs"]
mod solution_tests;
