//! Generated-file manifest for one IDL compilation unit.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Role of a generated file within its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileRole {
    /// Type declarations and serialization, always generated.
    Common,
    /// Topic data-type support.
    Topic,
    Publisher,
    Subscriber,
    /// Runnable example entry point.
    Example,
    /// Native-interface shim for the managed binding.
    NativeInterface,
    /// Managed-language sources.
    Managed,
}

/// Headers and sources of one role, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleFiles {
    pub headers: Vec<String>,
    pub sources: Vec<String>,
}

/// Suffix keys for the IDE project identifiers of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidKind {
    Types,
    PublisherSubscriber,
    Jni,
}

impl GuidKind {
    fn suffix(&self) -> &'static str {
        match self {
            Self::Types => "Types",
            Self::PublisherSubscriber => "PublisherSubscriber",
            Self::Jni => "JNI",
        }
    }
}

/// One IDL input file and the files generated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    name: String,
    source_path: PathBuf,
    dependencies: BTreeSet<PathBuf>,
    files: BTreeMap<FileRole, RoleFiles>,
    has_topic: bool,
}

impl Project {
    /// A project named after the unit, with no files yet.
    pub fn new(name: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source_path: source_path.into(),
            dependencies: BTreeSet::new(),
            files: BTreeMap::new(),
            has_topic: false,
        }
    }

    /// IDL files this unit includes, as reported by the front-end.
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = PathBuf>) -> Self {
        self.dependencies.extend(dependencies);
        self
    }

    pub fn with_topic(mut self, has_topic: bool) -> Self {
        self.has_topic = has_topic;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    #[must_use]
    pub fn dependencies(&self) -> &BTreeSet<PathBuf> {
        &self.dependencies
    }

    /// Dependency project names: the file stem of each dependency.
    pub fn dependency_names(&self) -> impl Iterator<Item = String> + '_ {
        self.dependencies
            .iter()
            .filter_map(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
    }

    /// Whether the unit selected a topic, so publisher/subscriber artifacts
    /// exist for it.
    #[must_use]
    pub fn has_topic(&self) -> bool {
        self.has_topic
    }

    pub fn add_header(&mut self, role: FileRole, file: impl Into<String>) {
        self.files.entry(role).or_default().headers.push(file.into());
    }

    pub fn add_source(&mut self, role: FileRole, file: impl Into<String>) {
        self.files.entry(role).or_default().sources.push(file.into());
    }

    #[must_use]
    pub fn headers(&self, role: FileRole) -> &[String] {
        self.files
            .get(&role)
            .map(|f| f.headers.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn sources(&self, role: FileRole) -> &[String] {
        self.files
            .get(&role)
            .map(|f| f.sources.as_slice())
            .unwrap_or_default()
    }

    /// Roles that have at least one file.
    pub fn roles(&self) -> impl Iterator<Item = FileRole> + '_ {
        self.files.keys().copied()
    }

    /// Stable IDE project identifier for one of this unit's projects.
    #[must_use]
    pub fn guid(&self, kind: GuidKind) -> String {
        stable_guid(&format!("{}{}", self.source_path.display(), kind.suffix()))
    }
}

/// Deterministic GUID for a key, upper-case and hyphenated as IDE project
/// files expect. The same key always yields the same GUID.
#[must_use]
pub fn stable_guid(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
        .hyphenated()
        .to_string()
        .to_uppercase()
}

#[cfg(test)]
#[path = "project/project_tests.rs"]
mod project_tests;
