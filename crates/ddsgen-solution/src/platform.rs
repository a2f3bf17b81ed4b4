//! Target platforms and the build backend each one selects.
//!
//! A platform identifier such as `x64Win64VS2015` encodes the architecture in
//! its first three characters and the operating-system family right after
//! them. The backend, the IDE toolset and the library decoration are all
//! derived from the identifier on demand.

use crate::{SolutionError, SolutionResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platforms known when no explicit list is configured.
pub const BUILTIN_PLATFORMS: &[&str] = &[
    "i86Win32VS2013",
    "x64Win64VS2013",
    "i86Win32VS2015",
    "x64Win64VS2015",
    "i86Linux2.6gcc",
    "x64Linux2.6gcc",
    "armLinux2.6gcc",
    "CMake",
];

const CMAKE: &str = "CMake";

/// A validated target platform identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Platform {
    id: String,
}

/// Architecture prefix of a platform identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    I86,
    X64,
    Arm,
    Other,
}

impl Platform {
    /// Wrap an identifier without checking it against a registry.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn arch(&self) -> Arch {
        match self.id.get(..3) {
            Some("i86") => Arch::I86,
            Some("x64") => Arch::X64,
            Some("arm") => Arch::Arm,
            _ => Arch::Other,
        }
    }

    /// `???Win...`
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.id.get(3..6) == Some("Win")
    }

    /// `???Linux...`
    #[must_use]
    pub fn is_linux(&self) -> bool {
        self.id.get(3..8) == Some("Linux")
    }

    #[must_use]
    pub fn is_cmake(&self) -> bool {
        self.id == CMAKE
    }

    /// Build backend for this platform.
    pub fn backend(&self) -> SolutionResult<Backend> {
        if self.is_cmake() {
            return Ok(Backend::CMake);
        }

        if self.is_windows() {
            let target = match self.arch() {
                Arch::I86 => VsTarget::Win32,
                Arch::X64 => VsTarget::X64,
                _ => return Err(SolutionError::UnsupportedBackend(self.id.clone())),
            };
            let toolset = if self.id.ends_with('3') {
                VsToolset::V12
            } else {
                VsToolset::V14
            };
            return Ok(Backend::VisualStudio { toolset, target });
        }

        if self.is_linux() {
            let arch_flag = match self.arch() {
                Arch::I86 => "-m32",
                Arch::X64 => "-m64",
                Arch::Arm => "",
                Arch::Other => return Err(SolutionError::UnsupportedBackend(self.id.clone())),
            };
            return Ok(Backend::Makefile { arch_flag });
        }

        Err(SolutionError::UnsupportedBackend(self.id.clone()))
    }

    /// Decorate a library name for linking on this platform.
    ///
    /// - IDE targets: `lib` prefix for static linking, `d` suffix for debug,
    ///   `-<version>` suffix when a version is given (`libfastrtpsd-1.5`)
    /// - makefile targets: `d` suffix for debug
    /// - cross-platform descriptions: the plain name
    #[must_use]
    pub fn decorate_library(&self, name: &str, version: &str, variant: LinkVariant) -> String {
        let debug = if variant.debug { "d" } else { "" };
        if self.is_windows() {
            let prefix = if variant.shared { "" } else { "lib" };
            let version = if version.is_empty() {
                String::new()
            } else {
                format!("-{version}")
            };
            format!("{prefix}{name}{debug}{version}")
        } else if self.is_linux() {
            format!("{name}{debug}")
        } else {
            name.to_string()
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Build-system backend selected by a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// `CMakeLists.txt`
    CMake,
    /// IDE solution plus project pairs.
    VisualStudio { toolset: VsToolset, target: VsTarget },
    /// `makefile_<platform>`
    Makefile { arch_flag: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VsToolset {
    V12,
    V14,
}

impl VsToolset {
    /// Platform toolset number (`12`, `14`).
    #[must_use]
    pub fn version(&self) -> &'static str {
        match self {
            Self::V12 => "12",
            Self::V14 => "14",
        }
    }

    /// Product year written into the solution header.
    #[must_use]
    pub fn year(&self) -> &'static str {
        match self {
            Self::V12 => "2013",
            Self::V14 => "2015",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VsTarget {
    Win32,
    X64,
}

impl VsTarget {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win32 => "Win32",
            Self::X64 => "x64",
        }
    }
}

/// How a library is linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkVariant {
    pub debug: bool,
    pub shared: bool,
}

impl LinkVariant {
    pub const RELEASE: Self = Self {
        debug: false,
        shared: true,
    };
}

impl Default for LinkVariant {
    fn default() -> Self {
        Self::RELEASE
    }
}

/// One IDE build configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VsConfiguration {
    pub name: &'static str,
    pub target: VsTarget,
    pub debug: bool,
    pub dll: bool,
}

impl VsConfiguration {
    /// The four standard configurations for `target`. A fresh list is built
    /// for every call.
    #[must_use]
    pub fn standard(target: VsTarget) -> Vec<Self> {
        [
            ("Debug DLL", true, true),
            ("Release DLL", false, true),
            ("Debug", true, false),
            ("Release", false, false),
        ]
        .into_iter()
        .map(|(name, debug, dll)| Self {
            name,
            target,
            debug,
            dll,
        })
        .collect()
    }

    /// `Debug DLL|x64`
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}|{}", self.name, self.target.as_str())
    }

    #[must_use]
    pub fn variant(&self) -> LinkVariant {
        LinkVariant {
            debug: self.debug,
            shared: self.dll,
        }
    }
}

/// The list of platforms accepted for `--example`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRegistry {
    known: Vec<String>,
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PlatformRegistry {
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_list(BUILTIN_PLATFORMS.iter().copied())
    }

    /// Registry with an explicit list, replacing the built-in one.
    pub fn from_list<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut known: Vec<String> = Vec::new();
        for id in ids {
            let id = id.into();
            if !known.contains(&id) {
                known.push(id);
            }
        }
        Self { known }
    }

    /// Look up a platform by identifier. Matching is exact.
    pub fn parse(&self, id: &str) -> SolutionResult<Platform> {
        if self.contains(id) {
            Ok(Platform::new(id))
        } else {
            Err(SolutionError::UnknownPlatform(id.to_string()))
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.known.iter().any(|k| k == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(String::as_str)
    }
}
