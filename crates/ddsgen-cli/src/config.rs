//! Generator configuration
//!
//! Settings come from three places, highest precedence first: command-line
//! flags, the optional `ddsgen.toml` file, built-in defaults. They are merged
//! and validated once into a [`GeneratorConfig`] that the generator borrows
//! for the whole run.

use anyhow::{Context, Result, bail};
use ddsgen_core::{FeatureFlags, JavaPackage, Language};
use ddsgen_solution::{Platform, PlatformRegistry};
use ddsgen_toolchain::HostOs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variables consulted for the temp directory, in order.
const TEMP_DIR_VARS: &[&str] = &["TMPDIR", "TEMP", "TMP"];

/// `ddsgen.toml` contents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub generator: GeneratorSection,

    #[serde(default)]
    pub product: ProductSection,

    #[serde(default)]
    pub platforms: PlatformsSection,
}

impl ConfigFile {
    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read configuration: {:?}", path.as_ref()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }
}

/// Generator settings. Also used to carry command-line overrides, where an
/// unset field means "not given".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GeneratorSection {
    pub output_dir: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
    pub replace: Option<bool>,
    pub preprocessor: Option<PathBuf>,
    pub disable_preprocessor: Option<bool>,
    pub include_paths: Vec<PathBuf>,
    pub language: Option<Language>,
    pub package: Option<String>,
    pub example: Option<String>,
    pub typeobject: Option<bool>,
    pub export_symbols: Option<bool>,
    pub fusion: Option<bool>,
    pub javac: Option<PathBuf>,
    pub javah: Option<PathBuf>,
}

impl GeneratorSection {
    /// Fill every unset field from `base`. Include paths from `base` come
    /// first, followed by these.
    #[must_use]
    pub fn overlay(self, base: GeneratorSection) -> GeneratorSection {
        let mut include_paths = base.include_paths;
        for path in self.include_paths {
            if !include_paths.contains(&path) {
                include_paths.push(path);
            }
        }

        GeneratorSection {
            output_dir: self.output_dir.or(base.output_dir),
            temp_dir: self.temp_dir.or(base.temp_dir),
            replace: self.replace.or(base.replace),
            preprocessor: self.preprocessor.or(base.preprocessor),
            disable_preprocessor: self.disable_preprocessor.or(base.disable_preprocessor),
            include_paths,
            language: self.language.or(base.language),
            package: self.package.or(base.package),
            example: self.example.or(base.example),
            typeobject: self.typeobject.or(base.typeobject),
            export_symbols: self.export_symbols.or(base.export_symbols),
            fusion: self.fusion.or(base.fusion),
            javac: self.javac.or(base.javac),
            javah: self.javah.or(base.javah),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProductSection {
    pub library: Option<String>,
    pub support_libraries: Option<Vec<String>>,
    pub home_var: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformsSection {
    /// Replaces the built-in platform list.
    pub known: Option<Vec<String>>,
}

/// Middleware product the generated code builds against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductConfig {
    /// Main library, always linked.
    pub library: String,
    /// Linked by makefile and cross-platform examples only.
    pub support_libraries: Vec<String>,
    /// Environment variable naming the install root.
    pub home_var: String,
    /// Version suffix for IDE library names. Empty for none.
    pub version: String,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            library: "fastrtps".to_string(),
            support_libraries: vec!["fastcdr".to_string()],
            home_var: "FASTRTPSHOME".to_string(),
            version: String::new(),
        }
    }
}

impl ProductConfig {
    fn from_section(section: ProductSection) -> Self {
        let defaults = Self::default();
        Self {
            library: section.library.unwrap_or(defaults.library),
            support_libraries: section
                .support_libraries
                .unwrap_or(defaults.support_libraries),
            home_var: section.home_var.unwrap_or(defaults.home_var),
            version: section.version.unwrap_or(defaults.version),
        }
    }

    /// `$(FASTRTPSHOME)`
    #[must_use]
    pub fn home(&self) -> String {
        format!("$({})", self.home_var)
    }
}

/// Preprocessor use for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreprocessorSetting {
    Disabled,
    /// Host default program unless one is given.
    Enabled(Option<PathBuf>),
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub replace: bool,
    pub preprocessor: PreprocessorSetting,
    pub include_paths: Vec<PathBuf>,
    pub language: Language,
    pub package: JavaPackage,
    /// Target for example files and build backends.
    pub example: Option<Platform>,
    pub flags: FeatureFlags,
    pub product: ProductConfig,
    pub platforms: PlatformRegistry,
    pub javac: Option<PathBuf>,
    pub javah: Option<PathBuf>,
    pub host: HostOs,
    /// Where to write the JSON generation report.
    pub report: Option<PathBuf>,
}

impl GeneratorConfig {
    /// Defaults for `inputs`, used as the starting point by tests and
    /// embedders.
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self {
            inputs,
            output_dir: PathBuf::from("."),
            temp_dir: std::env::temp_dir(),
            replace: false,
            preprocessor: PreprocessorSetting::Enabled(None),
            include_paths: Vec::new(),
            language: Language::default(),
            package: JavaPackage::default(),
            example: None,
            flags: FeatureFlags::default(),
            product: ProductConfig::default(),
            platforms: PlatformRegistry::default(),
            javac: None,
            javah: None,
            host: HostOs::current(),
            report: None,
        }
    }

    /// Merge command-line overrides over the configuration file.
    ///
    /// `env` looks up environment variables; it is only asked for the temp
    /// directory when none is configured.
    pub fn resolve<F>(
        inputs: Vec<PathBuf>,
        overrides: GeneratorSection,
        file: ConfigFile,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let platforms = match file.platforms.known {
            Some(known) => PlatformRegistry::from_list(known),
            None => PlatformRegistry::builtin(),
        };
        let merged = overrides.overlay(file.generator);

        let example = merged
            .example
            .as_deref()
            .map(|id| platforms.parse(id))
            .transpose()
            .context("Invalid example platform")?;

        let preprocessor = if merged.disable_preprocessor.unwrap_or(false) {
            PreprocessorSetting::Disabled
        } else {
            PreprocessorSetting::Enabled(merged.preprocessor)
        };

        Ok(Self {
            inputs,
            output_dir: merged.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            temp_dir: resolve_temp_dir(merged.temp_dir, env),
            replace: merged.replace.unwrap_or(false),
            preprocessor,
            include_paths: merged.include_paths,
            language: merged.language.unwrap_or_default(),
            package: JavaPackage::new(merged.package.unwrap_or_default()),
            example,
            flags: FeatureFlags {
                type_object: merged.typeobject.unwrap_or(false),
                export_symbols: merged.export_symbols.unwrap_or(false),
                fusion: merged.fusion.unwrap_or(false),
            },
            product: ProductConfig::from_section(file.product),
            platforms,
            javac: merged.javac,
            javah: merged.javah,
            host: HostOs::current(),
            report: None,
        })
    }

    pub fn with_report(mut self, report: Option<PathBuf>) -> Self {
        self.report = report;
        self
    }

    /// Check the configuration before any generation starts
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files given");
        }

        if !self.output_dir.is_dir() {
            bail!(
                "The specified output directory does not exist: {}",
                self.output_dir.display()
            );
        }

        if !self.temp_dir.is_dir() {
            bail!(
                "The temporary directory does not exist: {}",
                self.temp_dir.display()
            );
        }

        if let Some(platform) = &self.example {
            platform
                .backend()
                .with_context(|| format!("Cannot generate build files for {platform}"))?;
        }

        if !self.package.is_empty() && self.language != Language::Java {
            warn!(
                package = self.package.dotted(),
                "Package only applies to the java language, ignored"
            );
        }

        Ok(())
    }
}

/// Configured temp directory, else the first of `TMPDIR`, `TEMP`, `TMP`
/// that is set, else the system default.
pub fn resolve_temp_dir<F>(configured: Option<PathBuf>, env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = configured {
        return dir;
    }

    TEMP_DIR_VARS
        .iter()
        .find_map(|var| env(var).filter(|v| !v.is_empty()))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}
