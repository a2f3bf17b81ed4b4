//! The generation pipeline.
//!
//! Every input file goes through
//! `Preprocess -> Parse -> EmitCommonTypes -> [EmitTopicArtifacts] ->
//! [EmitManagedBinding] -> Done`, one file at a time. A front-end or
//! toolchain failure moves the unit to `Failed` and the next unit still runs;
//! a write or template failure ends the run. Build files for the example
//! platform are emitted last, only when every unit succeeded.

use crate::config::{GeneratorConfig, PreprocessorSetting};
use crate::error::{GenerateError, GenerateResult};
use crate::templates::{
    Attributes, BuildAttributes, BuiltinTemplates, TemplateEngine, UnitAttributes, group,
    managed_package, project_file_name, project_kinds,
};
use crate::writer::ArtifactWriter;
use ddsgen_core::{BuiltinFrontEnd, Context, IdlFrontEnd, Language, TypeCode};
use ddsgen_solution::{Backend, FileRole, GuidKind, Project, Solution};
use ddsgen_toolchain::{ManagedToolchain, NativeHeaderJob, Preprocessor, ToolInvoker};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Pipeline step of one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preprocess,
    Parse,
    EmitCommonTypes,
    EmitTopicArtifacts,
    EmitManagedBinding,
    Done,
    Failed,
}

impl Stage {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Preprocess => "preprocess",
            Stage::Parse => "parse",
            Stage::EmitCommonTypes => "emit-common-types",
            Stage::EmitTopicArtifacts => "emit-topic-artifacts",
            Stage::EmitManagedBinding => "emit-managed-binding",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit that stopped early.
#[derive(Debug)]
pub struct UnitFailure {
    pub input: PathBuf,
    /// The step that failed.
    pub stage: Stage,
    pub error: GenerateError,
}

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    /// Projects of the units that reached `Done`, in input order.
    pub solution: Solution,
    /// Final state of every input, in input order.
    pub units: Vec<(PathBuf, Stage)>,
    pub failures: Vec<UnitFailure>,
    /// Build-backend files, empty when none were emitted.
    pub build_files: Vec<PathBuf>,
}

impl RunSummary {
    /// Whether every unit reached `Done`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Generator<'a> {
    config: &'a GeneratorConfig,
    engine: Box<dyn TemplateEngine>,
    front_end: Box<dyn IdlFrontEnd>,
    invoker: ToolInvoker,
    writer: ArtifactWriter,
}

impl<'a> Generator<'a> {
    /// A generator with the built-in templates and IDL front-end.
    pub fn new(config: &'a GeneratorConfig) -> GenerateResult<Self> {
        let front_end = BuiltinFrontEnd::new().with_include_paths(config.include_paths.clone());
        Ok(Self {
            config,
            engine: Box::new(BuiltinTemplates),
            front_end: Box::new(front_end),
            invoker: ToolInvoker::new()?,
            writer: ArtifactWriter::new(config.replace),
        })
    }

    pub fn with_engine(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    pub fn with_front_end(mut self, front_end: impl IdlFrontEnd + 'static) -> Self {
        self.front_end = Box::new(front_end);
        self
    }

    /// Process every input, then emit the build files.
    pub fn run(&self) -> GenerateResult<RunSummary> {
        let mut solution = self.solution_setup();
        let mut units = Vec::with_capacity(self.config.inputs.len());
        let mut failures = Vec::new();

        for input in &self.config.inputs {
            match self.process_unit(input) {
                Ok(project) => {
                    solution.add_project(project);
                    units.push((input.clone(), Stage::Done));
                }
                Err(failure) if failure.error.is_unit_local() => {
                    error!(
                        file = %input.display(),
                        stage = %failure.stage,
                        "{}",
                        failure.error
                    );
                    units.push((input.clone(), Stage::Failed));
                    failures.push(failure);
                }
                Err(failure) => return Err(failure.error),
            }
        }

        let build_files = if failures.is_empty() {
            self.emit_backend(&solution)?
        } else {
            if self.config.example.is_some() {
                warn!(
                    failed = failures.len(),
                    "Build files not generated because some units failed"
                );
            }
            Vec::new()
        };

        if let Some(report) = &self.config.report {
            write_report(report, &solution)?;
        }

        Ok(RunSummary {
            solution,
            units,
            failures,
            build_files,
        })
    }

    /// The empty solution with search paths and libraries for the example
    /// platform.
    fn solution_setup(&self) -> Solution {
        let config = self.config;
        let product = &config.product;
        let home = product.home();
        let mut solution = Solution::new(
            config.language,
            config.example.clone(),
            product.version.clone(),
        );

        if let Some(platform) = config.example.as_ref().filter(|p| p.is_windows()) {
            solution.add_include(format!("{home}/include"));
            solution.add_library_path(format!("{home}/lib"));
            solution.add_library_path(format!("{home}/lib/{platform}"));
        }

        if config.language == Language::Java {
            solution.add_include("$(JAVA_HOME)/include");
            if config.example.as_ref().is_some_and(|p| p.is_linux()) {
                solution.add_include("$(JAVA_HOME)/include/linux");
            }
        }

        if config.example.as_ref().is_some_and(|p| !p.is_windows()) {
            for library in &product.support_libraries {
                solution.add_library(library.clone());
            }
        }
        solution.add_library(product.library.clone());
        solution
    }

    fn process_unit(&self, input: &Path) -> Result<Project, UnitFailure> {
        let mut stage = Stage::Preprocess;
        match self.generate_unit(input, &mut stage) {
            Ok(project) => {
                info!(file = %input.display(), "Unit generated");
                Ok(project)
            }
            Err(error) => Err(UnitFailure {
                input: input.to_path_buf(),
                stage,
                error,
            }),
        }
    }

    fn generate_unit(&self, input: &Path, stage: &mut Stage) -> GenerateResult<Project> {
        let config = self.config;
        info!(file = %input.display(), "Processing IDL file");

        *stage = Stage::Preprocess;
        let source = self.preprocess(input)?;

        *stage = Stage::Parse;
        let spec = self.front_end.parse_file(input, &source)?;
        let mut ctx = Context::new(input)
            .with_include_paths(config.include_paths.clone())
            .with_language(config.language)
            .with_package(config.package.clone())
            .with_flags(config.flags);
        ctx.register_specification(&spec)?;
        debug!(
            file = %input.display(),
            types = ctx.types().len(),
            topic = ctx.topic().map(|t| t.scoped_name()).unwrap_or_default(),
            "Parsed unit"
        );

        let mut project = Project::new(ctx.filename(), input)
            .with_dependencies(ctx.dependencies().iter().cloned())
            .with_topic(ctx.has_topic());
        let unit = UnitAttributes {
            ctx: &ctx,
            example: config.example.as_ref(),
            product: &config.product,
        };
        let name = ctx.filename();

        *stage = Stage::EmitCommonTypes;
        let mut common = vec![
            (group::TYPES_HEADER, format!("{name}.h")),
            (group::TYPES_SOURCE, format!("{name}.cxx")),
        ];
        if config.flags.type_object {
            common.push((group::TYPE_OBJECT_HEADER, format!("{name}TypeObject.h")));
            common.push((group::TYPE_OBJECT_SOURCE, format!("{name}TypeObject.cxx")));
        }
        self.emit_all(&mut project, FileRole::Common, unit, common)?;

        if ctx.has_topic() {
            *stage = Stage::EmitTopicArtifacts;
            let topic = vec![
                (group::PUBSUB_TYPE_HEADER, format!("{name}PubSubTypes.h")),
                (group::PUBSUB_TYPE_SOURCE, format!("{name}PubSubTypes.cxx")),
            ];
            self.emit_all(&mut project, FileRole::Topic, unit, topic)?;

            if config.example.is_some() {
                let publisher = vec![
                    (group::PUBLISHER_HEADER, format!("{name}Publisher.h")),
                    (group::PUBLISHER_SOURCE, format!("{name}Publisher.cxx")),
                ];
                let subscriber = vec![
                    (group::SUBSCRIBER_HEADER, format!("{name}Subscriber.h")),
                    (group::SUBSCRIBER_SOURCE, format!("{name}Subscriber.cxx")),
                ];
                let main = vec![(group::PUBSUB_MAIN, format!("{name}PubSubMain.cxx"))];
                self.emit_all(&mut project, FileRole::Publisher, unit, publisher)?;
                self.emit_all(&mut project, FileRole::Subscriber, unit, subscriber)?;
                self.emit_all(&mut project, FileRole::Example, unit, main)?;
            }
        }

        if ctx.is_java() {
            *stage = Stage::EmitManagedBinding;
            self.emit_managed(&mut project, unit)?;
        }

        *stage = Stage::Done;
        Ok(project)
    }

    /// The file handed to the front-end: the input itself, or its
    /// preprocessed copy `<temp>/<stem>.cc`.
    fn preprocess(&self, input: &Path) -> GenerateResult<PathBuf> {
        let config = self.config;
        let program = match &config.preprocessor {
            PreprocessorSetting::Disabled => return Ok(input.to_path_buf()),
            PreprocessorSetting::Enabled(program) => program,
        };

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = config.temp_dir.join(format!("{stem}.cc"));

        let mut preprocessor =
            Preprocessor::new(config.host).with_include_paths(config.include_paths.iter().cloned());
        if let Some(program) = program {
            preprocessor = preprocessor.with_program(program);
        }
        preprocessor.run(&self.invoker, input, &output)?;
        Ok(output)
    }

    fn emit_managed(&self, project: &mut Project, unit: UnitAttributes<'_>) -> GenerateResult<()> {
        let config = self.config;
        let ctx = unit.ctx;
        let package = ctx.package();

        for ty in ctx
            .unit_types()
            .filter(|t| matches!(t, TypeCode::Struct(_) | TypeCode::Enum(_)))
        {
            let dir: PathBuf = package.path().join(ty.scope().iter().collect::<PathBuf>());
            let file = relative(&dir.join(format!("{}.java", ty.name())));
            create_dir(&config.output_dir.join(&dir))?;
            debug!(class = %managed_package(package, ty.scope()), file = %file, "Managed type");
            self.emit(group::JAVA_TYPE, &Attributes::ManagedType { unit, ty }, &file)?;
            project.add_source(FileRole::Managed, file);
        }

        if ctx.has_topic() {
            let dir = package.path();
            create_dir(&config.output_dir.join(&dir))?;
            let wrapper = relative(&dir.join(format!("{}PubSub.java", ctx.filename())));
            self.emit(group::JAVA_SOURCE, &Attributes::Unit(unit), &wrapper)?;
            project.add_source(FileRole::Managed, wrapper);

            let mut tools = ManagedToolchain::for_host(config.host);
            if let Some(javac) = &config.javac {
                tools = tools.with_javac(javac);
            }
            if let Some(javah) = &config.javah {
                tools = tools.with_javah(javah);
            }
            let job = NativeHeaderJob {
                unit: ctx.filename().to_string(),
                package: package.dotted().to_string(),
                output_dir: config.output_dir.clone(),
                class_dir: Some(config.temp_dir.clone()),
            };
            tools.generate_native_header(&self.invoker, &job)?;
            project.add_header(FileRole::NativeInterface, format!("{}PubSubJNI.h", ctx.filename()));
        }

        let name = ctx.filename();
        let bridge = vec![
            (group::JNI_HEADER, format!("{name}PubSubJNII.h")),
            (group::JNI_SOURCE, format!("{name}PubSubJNI.cxx")),
        ];
        self.emit_all(project, FileRole::NativeInterface, unit, bridge)
    }

    /// Render unit groups into their files, in order, and record each file in
    /// the project. Stops at the first failure; earlier files stay written.
    fn emit_all(
        &self,
        project: &mut Project,
        role: FileRole,
        unit: UnitAttributes<'_>,
        files: Vec<(&str, String)>,
    ) -> GenerateResult<()> {
        for (group, file) in files {
            self.emit(group, &Attributes::Unit(unit), &file)?;
            if file.ends_with(".h") {
                project.add_header(role, file);
            } else {
                project.add_source(role, file);
            }
        }
        Ok(())
    }

    /// Render `group` into `file`, relative to the output directory.
    fn emit(&self, group: &str, attributes: &Attributes<'_>, file: &str) -> GenerateResult<()> {
        let content = self.engine.render(group, attributes)?;
        self.writer.write(&self.config.output_dir.join(file), &content)?;
        Ok(())
    }

    fn emit_backend(&self, solution: &Solution) -> GenerateResult<Vec<PathBuf>> {
        let config = self.config;
        let Some(platform) = &config.example else {
            return Ok(Vec::new());
        };
        if !solution.has_any_topic() {
            warn!(
                "No structure found in any of the provided IDL; \
                 no example files have been generated"
            );
            return Ok(Vec::new());
        }

        let backend = platform.backend()?;
        let build = BuildAttributes {
            solution,
            platform,
            backend,
            product: &config.product,
        };
        let mut files = Vec::new();

        match backend {
            Backend::Makefile { .. } => {
                let file = format!("makefile_{platform}");
                self.emit(group::MAKEFILE, &Attributes::Build(build), &file)?;
                files.push(config.output_dir.join(file));
            }
            Backend::CMake => {
                let file = "CMakeLists.txt".to_string();
                self.emit(group::CMAKE_LISTS, &Attributes::Build(build), &file)?;
                files.push(config.output_dir.join(file));
            }
            Backend::VisualStudio { .. } => {
                for project in solution.dependency_order() {
                    for kind in project_kinds(project, solution.language()) {
                        let attributes = Attributes::Project {
                            build,
                            project,
                            kind,
                        };
                        let file = project_file_name(project, kind, platform.id());
                        let filters = format!("{file}.filters");
                        self.emit(group::VS_PROJECT, &attributes, &file)?;
                        self.emit(group::VS_PROJECT_FILES, &attributes, &filters)?;
                        files.push(config.output_dir.join(file));
                        files.push(config.output_dir.join(filters));
                    }
                }
                let file = format!("solution-{platform}.sln");
                self.emit(group::VS_SOLUTION, &Attributes::Build(build), &file)?;
                files.push(config.output_dir.join(file));
            }
        }

        info!(platform = %platform, files = files.len(), "Build files generated");
        Ok(files)
    }
}

#[derive(Serialize)]
struct Report<'a> {
    language: Language,
    platform: Option<&'a str>,
    projects: Vec<ProjectReport<'a>>,
}

#[derive(Serialize)]
struct ProjectReport<'a> {
    #[serde(flatten)]
    project: &'a Project,
    guids: BTreeMap<&'static str, String>,
}

/// JSON description of the solution, always overwritten.
fn write_report(path: &Path, solution: &Solution) -> GenerateResult<()> {
    let report = Report {
        language: solution.language(),
        platform: solution.platform().map(|p| p.id()),
        projects: solution
            .projects()
            .iter()
            .map(|project| ProjectReport {
                project,
                guids: [
                    ("types", GuidKind::Types),
                    ("publisher-subscriber", GuidKind::PublisherSubscriber),
                    ("jni", GuidKind::Jni),
                ]
                .into_iter()
                .map(|(key, kind)| (key, project.guid(kind)))
                .collect(),
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| GenerateError::Template(format!("cannot serialize the report: {e}")))?;
    ArtifactWriter::new(true).write(path, &json)?;
    info!(report = %path.display(), "Wrote generation report");
    Ok(())
}

fn create_dir(dir: &Path) -> GenerateResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| GenerateError::io(dir, e))
}

/// Forward-slash relative path, as recorded in projects and build files.
fn relative(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[path = "generate/generate_tests.rs"]
mod generate_tests;
