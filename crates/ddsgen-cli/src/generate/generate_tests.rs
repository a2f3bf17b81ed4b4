#![allow(non_snake_case)]

use super::*;
use ddsgen_core::JavaPackage;
use ddsgen_solution::Platform;
use std::fs;
use tempfile::TempDir;

const SHAPES: &str = "struct Shape { @Key long id; string color; };\n";

struct Workspace {
    input: TempDir,
    output: TempDir,
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            input: TempDir::new().unwrap(),
            output: TempDir::new().unwrap(),
            temp: TempDir::new().unwrap(),
        }
    }

    fn idl(&self, name: &str, content: &str) -> PathBuf {
        let path = self.input.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn config(&self, inputs: Vec<PathBuf>) -> GeneratorConfig {
        let mut config = GeneratorConfig::new(inputs);
        config.output_dir = self.output.path().to_path_buf();
        config.temp_dir = self.temp.path().to_path_buf();
        config.preprocessor = PreprocessorSetting::Disabled;
        config
    }

    fn exists(&self, file: &str) -> bool {
        self.output.path().join(file).is_file()
    }
}

/// Engine that knows no group at all.
struct BrokenTemplates;

impl TemplateEngine for BrokenTemplates {
    fn render(&self, group: &str, _attributes: &Attributes<'_>) -> GenerateResult<String> {
        Err(GenerateError::Template(format!("cannot load the template group {group}")))
    }
}

// ============================================================================
// Stage
// ============================================================================

#[test]
fn Stage___display___is_kebab_case() {
    assert_eq!(Stage::EmitTopicArtifacts.to_string(), "emit-topic-artifacts");
    assert_eq!(Stage::Failed.to_string(), "failed");
}

// ============================================================================
// Solution setup
// ============================================================================

#[test]
fn solution_setup___windows_example___adds_install_paths_without_support_library() {
    let ws = Workspace::new();
    let mut config = ws.config(vec![]);
    config.example = Some(Platform::new("x64Win64VS2015"));
    let generator = Generator::new(&config).unwrap();

    let solution = generator.solution_setup();

    assert_eq!(solution.include_paths(), ["$(FASTRTPSHOME)/include"]);
    assert_eq!(
        solution.library_paths(),
        ["$(FASTRTPSHOME)/lib", "$(FASTRTPSHOME)/lib/x64Win64VS2015"]
    );
    assert_eq!(solution.libraries(), ["fastrtps"]);
}

#[test]
fn solution_setup___linux_java_example___adds_jni_includes_and_support_library() {
    let ws = Workspace::new();
    let mut config = ws.config(vec![]);
    config.example = Some(Platform::new("x64Linux2.6gcc"));
    config.language = Language::Java;
    let generator = Generator::new(&config).unwrap();

    let solution = generator.solution_setup();

    assert_eq!(
        solution.include_paths(),
        ["$(JAVA_HOME)/include", "$(JAVA_HOME)/include/linux"]
    );
    assert_eq!(solution.libraries(), ["fastcdr", "fastrtps"]);
}

#[test]
fn solution_setup___no_example___links_main_library_only() {
    let ws = Workspace::new();
    let config = ws.config(vec![]);
    let generator = Generator::new(&config).unwrap();

    let solution = generator.solution_setup();

    assert!(solution.include_paths().is_empty());
    assert_eq!(solution.libraries(), ["fastrtps"]);
}

// ============================================================================
// Units
// ============================================================================

#[test]
fn Generator___topic_without_example___writes_types_and_topic_files_only() {
    let ws = Workspace::new();
    let input = ws.idl("Shapes.idl", SHAPES);
    let config = ws.config(vec![input]);

    let summary = Generator::new(&config).unwrap().run().unwrap();

    assert!(summary.is_success());
    assert!(ws.exists("Shapes.h"));
    assert!(ws.exists("Shapes.cxx"));
    assert!(ws.exists("ShapesPubSubTypes.h"));
    assert!(ws.exists("ShapesPubSubTypes.cxx"));
    assert!(!ws.exists("ShapesPublisher.cxx"));
    assert!(!ws.exists("ShapesTypeObject.h"));
    assert!(summary.build_files.is_empty());

    let project = summary.solution.project("Shapes").unwrap();
    assert_eq!(project.headers(FileRole::Common), ["Shapes.h"]);
    assert_eq!(project.sources(FileRole::Topic), ["ShapesPubSubTypes.cxx"]);
}

#[test]
fn Generator___no_topic___writes_common_types_only() {
    let ws = Workspace::new();
    let input = ws.idl("Colors.idl", "enum Color { RED, GREEN };\n");
    let config = ws.config(vec![input]);

    let summary = Generator::new(&config).unwrap().run().unwrap();

    assert!(summary.is_success());
    assert!(ws.exists("Colors.h"));
    assert!(!ws.exists("ColorsPubSubTypes.h"));
    assert!(!summary.solution.project("Colors").unwrap().has_topic());
}

#[test]
fn Generator___typeobject_flag___adds_type_object_files_to_common() {
    let ws = Workspace::new();
    let input = ws.idl("Shapes.idl", SHAPES);
    let mut config = ws.config(vec![input]);
    config.flags.type_object = true;

    let summary = Generator::new(&config).unwrap().run().unwrap();

    assert!(ws.exists("ShapesTypeObject.h"));
    assert!(ws.exists("ShapesTypeObject.cxx"));
    let project = summary.solution.project("Shapes").unwrap();
    assert_eq!(
        project.sources(FileRole::Common),
        ["Shapes.cxx", "ShapesTypeObject.cxx"]
    );
}

#[test]
fn Generator___missing_input___fails_that_unit_and_continues() {
    let ws = Workspace::new();
    let missing = ws.input.path().join("Missing.idl");
    let present = ws.idl("Shapes.idl", SHAPES);
    let config = ws.config(vec![missing.clone(), present.clone()]);

    let summary = Generator::new(&config).unwrap().run().unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].input, missing);
    assert_eq!(summary.failures[0].stage, Stage::Parse);
    assert_eq!(
        summary.units,
        vec![(missing, Stage::Failed), (present, Stage::Done)]
    );
    assert!(ws.exists("Shapes.h"));
    assert!(summary.solution.project("Missing").is_none());
}

#[test]
fn Generator___failed_unit___skips_build_files() {
    let ws = Workspace::new();
    let broken = ws.idl("Broken.idl", "struct {\n");
    let good = ws.idl("Shapes.idl", SHAPES);
    let mut config = ws.config(vec![broken, good]);
    config.example = Some(Platform::new("x64Linux2.6gcc"));

    let summary = Generator::new(&config).unwrap().run().unwrap();

    assert!(!summary.is_success());
    assert!(summary.build_files.is_empty());
    assert!(!ws.exists("makefile_x64Linux2.6gcc"));
}

#[test]
fn Generator___broken_template_engine___ends_the_run() {
    let ws = Workspace::new();
    let input = ws.idl("Shapes.idl", SHAPES);
    let config = ws.config(vec![input]);

    let err = Generator::new(&config)
        .unwrap()
        .with_engine(BrokenTemplates)
        .run()
        .unwrap_err();

    assert!(matches!(err, GenerateError::Template(_)));
}

#[cfg(unix)]
#[test]
fn Generator___failing_preprocessor___stops_unit_at_preprocess() {
    let ws = Workspace::new();
    let input = ws.idl("Shapes.idl", SHAPES);
    let mut config = ws.config(vec![input]);
    config.preprocessor = PreprocessorSetting::Enabled(Some(PathBuf::from("false")));

    let summary = Generator::new(&config).unwrap().run().unwrap();

    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].stage, Stage::Preprocess);
    assert!(matches!(summary.failures[0].error, GenerateError::Toolchain(_)));
    assert!(!ws.exists("Shapes.h"));
}

#[cfg(unix)]
#[test]
fn Generator___missing_preprocessor___is_unit_failure() {
    let ws = Workspace::new();
    let input = ws.idl("Shapes.idl", SHAPES);
    let mut config = ws.config(vec![input]);
    config.preprocessor =
        PreprocessorSetting::Enabled(Some(PathBuf::from("/nonexistent/ddsgen-cpp")));

    let summary = Generator::new(&config).unwrap().run().unwrap();

    assert_eq!(summary.failures[0].stage, Stage::Preprocess);
    assert!(summary.failures[0].error.is_unit_local());
}

// ============================================================================
// Managed binding
// ============================================================================

const GEO_SHAPES: &str = "module geo {\n\
  enum Color { RED, GREEN };\n\
  struct Shape { @Key long id; Color color; };\n\
};\n";

impl Workspace {
    /// Java run whose compiler and header generator are `javac`/`javah`.
    fn java_config(&self, inputs: Vec<PathBuf>, javac: &str, javah: &str) -> GeneratorConfig {
        let mut config = self.config(inputs);
        config.language = Language::Java;
        config.package = JavaPackage::new("com.acme");
        config.javac = Some(PathBuf::from(javac));
        config.javah = Some(PathBuf::from(javah));
        config
    }
}

#[cfg(unix)]
#[test]
fn Generator___java_topic___writes_types_under_package_and_scope() {
    let ws = Workspace::new();
    let input = ws.idl("Shapes.idl", GEO_SHAPES);
    let config = ws.java_config(vec![input], "true", "true");

    let summary = Generator::new(&config).unwrap().run().unwrap();

    assert!(summary.is_success());
    assert!(ws.exists("com/acme/geo/Shape.java"));
    assert!(ws.exists("com/acme/geo/Color.java"));
    assert!(ws.exists("com/acme/ShapesPubSub.java"));
    let project = summary.solution.project("Shapes").unwrap();
    assert_eq!(
        project.sources(FileRole::Managed),
        [
            "com/acme/geo/Color.java",
            "com/acme/geo/Shape.java",
            "com/acme/ShapesPubSub.java"
        ]
    );
}

#[cfg(unix)]
#[test]
fn Generator___java_topic___records_native_interface_files() {
    let ws = Workspace::new();
    let input = ws.idl("Shapes.idl", GEO_SHAPES);
    let config = ws.java_config(vec![input], "true", "true");

    let summary = Generator::new(&config).unwrap().run().unwrap();

    assert!(ws.exists("ShapesPubSubJNII.h"));
    assert!(ws.exists("ShapesPubSubJNI.cxx"));
    let project = summary.solution.project("Shapes").unwrap();
    assert_eq!(
        project.headers(FileRole::NativeInterface),
        ["ShapesPubSubJNI.h", "ShapesPubSubJNII.h"]
    );
    assert_eq!(
        project.sources(FileRole::NativeInterface),
        ["ShapesPubSubJNI.cxx"]
    );
}

#[test]
fn Generator___java_without_topic___renders_bridge_without_running_tools() {
    let ws = Workspace::new();
    let input = ws.idl("Colors.idl", "enum Color { RED, GREEN };\n");
    let config = ws.java_config(vec![input], "/nonexistent/javac", "/nonexistent/javah");

    let summary = Generator::new(&config).unwrap().run().unwrap();

    assert!(summary.is_success());
    assert!(ws.exists("com/acme/Color.java"));
    assert!(!ws.exists("com/acme/ColorsPubSub.java"));
    assert!(ws.exists("ColorsPubSubJNII.h"));
    let bridge = fs::read_to_string(ws.output.path().join("ColorsPubSubJNI.cxx")).unwrap();
    assert!(bridge.contains("Colors declares no topic type"));
    let project = summary.solution.project("Colors").unwrap();
    assert_eq!(
        project.headers(FileRole::NativeInterface),
        ["ColorsPubSubJNII.h"]
    );
}

#[cfg(unix)]
#[test]
fn Generator___failing_java_compiler___fails_unit_at_managed_binding() {
    let ws = Workspace::new();
    let first = ws.idl("Shapes.idl", GEO_SHAPES);
    let second = ws.idl("Colors.idl", "enum Color { RED };\n");
    let config = ws.java_config(vec![first.clone(), second.clone()], "false", "true");

    let summary = Generator::new(&config).unwrap().run().unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].input, first);
    assert_eq!(summary.failures[0].stage, Stage::EmitManagedBinding);
    assert!(matches!(summary.failures[0].error, GenerateError::Toolchain(_)));
    assert_eq!(
        summary.units,
        vec![(first, Stage::Failed), (second, Stage::Done)]
    );
    assert!(ws.exists("com/acme/ShapesPubSub.java"));
    assert!(!ws.exists("ShapesPubSubJNII.h"));
    assert!(summary.solution.project("Shapes").is_none());
    assert!(ws.exists("ColorsPubSubJNII.h"));
}

// ============================================================================
// Backends
// ============================================================================

#[test]
fn Generator___linux_example___writes_example_files_and_makefile() {
    let ws = Workspace::new();
    let input = ws.idl("Shapes.idl", SHAPES);
    let mut config = ws.config(vec![input]);
    config.example = Some(Platform::new("x64Linux2.6gcc"));

    let summary = Generator::new(&config).unwrap().run().unwrap();

    assert!(summary.is_success());
    for file in [
        "ShapesPublisher.h",
        "ShapesPublisher.cxx",
        "ShapesSubscriber.h",
        "ShapesSubscriber.cxx",
        "ShapesPubSubMain.cxx",
        "makefile_x64Linux2.6gcc",
    ] {
        assert!(ws.exists(file), "{file} missing");
    }
    assert_eq!(
        summary.build_files,
        vec![ws.output.path().join("makefile_x64Linux2.6gcc")]
    );
}

#[test]
fn Generator___visual_studio_example___writes_solution_and_project_pairs() {
    let ws = Workspace::new();
    let input = ws.idl("Shapes.idl", SHAPES);
    let mut config = ws.config(vec![input]);
    config.example = Some(Platform::new("i86Win32VS2013"));

    Generator::new(&config).unwrap().run().unwrap();

    for file in [
        "ShapesTypes-i86Win32VS2013.vcxproj",
        "ShapesTypes-i86Win32VS2013.vcxproj.filters",
        "ShapesPublisherSubscriber-i86Win32VS2013.vcxproj",
        "ShapesPublisherSubscriber-i86Win32VS2013.vcxproj.filters",
        "solution-i86Win32VS2013.sln",
    ] {
        assert!(ws.exists(file), "{file} missing");
    }
    assert!(!ws.exists("ShapesPubSubJNI-i86Win32VS2013.vcxproj"));
}

#[test]
fn Generator___example_without_any_struct___succeeds_without_build_files() {
    let ws = Workspace::new();
    let input = ws.idl("Colors.idl", "enum Color { RED };\n");
    let mut config = ws.config(vec![input]);
    config.example = Some(Platform::new("CMake"));

    let summary = Generator::new(&config).unwrap().run().unwrap();

    assert!(summary.is_success());
    assert!(summary.build_files.is_empty());
    assert!(!ws.exists("CMakeLists.txt"));
}

// ============================================================================
// Report
// ============================================================================

#[test]
fn Generator___report___describes_projects_and_guids() {
    let ws = Workspace::new();
    let input = ws.idl("Shapes.idl", SHAPES);
    let report = ws.temp.path().join("report.json");
    let config = ws.config(vec![input]).with_report(Some(report.clone()));

    let summary = Generator::new(&config).unwrap().run().unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    let project = &json["projects"][0];
    assert_eq!(json["language"], "cpp");
    assert_eq!(project["name"], "Shapes");
    assert_eq!(project["has_topic"], true);
    assert_eq!(
        project["guids"]["types"],
        summary
            .solution
            .project("Shapes")
            .unwrap()
            .guid(GuidKind::Types)
    );
}

#[test]
fn relative___nested_path___uses_forward_slashes() {
    let path: PathBuf = ["com", "acme", "Shape.java"].iter().collect();

    assert_eq!(relative(&path), "com/acme/Shape.java");
}
