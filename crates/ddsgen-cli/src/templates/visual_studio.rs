//! IDE solution and project files for the Windows targets.

use super::{BuildAttributes, group};
use crate::error::{GenerateError, GenerateResult};
use ddsgen_core::Language;
use ddsgen_solution::{
    Backend, FileRole, GuidKind, Project, VsConfiguration, VsTarget, VsToolset, stable_guid,
};

const CPP_PROJECT_TYPE: &str = "8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942";
const MSBUILD_NS: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

/// `ShapesPublisherSubscriber-x64Win64VS2015.vcxproj`
pub fn project_file_name(project: &Project, kind: GuidKind, platform: &str) -> String {
    format!("{}-{platform}.vcxproj", project_stem(project, kind))
}

/// Projects generated for `project`, in solution order.
pub fn project_kinds(project: &Project, language: Language) -> Vec<GuidKind> {
    let mut kinds = vec![GuidKind::Types];
    if project.has_topic() {
        kinds.push(GuidKind::PublisherSubscriber);
    }
    if language == Language::Java {
        kinds.push(GuidKind::Jni);
    }
    kinds
}

fn project_stem(project: &Project, kind: GuidKind) -> String {
    let suffix = match kind {
        GuidKind::Types => "Types",
        GuidKind::PublisherSubscriber => "PublisherSubscriber",
        GuidKind::Jni => "PubSubJNI",
    };
    format!("{}{suffix}", project.name())
}

fn roles(kind: GuidKind) -> &'static [FileRole] {
    match kind {
        GuidKind::Types => &[FileRole::Common],
        GuidKind::PublisherSubscriber => &[
            FileRole::Topic,
            FileRole::Publisher,
            FileRole::Subscriber,
            FileRole::Example,
        ],
        GuidKind::Jni => &[
            FileRole::Topic,
            FileRole::Publisher,
            FileRole::Subscriber,
            FileRole::NativeInterface,
        ],
    }
}

fn visual_studio(
    build: &BuildAttributes<'_>,
    group: &str,
) -> GenerateResult<(VsToolset, VsTarget)> {
    match build.backend {
        Backend::VisualStudio { toolset, target } => Ok((toolset, target)),
        _ => Err(GenerateError::Template(format!(
            "template group {group} needs a Visual Studio platform, got {}",
            build.platform
        ))),
    }
}

/// `{GUID}` in the braces IDE files expect.
fn braced(guid: &str) -> String {
    format!("{{{guid}}}")
}

/// In-solution projects `project` depends on, with their project kind.
fn references<'a>(
    build: &BuildAttributes<'a>,
    project: &'a Project,
    kind: GuidKind,
) -> Vec<(&'a Project, GuidKind)> {
    match kind {
        GuidKind::Types => build
            .solution
            .closure(project.name())
            .into_iter()
            .map(|dep| (dep, GuidKind::Types))
            .collect(),
        GuidKind::PublisherSubscriber | GuidKind::Jni => vec![(project, GuidKind::Types)],
    }
}

pub fn solution(build: &BuildAttributes<'_>) -> GenerateResult<String> {
    let (toolset, target) = visual_studio(build, group::VS_SOLUTION)?;
    let solution = build.solution;
    let platform = build.platform.id();
    let configurations = VsConfiguration::standard(target);

    let mut out = String::new();
    out.push_str("\u{feff}\r\nMicrosoft Visual Studio Solution File, Format Version 12.00\r\n");
    out.push_str(&format!("# Visual Studio {}\r\n", toolset.year()));

    let mut guids = Vec::new();
    for project in solution.dependency_order() {
        for kind in project_kinds(project, solution.language()) {
            let guid = braced(&project.guid(kind));
            out.push_str(&format!(
                "Project(\"{{{CPP_PROJECT_TYPE}}}\") = \"{}\", \"{}\", \"{guid}\"\r\n",
                project_stem(project, kind),
                project_file_name(project, kind, platform)
            ));
            let deps = references(build, project, kind);
            if !deps.is_empty() {
                out.push_str("\tProjectSection(ProjectDependencies) = postProject\r\n");
                for (dep, dep_kind) in deps {
                    let dep_guid = braced(&dep.guid(dep_kind));
                    out.push_str(&format!("\t\t{dep_guid} = {dep_guid}\r\n"));
                }
                out.push_str("\tEndProjectSection\r\n");
            }
            out.push_str("EndProject\r\n");
            guids.push(guid);
        }
    }

    out.push_str("Global\r\n\tGlobalSection(SolutionConfigurationPlatforms) = preSolution\r\n");
    for config in &configurations {
        let name = config.qualified_name();
        out.push_str(&format!("\t\t{name} = {name}\r\n"));
    }
    out.push_str("\tEndGlobalSection\r\n\tGlobalSection(ProjectConfigurationPlatforms) = \
        postSolution\r\n");
    for guid in &guids {
        for config in &configurations {
            let name = config.qualified_name();
            out.push_str(&format!("\t\t{guid}.{name}.ActiveCfg = {name}\r\n"));
            out.push_str(&format!("\t\t{guid}.{name}.Build.0 = {name}\r\n"));
        }
    }
    out.push_str("\tEndGlobalSection\r\n\tGlobalSection(SolutionProperties) = preSolution\r\
        \n\t\tHideSolutionNode = FALSE\r\n\tEndGlobalSection\r\nEndGlobal\r\n");
    Ok(out)
}

pub fn project(
    build: &BuildAttributes<'_>,
    project: &Project,
    kind: GuidKind,
) -> GenerateResult<String> {
    let (toolset, target) = visual_studio(build, group::VS_PROJECT)?;
    let solution = build.solution;
    let configurations = VsConfiguration::standard(target);
    let stem = project_stem(project, kind);

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\n");
    out.push_str(&format!(
        "<Project DefaultTargets=\"Build\" ToolsVersion=\"{}.0\" xmlns=\"{MSBUILD_NS}\">\r\n",
        toolset.version()
    ));

    out.push_str("  <ItemGroup Label=\"ProjectConfigurations\">\r\n");
    for config in &configurations {
        out.push_str(&format!(
            "    <ProjectConfiguration Include=\"{}\">\r\n      <Configuration>{}</Configuration>\r\
                \n      <Platform>{}</Platform>\r\n    </ProjectConfiguration>\r\n",
            config.qualified_name(),
            config.name,
            config.target.as_str()
        ));
    }
    out.push_str("  </ItemGroup>\r\n");

    out.push_str(&format!(
        "  <PropertyGroup Label=\"Globals\">\r\n    <ProjectGuid>{}</ProjectGuid>\r\n    \
            <RootNamespace>{stem}</RootNamespace>\r\n  </PropertyGroup>\r\n",
        braced(&project.guid(kind))
    ));
    out.push_str("  <Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.Default.props\" />\r\n");

    for config in &configurations {
        out.push_str(&format!(
            "  <PropertyGroup Condition=\"'$(Configuration)|$(Platform)'=='{}'\" \
                Label=\"Configuration\">\r\n    <ConfigurationType>{}</ConfigurationType>\r\n    \
                <UseDebugLibraries>{}</UseDebugLibraries>\r\n    \
                <PlatformToolset>v{}0</PlatformToolset>\r\n    \
                <CharacterSet>MultiByte</CharacterSet>\r\n  </PropertyGroup>\r\n",
            config.qualified_name(),
            configuration_type(kind, config),
            config.debug,
            toolset.version()
        ));
    }
    out.push_str("  <Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.props\" />\r\n");

    let includes: Vec<&str> = solution.include_paths().iter().map(String::as_str).collect();
    let library_paths: Vec<&str> = solution.library_paths().iter().map(String::as_str).collect();
    for config in &configurations {
        let mut defines = vec!["WIN32"];
        defines.push(if config.debug { "_DEBUG" } else { "NDEBUG" });
        if config.dll {
            defines.push("EPROSIMA_USER_DLL_EXPORT");
        }
        let runtime = match (config.debug, config.dll) {
            (true, true) => "MultiThreadedDebugDLL",
            (false, true) => "MultiThreadedDLL",
            (true, false) => "MultiThreadedDebug",
            (false, false) => "MultiThreaded",
        };
        let mut libraries: Vec<String> = solution
            .decorated_libraries(build.platform, config.variant())
            .into_iter()
            .map(|l| format!("{l}.lib"))
            .collect();
        if kind != GuidKind::Types {
            libraries.push(format!("{}Types.lib", project.name()));
        }
        for (dep, _) in references(build, project, GuidKind::Types) {
            libraries.push(format!("{}Types.lib", dep.name()));
        }

        out.push_str(&format!(
            "  <ItemDefinitionGroup Condition=\"'$(Configuration)|$(Platform)'=='{}'\">\r\n",
            config.qualified_name()
        ));
        out.push_str(&format!(
            "    <ClCompile>\r\n      \
                <AdditionalIncludeDirectories>{}</AdditionalIncludeDirectories>\r\n      \
                <PreprocessorDefinitions>{};%(PreprocessorDefinitions)</PreprocessorDefinitions>\r\
                \n      <RuntimeLibrary>{runtime}</RuntimeLibrary>\r\n    </ClCompile>\r\n",
            with_inherited(&includes, "AdditionalIncludeDirectories"),
            defines.join(";")
        ));
        out.push_str(&format!(
            "    <Link>\r\n      <AdditionalLibraryDirectories>{}</AdditionalLibraryDirectories>\r\
                \n      <AdditionalDependencies>{}</AdditionalDependencies>\r\n    </Link>\r\n  \
                </ItemDefinitionGroup>\r\n",
            with_inherited(&library_paths, "AdditionalLibraryDirectories"),
            libraries.join(";")
        ));
    }

    let (headers, sources) = files(project, kind);
    push_items(&mut out, "ClInclude", &headers);
    push_items(&mut out, "ClCompile", &sources);

    let deps = references(build, project, kind);
    if !deps.is_empty() {
        out.push_str("  <ItemGroup>\r\n");
        for (dep, dep_kind) in deps {
            out.push_str(&format!(
                "    <ProjectReference Include=\"{}\">\r\n      <Project>{}</Project>\r\n    \
                    </ProjectReference>\r\n",
                project_file_name(dep, dep_kind, build.platform.id()),
                braced(&dep.guid(dep_kind))
            ));
        }
        out.push_str("  </ItemGroup>\r\n");
    }

    out.push_str("  <Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.targets\" />\r\n</Project>\r\
        \n");
    Ok(out)
}

pub fn project_filters(project: &Project, kind: GuidKind) -> String {
    let guid = project.guid(kind);
    let (headers, sources) = files(project, kind);

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\n");
    out.push_str(&format!("<Project ToolsVersion=\"4.0\" xmlns=\"{MSBUILD_NS}\">\r\n"));
    out.push_str("  <ItemGroup>\r\n");
    for (filter, extensions) in [
        ("Source Files", "cpp;c;cc;cxx;def;odl;idl;hpj;bat;asm;asmx"),
        ("Header Files", "h;hh;hpp;hxx;hm;inl;inc;xsd"),
    ] {
        out.push_str(&format!(
            "    <Filter Include=\"{filter}\">\r\n      <UniqueIdentifier>{}</UniqueIdentifier>\r\
                \n      <Extensions>{extensions}</Extensions>\r\n    </Filter>\r\n",
            braced(&stable_guid(&format!("{guid}{filter}")))
        ));
    }
    out.push_str("  </ItemGroup>\r\n");

    for (element, filter, items) in [
        ("ClInclude", "Header Files", &headers),
        ("ClCompile", "Source Files", &sources),
    ] {
        if items.is_empty() {
            continue;
        }
        out.push_str("  <ItemGroup>\r\n");
        for item in items {
            out.push_str(&format!(
                "    <{element} Include=\"{item}\">\r\n      <Filter>{filter}</Filter>\r\n    \
                    </{element}>\r\n"
            ));
        }
        out.push_str("  </ItemGroup>\r\n");
    }
    out.push_str("</Project>\r\n");
    out
}

fn configuration_type(kind: GuidKind, config: &VsConfiguration) -> &'static str {
    match kind {
        GuidKind::PublisherSubscriber => "Application",
        GuidKind::Jni => "DynamicLibrary",
        GuidKind::Types if config.dll => "DynamicLibrary",
        GuidKind::Types => "StaticLibrary",
    }
}

fn files(project: &Project, kind: GuidKind) -> (Vec<String>, Vec<String>) {
    let mut headers = Vec::new();
    let mut sources = Vec::new();
    for role in roles(kind) {
        headers.extend(project.headers(*role).iter().cloned());
        sources.extend(project.sources(*role).iter().cloned());
    }
    (headers, sources)
}

fn push_items(out: &mut String, element: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str("  <ItemGroup>\r\n");
    for item in items {
        out.push_str(&format!("    <{element} Include=\"{item}\" />\r\n"));
    }
    out.push_str("  </ItemGroup>\r\n");
}

/// `a;b;%(Name)`
fn with_inherited(values: &[&str], name: &str) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .chain(std::iter::once(format!("%({name})")))
        .collect::<Vec<_>>()
        .join(";")
}
