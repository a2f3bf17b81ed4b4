//! Portable makefile for the Linux targets.

use super::{BuildAttributes, group};
use crate::error::{GenerateError, GenerateResult};
use ddsgen_solution::{Backend, FileRole, LinkVariant, Project};

/// Roles linked into the example executable.
pub(super) const EXAMPLE_ROLES: [FileRole; 5] = [
    FileRole::Common,
    FileRole::Topic,
    FileRole::Publisher,
    FileRole::Subscriber,
    FileRole::Example,
];

/// Roles linked into the native bridge library.
pub(super) const BRIDGE_ROLES: [FileRole; 5] = [
    FileRole::Common,
    FileRole::Topic,
    FileRole::Publisher,
    FileRole::Subscriber,
    FileRole::NativeInterface,
];

pub fn makefile(build: &BuildAttributes<'_>) -> GenerateResult<String> {
    let Backend::Makefile { arch_flag } = build.backend else {
        return Err(GenerateError::Template(format!(
            "template group {} needs a makefile platform, got {}",
            group::MAKEFILE,
            build.platform
        )));
    };
    let solution = build.solution;
    let java = solution.language() == ddsgen_core::Language::Java;

    let mut out = String::new();
    out.push_str(&format!(
        "# Generated by ddsgen for platform {}\n\nCPP=g++\nLN=g++\nAR=ar\nCP=cp\nSYSLIBS= -ldl \
            -lnsl -lm -lpthread -lrt\nDEFINES=\n",
        build.platform
    ));
    let mut cflags = String::from("-c -Wall -D__LITTLE_ENDIAN__ -std=c++11");
    let mut ldflags = String::new();
    if !arch_flag.is_empty() {
        cflags.push_str(&format!(" {arch_flag}"));
        ldflags.push_str(arch_flag);
    }
    if java {
        cflags.push_str(" -fpic");
    }
    out.push_str(&format!("COMMON_CFLAGS= {cflags}\nLDFLAGS={ldflags}\n\n"));
    out.push_str("CFLAGS = $(COMMON_CFLAGS) -O2\n");

    let includes: Vec<String> = std::iter::once("-I.".to_string())
        .chain(solution.include_paths().iter().map(|p| format!("-I{p}")))
        .collect();
    out.push_str(&format!("INCLUDES= {}\n", includes.join(" ")));

    let mut libs: Vec<String> = solution
        .library_paths()
        .iter()
        .map(|p| format!("-L{p}"))
        .collect();
    libs.extend(
        solution
            .decorated_libraries(build.platform, LinkVariant::RELEASE)
            .into_iter()
            .map(|l| format!("-l{l}")),
    );
    libs.push("$(SYSLIBS)".to_string());
    out.push_str(&format!("LIBS = {}\n", libs.join(" ")));
    out.push_str("DIRECTORIES= output.dir bin.dir lib.dir\n\n");

    let targets: Vec<Target> = solution
        .dependency_order()
        .into_iter()
        .filter(|p| p.has_topic())
        .flat_map(|p| {
            let mut targets = vec![Target::example(build, p)];
            if java {
                targets.push(Target::bridge(build, p));
            }
            targets
        })
        .collect();

    let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
    out.push_str(&format!("all: $(DIRECTORIES) {}\n\n", names.join(" ")));

    for target in &targets {
        target.write(&mut out);
    }

    out.push_str("output/%.o:%.cxx\n\t$(CPP) $(CFLAGS) $(INCLUDES) $< -o $@\n\n");
    out.push_str("%.dir:\n\t@echo \"Checking directory $*\"\n\t@if [ ! -d $* ]; then \\\
        \n\t\techo \"Making directory $*\"; \\\n\t\tmkdir -p $* ; \\\n\tfi;\n\n");
    out.push_str("clean:\n\t@rm -f output/*.o\n\t@rm -rf bin lib\n\n");
    out.push_str(&format!(
        ".PHONY: all clean {}\n",
        names.join(" ")
    ));
    Ok(out)
}

/// One linked artifact: the example executable or the bridge library.
struct Target {
    name: String,
    output: String,
    link: &'static str,
    sources: Vec<String>,
}

impl Target {
    fn example(build: &BuildAttributes<'_>, project: &Project) -> Self {
        Self {
            name: project.name().to_string(),
            output: format!("bin/{}", project.name()),
            link: "$(LDFLAGS)",
            sources: closure_sources(build, project, &EXAMPLE_ROLES),
        }
    }

    fn bridge(build: &BuildAttributes<'_>, project: &Project) -> Self {
        Self {
            name: format!("{}PubSubJNI", project.name()),
            output: format!("lib/lib{}PubSubJNI.so", project.name()),
            link: "$(LDFLAGS) -shared",
            sources: closure_sources(build, project, &BRIDGE_ROLES),
        }
    }

    fn write(&self, out: &mut String) {
        let name = &self.name;
        out.push_str(&format!("{name}_TARGET= {}\n{name}_SRC_CXXFILES=\n", self.output));
        for source in &self.sources {
            out.push_str(&format!("{name}_SRC_CXXFILES+={source}\n"));
        }
        out.push_str(&format!(
            "{name}_OBJ_FILES=$({name}_SRC_CXXFILES:%.cxx=output/%.o)\n\n"
        ));
        out.push_str(&format!(
            "$({name}_TARGET): $({name}_OBJ_FILES)\n\t$(LN) {} -o $({name}_TARGET) \
                $({name}_OBJ_FILES) $(LIBS)\n\n",
            self.link
        ));
        out.push_str(&format!("{name}: $({name}_TARGET)\n\n"));
    }
}

/// Sources of `project` in `roles`, preceded by the common and topic sources
/// of every project it includes.
pub(super) fn closure_sources(
    build: &BuildAttributes<'_>,
    project: &Project,
    roles: &[FileRole],
) -> Vec<String> {
    let mut sources = Vec::new();
    for dep in build.solution.closure(project.name()) {
        for role in [FileRole::Common, FileRole::Topic] {
            sources.extend(dep.sources(role).iter().cloned());
        }
    }
    for role in roles {
        sources.extend(project.sources(*role).iter().cloned());
    }
    let mut seen = std::collections::HashSet::new();
    sources.retain(|s| seen.insert(s.clone()));
    sources
}
