//! Cross-platform build description.

use super::BuildAttributes;
use super::makefile::{BRIDGE_ROLES, EXAMPLE_ROLES, closure_sources};
use ddsgen_core::Language;
use ddsgen_solution::Project;

pub fn cmake_lists(build: &BuildAttributes<'_>) -> String {
    let solution = build.solution;
    let product = build.product;
    let java = solution.language() == Language::Java;

    let mut out = String::new();
    out.push_str("cmake_minimum_required(VERSION 2.8.12)\n\n");
    let project_name = solution
        .projects()
        .first()
        .map(Project::name)
        .unwrap_or("ddsgen");
    out.push_str(&format!("project(\"{project_name}\")\n\n"));
    out.push_str("# Find requirements\n");
    for library in product.support_libraries.iter().chain([&product.library]) {
        out.push_str(&format!("find_package({library} REQUIRED)\n"));
    }
    if java {
        out.push_str("find_package(JNI REQUIRED)\ninclude_directories(${JNI_INCLUDE_DIRS})\n");
    }
    out.push_str("\n# Set C++11\ninclude(CheckCXXCompilerFlag)\n");
    out.push_str("if(CMAKE_COMPILER_IS_GNUCXX OR CMAKE_COMPILER_IS_CLANG OR\n        \
        CMAKE_CXX_COMPILER_ID MATCHES \"Clang\")\n");
    out.push_str("    check_cxx_compiler_flag(-std=c++11 SUPPORTS_CXX11)\n    if(SUPPORTS_CXX11)\
        \n        add_compile_options(-std=c++11)\n    else()\n        \
        message(FATAL_ERROR \"Compiler doesn't support C++11\")\n    endif()\nendif()\n\n");

    let link: Vec<&str> = [product.library.as_str()]
        .into_iter()
        .chain(product.support_libraries.iter().map(String::as_str))
        .collect();
    let link = link.join(" ");

    for project in solution.dependency_order() {
        let name = project.name();
        out.push_str(&format!("message(STATUS \"Configuring {name}...\")\n"));

        if project.has_topic() {
            let sources = closure_sources(build, project, &EXAMPLE_ROLES);
            out.push_str(&format!(
                "file(GLOB {upper}_SOURCES {})\n\n",
                sources.join(" "),
                upper = name.to_uppercase()
            ));
            out.push_str(&format!(
                "add_executable({name} ${{{upper}_SOURCES}})\ntarget_link_libraries({name} {link})\
                    \n\n",
                upper = name.to_uppercase()
            ));
            if java {
                let bridge = closure_sources(build, project, &BRIDGE_ROLES);
                out.push_str(&format!(
                    "add_library({name}PubSubJNI SHARED {})\ntarget_link_libraries({name}PubSubJNI \
                        {link})\n\n",
                    bridge.join(" ")
                ));
            }
        } else {
            out.push_str(&format!("# {name} has no topic type, its sources are built with the \
                units including it\n\n"));
        }
    }
    out
}
