//! Managed-language binding: one class per declared type, the pub/sub
//! wrapper and the native bridge behind it.

use super::cpp::idl_name;
use super::naming::{capitalize, header_guard, java_default, java_type};
use super::{UnitAttributes, banner, group};
use crate::error::{GenerateError, GenerateResult};
use ddsgen_core::{Context, EnumTypeCode, JavaPackage, StructTypeCode, TypeCode};

/// Dotted package of a type declared in `scope`, `com.acme.geo`.
pub fn managed_package(package: &JavaPackage, scope: &[String]) -> String {
    package
        .dotted()
        .split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .chain(scope.iter().cloned())
        .collect::<Vec<_>>()
        .join(".")
}

pub fn java_type_source(unit: &UnitAttributes<'_>, ty: &TypeCode) -> GenerateResult<String> {
    let ctx = unit.ctx;
    let mut out = String::new();
    banner(&mut out, "//", &idl_name(ctx));

    let package = managed_package(ctx.package(), ty.scope());
    if !package.is_empty() {
        out.push_str(&format!("package {package};\n\n"));
    }

    match ty {
        TypeCode::Struct(s) => struct_class(&mut out, ctx, s),
        TypeCode::Enum(e) => enum_class(&mut out, e),
        TypeCode::Alias(_) => {
            return Err(GenerateError::Template(format!(
                "template group {} does not accept the typedef {}",
                group::JAVA_TYPE,
                ty.scoped_name()
            )));
        }
    }
    Ok(out)
}

fn struct_class(out: &mut String, ctx: &Context, s: &StructTypeCode) {
    let package = ctx.package();
    let extends = s
        .base()
        .map(|b| format!(" extends {}{}", package.prefix(), b.parts.join(".")))
        .unwrap_or_default();

    out.push_str(&format!("public class {}{extends}\n{{\n", s.name()));
    out.push_str(&format!("    public {}()\n    {{\n    }}\n\n", s.name()));

    for member in s.members() {
        let ty = java_type(&member.ty, package, false);
        let accessor = capitalize(&member.name);
        let m = &member.name;
        out.push_str(&format!(
            "    public void set{accessor}({ty} {m})\n    {{\n        {m}_ = {m};\n    }}\n\n"
        ));
        out.push_str(&format!(
            "    public {ty} get{accessor}()\n    {{\n        return {m}_;\n    }}\n\n"
        ));
    }

    for member in s.members() {
        out.push_str(&format!(
            "    private {} {}_ = {};\n",
            java_type(&member.ty, package, false),
            member.name,
            java_default(&member.ty, package)
        ));
    }
    out.push_str("}\n");
}

fn enum_class(out: &mut String, e: &EnumTypeCode) {
    out.push_str(&format!("public enum {}\n{{\n", e.name));
    let last = e.enumerators.len().saturating_sub(1);
    for (i, enumerator) in e.enumerators.iter().enumerate() {
        let sep = if i == last { ";" } else { "," };
        out.push_str(&format!("    {enumerator}{sep}\n"));
    }
    out.push_str("}\n");
}

/// `<Unit>PubSub.java`, the entry point loading the native bridge.
pub fn pubsub_wrapper(unit: &UnitAttributes<'_>) -> GenerateResult<String> {
    let ctx = unit.ctx;
    super::require_topic(unit, group::JAVA_SOURCE)?;
    let class = format!("{}PubSub", ctx.filename());

    let mut out = String::new();
    banner(&mut out, "//", &idl_name(ctx));
    if !ctx.package().is_empty() {
        out.push_str(&format!("package {};\n\n", ctx.package().dotted()));
    }
    out.push_str(&format!("public class {class}\n{{\n"));
    out.push_str("    public native void run(int type);\n\n");
    out.push_str(&format!(
        "    static\n    {{\n        System.loadLibrary(\"{class}JNI\");\n    }}\n\n"
    ));
    out.push_str("    public static void main(String[] args)\n    {\n        int type = 0;\n\n");
    out.push_str("        if(args.length == 1)\n        {\n            \
        if(args[0].equals(\"publisher\"))\n                type = 1;\n            else \
        if(args[0].equals(\"subscriber\"))\n                type = 2;\n        }\n\n");
    out.push_str("        if(type == 0)\n        {\n            System.out.println(\"Error: \
        Incorrect arguments.\");\n            System.out.println(\"Usage: \");\n            \
        System.out.println();\n");
    out.push_str(&format!(
        "            System.out.println(\"java {class} publisher|subscriber\");\n            \
            System.out.println();\n            return;\n        }}\n\n"
    ));
    out.push_str(&format!(
        "        {class} pubsub = new {class}();\n        pubsub.run(type);\n    }}\n}}\n"
    ));
    Ok(out)
}

/// `<Unit>PubSubJNII.h`
pub fn jni_header(unit: &UnitAttributes<'_>) -> String {
    let ctx = unit.ctx;
    let guard = header_guard(ctx, "PubSubJNII");
    let mut out = String::new();
    banner(&mut out, "//", &idl_name(ctx));
    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
    out.push_str(&format!(
        "#include <jni.h>\n#include \"{}PubSubJNI.h\"\n\n",
        ctx.filename()
    ));
    out.push_str(&format!(
        "#ifdef __cplusplus\nextern \"C\" {{\n#endif\n\nJNIEXPORT void JNICALL {}(JNIEnv *env, \
            jobject obj, jint type);\n\n#ifdef __cplusplus\n}}\n#endif\n\n",
        run_symbol(ctx)
    ));
    out.push_str(&format!("#endif // {guard}\n"));
    out
}

/// `<Unit>PubSubJNI.cxx`
pub fn jni_source(unit: &UnitAttributes<'_>) -> String {
    let ctx = unit.ctx;
    let name = ctx.filename();
    let mut out = String::new();
    banner(&mut out, "//", &idl_name(ctx));
    out.push_str(&format!("#include \"{name}PubSubJNII.h\"\n"));

    let runnable = ctx.has_topic() && unit.example.is_some();
    if runnable {
        out.push_str(&format!(
            "#include \"{name}Publisher.h\"\n#include \"{name}Subscriber.h\"\n"
        ));
    }
    out.push_str("\n#include <iostream>\n\n");

    out.push_str(&format!(
        "JNIEXPORT void JNICALL {}(JNIEnv *env, jobject obj, jint type)\n{{\n    (void)env;\n    \
            (void)obj;\n\n",
        run_symbol(ctx)
    ));
    if runnable {
        out.push_str(&format!(
            "    switch(type)\n    {{\n        case 1:\n        {{\n            {name}Publisher \
                mypub;\n            if(mypub.init())\n                mypub.run();\n            \
                break;\n        }}\n        case 2:\n        {{\n            {name}Subscriber \
                mysub;\n            if(mysub.init())\n                mysub.run();\n            \
                break;\n        }}\n    }}\n"
        ));
    } else {
        out.push_str(&format!(
            "    (void)type;\n    std::cout << \"{name} declares no topic type\" << std::endl;\n"
        ));
    }
    out.push_str("}\n");
    out
}

/// Native symbol of `<Unit>PubSub.run`, mangled the way the JVM looks it up.
fn run_symbol(ctx: &Context) -> String {
    let class = format!("{}PubSub", ctx.filename());
    let mut symbol = String::from("Java_");
    for segment in ctx
        .package()
        .dotted()
        .split('.')
        .filter(|s| !s.is_empty())
        .chain([class.as_str(), "run"])
    {
        symbol.push_str(&segment.replace('_', "_1"));
        symbol.push('_');
    }
    symbol.pop();
    symbol
}
