//! Type declarations and serialization for the native binding.

use super::naming::{
    DEFAULT_SEQUENCE_BOUND, DEFAULT_STRING_BOUND, cpp_primitive, cpp_scoped, cpp_type,
    header_guard, is_enum, primitive_size, resolve_alias,
};
use super::{UnitAttributes, banner};
use ddsgen_core::{
    Context, EnumTypeCode, IdentifierStack, LoopVariables, MemberTypeCode, StructTypeCode,
    TypeCode, TypeSpec,
};

const EXPORT: &str = "eProsima_user_DllExport";

pub fn types_header(unit: &UnitAttributes<'_>) -> String {
    let ctx = unit.ctx;
    let guard = header_guard(ctx, "");
    let mut out = String::new();
    banner(&mut out, "//", &idl_name(ctx));

    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
    for dep in dependency_stems(ctx) {
        out.push_str(&format!("#include \"{dep}.h\"\n"));
    }
    out.push_str("\n#include <stdint.h>\n#include <array>\n#include <string>\n#include <vector>\n\
        \n");
    push_export_macros(&mut out, ctx);
    out.push_str("namespace eprosima\n{\n    namespace fastcdr\n    {\n        class Cdr;\n    }\n}\
        \n\n");

    for constant in ctx.constants().iter().filter(|c| c.origin.is_unit()) {
        open_namespaces(&mut out, &constant.scope);
        out.push_str(&format!(
            "const {} {} = {};\n",
            cpp_type(&constant.ty),
            constant.name,
            constant.value
        ));
        close_namespaces(&mut out, &constant.scope);
    }

    for ty in ctx.unit_types() {
        open_namespaces(&mut out, ty.scope());
        match ty {
            TypeCode::Struct(s) => struct_declaration(&mut out, ctx, s),
            TypeCode::Enum(e) => enum_declaration(&mut out, e),
            TypeCode::Alias(a) => {
                out.push_str(&format!("typedef {} {};\n", cpp_type(&a.ty), a.name));
            }
        }
        close_namespaces(&mut out, ty.scope());
        out.push('\n');
    }

    out.push_str(&format!("#endif // {guard}\n"));
    out
}

pub fn types_source(unit: &UnitAttributes<'_>) -> String {
    let ctx = unit.ctx;
    let mut out = String::new();
    banner(&mut out, "//", &idl_name(ctx));

    out.push_str("#ifdef _WIN32\n// Remove linker warning LNK4221 on Visual Studio\nnamespace { \
        char dummy; }\n#endif\n\n");
    out.push_str(&format!("#include \"{}.h\"\n", ctx.filename()));
    out.push_str("#include <fastcdr/Cdr.h>\n\n#include <fastcdr/exceptions/BadParamException.h>\
        \nusing namespace eprosima::fastcdr::exception;\n\n#include <utility>\n\n");

    for s in ctx.unit_types().filter_map(TypeCode::as_struct) {
        struct_definition(&mut out, ctx, s);
    }
    out
}

pub fn type_object_header(unit: &UnitAttributes<'_>) -> String {
    let ctx = unit.ctx;
    let guard = header_guard(ctx, "TypeObject");
    let mut out = String::new();
    banner(&mut out, "//", &idl_name(ctx));

    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
    out.push_str(&format!("#include \"{}.h\"\n", ctx.filename()));
    out.push_str("#include <fastrtps/types/TypeObject.h>\n#include \
        <fastrtps/types/TypeObjectFactory.h>\n\n");
    out.push_str("using namespace eprosima::fastrtps::types;\n\n");
    out.push_str(&format!("{EXPORT} void register{}Types();\n\n", ctx.filename()));

    for s in ctx.unit_types().filter_map(TypeCode::as_struct) {
        open_namespaces(&mut out, s.scope());
        out.push_str(&format!(
            "{EXPORT} const TypeIdentifier* Get{0}Identifier(bool complete = false);\n\
             {EXPORT} const TypeObject* Get{0}Object(bool complete = false);\n",
            s.name()
        ));
        close_namespaces(&mut out, s.scope());
    }

    out.push_str(&format!("\n#endif // {guard}\n"));
    out
}

pub fn type_object_source(unit: &UnitAttributes<'_>) -> String {
    let ctx = unit.ctx;
    let mut out = String::new();
    banner(&mut out, "//", &idl_name(ctx));

    out.push_str(&format!("#include \"{}TypeObject.h\"\n\n", ctx.filename()));
    out.push_str(&format!("void register{}Types()\n{{\n", ctx.filename()));
    out.push_str("    TypeObjectFactory *factory = TypeObjectFactory::get_instance();\n");
    for s in ctx.unit_types().filter_map(TypeCode::as_struct) {
        out.push_str(&format!(
            "    factory->add_type_object(\"{}\", {}(true), {}(true));\n",
            s.scoped_name(),
            getter(s, "Identifier"),
            getter(s, "Object")
        ));
    }
    out.push_str("}\n\n");

    for s in ctx.unit_types().filter_map(TypeCode::as_struct) {
        for (kind, ret) in [("Identifier", "TypeIdentifier"), ("Object", "TypeObject")] {
            out.push_str(&format!(
                "const {ret}* {}(bool complete)\n{{\n    return \
                    TypeObjectFactory::get_instance()->get_type_{}(\"{}\", complete);\n}}\n\n",
                getter(s, kind),
                kind.to_lowercase(),
                s.scoped_name()
            ));
        }
    }
    out
}

/// `geo::GetPointIdentifier`
fn getter(s: &StructTypeCode, kind: &str) -> String {
    let mut parts: Vec<String> = s.scope().to_vec();
    parts.push(format!("Get{}{kind}", s.name()));
    parts.join("::")
}

fn struct_declaration(out: &mut String, ctx: &Context, s: &StructTypeCode) {
    let name = s.name();
    let inherit = s
        .base()
        .map(|b| format!(" : public {}", cpp_scoped(b)))
        .unwrap_or_default();

    out.push_str(&format!(
        "/*!\n * @brief This class represents the structure {name} defined by the user in the IDL \
            file.\n * @ingroup {}\n */\n",
        ctx.filename_upper()
    ));
    out.push_str(&format!("class {name}{inherit}\n{{\npublic:\n"));
    out.push_str(&format!("    {EXPORT} {name}();\n"));
    out.push_str(&format!("    {EXPORT} ~{name}();\n"));
    out.push_str(&format!("    {EXPORT} {name}(const {name} &x);\n"));
    out.push_str(&format!("    {EXPORT} {name}({name} &&x);\n"));
    out.push_str(&format!("    {EXPORT} {name}& operator=(const {name} &x);\n"));
    out.push_str(&format!("    {EXPORT} {name}& operator=({name} &&x);\n\n"));

    for member in s.members() {
        let ty = cpp_type(&member.ty);
        let m = &member.name;
        if is_by_value(ctx, &member.ty) {
            out.push_str(&format!("    {EXPORT} void {m}({ty} _{m});\n"));
            out.push_str(&format!("    {EXPORT} {ty} {m}() const;\n"));
        } else {
            out.push_str(&format!("    {EXPORT} void {m}(const {ty} &_{m});\n"));
            out.push_str(&format!("    {EXPORT} void {m}({ty} &&_{m});\n"));
            out.push_str(&format!("    {EXPORT} const {ty}& {m}() const;\n"));
        }
        out.push_str(&format!("    {EXPORT} {ty}& {m}();\n"));
    }

    out.push_str(&format!(
        "\n    {EXPORT} static size_t getMaxCdrSerializedSize(size_t current_alignment = 0);\n"
    ));
    out.push_str(&format!(
        "    {EXPORT} static size_t getCdrSerializedSize(const {name}& data, size_t \
            current_alignment = 0);\n"
    ));
    out.push_str(&format!("    {EXPORT} void serialize(eprosima::fastcdr::Cdr &cdr) const;\n"));
    out.push_str(&format!("    {EXPORT} void deserialize(eprosima::fastcdr::Cdr &cdr);\n"));
    out.push_str(&format!(
        "    {EXPORT} static size_t getKeyMaxCdrSerializedSize(size_t current_alignment = 0);\n"
    ));
    out.push_str(&format!("    {EXPORT} static bool isKeyDefined();\n"));
    out.push_str(&format!("    {EXPORT} void serializeKey(eprosima::fastcdr::Cdr &cdr) const;\n"));

    out.push_str("\nprivate:\n");
    for member in s.members() {
        out.push_str(&format!("    {} m_{};\n", cpp_type(&member.ty), member.name));
    }
    out.push_str("};\n");
}

fn enum_declaration(out: &mut String, e: &EnumTypeCode) {
    out.push_str(&format!(
        "/*!\n * @brief This class represents the enumeration {} defined by the user in the IDL \
            file.\n */\n",
        e.name
    ));
    out.push_str(&format!("enum {} : uint32_t\n{{\n", e.name));
    for (i, enumerator) in e.enumerators.iter().enumerate() {
        let sep = if i + 1 < e.enumerators.len() { "," } else { "" };
        out.push_str(&format!("    {enumerator}{sep}\n"));
    }
    out.push_str("};\n");
}

fn struct_definition(out: &mut String, ctx: &Context, s: &StructTypeCode) {
    let class = s.scoped_name();
    let name = s.name();
    let base = s.base().map(cpp_scoped);

    // Constructors and assignment.
    out.push_str(&format!("{class}::{name}()\n{{\n"));
    for member in s.members() {
        if let Some(init) = default_value(ctx, &member.ty) {
            out.push_str(&format!("    m_{} = {init};\n", member.name));
        }
    }
    out.push_str("}\n\n");
    out.push_str(&format!("{class}::~{name}()\n{{\n}}\n\n"));

    let copy_base = base
        .as_ref()
        .map(|b| format!(" : {b}(x)"))
        .unwrap_or_default();
    let move_base = base
        .as_ref()
        .map(|b| format!(" : {b}(std::move(x))"))
        .unwrap_or_default();
    out.push_str(&format!("{class}::{name}(const {name} &x){copy_base}\n{{\n"));
    assign_members(out, s, false);
    out.push_str("}\n\n");
    out.push_str(&format!("{class}::{name}({name} &&x){move_base}\n{{\n"));
    assign_members(out, s, true);
    out.push_str("}\n\n");

    out.push_str(&format!("{class}& {class}::operator=(const {name} &x)\n{{\n"));
    if let Some(b) = &base {
        out.push_str(&format!("    {b}::operator=(x);\n"));
    }
    assign_members(out, s, false);
    out.push_str("\n    return *this;\n}\n\n");
    out.push_str(&format!("{class}& {class}::operator=({name} &&x)\n{{\n"));
    if let Some(b) = &base {
        out.push_str(&format!("    {b}::operator=(std::move(x));\n"));
    }
    assign_members(out, s, true);
    out.push_str("\n    return *this;\n}\n\n");

    // Sizes.
    out.push_str(&format!(
        "size_t {class}::getMaxCdrSerializedSize(size_t current_alignment)\n{{\n    size_t \
            initial_alignment = current_alignment;\n\n"
    ));
    if let Some(b) = &base {
        out.push_str(&format!(
            "    current_alignment += {b}::getMaxCdrSerializedSize(current_alignment);\n"
        ));
    }
    let mut sizes = SizeWriter::new(ctx, SizeMode::Max);
    for member in s.members() {
        sizes.member(&member.ty, &format!("m_{}", member.name));
    }
    out.push_str(&sizes.finish());
    out.push_str("\n    return current_alignment - initial_alignment;\n}\n\n");

    out.push_str(&format!(
        "size_t {class}::getCdrSerializedSize(const {class}& data, size_t current_alignment)\n{{\
            \n    (void)data;\n    size_t initial_alignment = current_alignment;\n\n"
    ));
    if let Some(b) = &base {
        out.push_str(&format!(
            "    current_alignment += {b}::getCdrSerializedSize(data, current_alignment);\n"
        ));
    }
    let mut sizes = SizeWriter::new(ctx, SizeMode::Data);
    for member in s.members() {
        sizes.member(&member.ty, &format!("data.{}()", member.name));
    }
    out.push_str(&sizes.finish());
    out.push_str("\n    return current_alignment - initial_alignment;\n}\n\n");

    // Serialization.
    out.push_str(&format!("void {class}::serialize(eprosima::fastcdr::Cdr &scdr) const\n{{\n"));
    if let Some(b) = &base {
        out.push_str(&format!("    {b}::serialize(scdr);\n"));
    }
    for member in s.members() {
        if is_enum(ctx, &member.ty) {
            out.push_str(&format!("    scdr << (uint32_t)m_{};\n", member.name));
        } else {
            out.push_str(&format!("    scdr << m_{};\n", member.name));
        }
    }
    out.push_str("}\n\n");

    out.push_str(&format!("void {class}::deserialize(eprosima::fastcdr::Cdr &dcdr)\n{{\n"));
    if let Some(b) = &base {
        out.push_str(&format!("    {b}::deserialize(dcdr);\n"));
    }
    let mut identifiers = IdentifierStack::default();
    for member in s.members() {
        if is_enum(ctx, &member.ty) {
            let aux = identifiers.allocate();
            out.push_str(&format!(
                "    {{\n        uint32_t {aux} = 0;\n        dcdr >> {aux};\n        m_{} = \
                    ({}){aux};\n    }}\n",
                member.name,
                cpp_type(&member.ty)
            ));
            identifiers.release();
        } else {
            out.push_str(&format!("    dcdr >> m_{};\n", member.name));
        }
    }
    out.push_str("}\n\n");

    // Accessors.
    for member in s.members() {
        accessors(out, ctx, &class, member);
    }

    // Key support.
    out.push_str(&format!(
        "size_t {class}::getKeyMaxCdrSerializedSize(size_t current_alignment)\n{{\n    size_t \
            current_align = current_alignment;\n\n"
    ));
    let mut sizes = SizeWriter::new(ctx, SizeMode::Max).with_accumulator("current_align");
    for member in s.key_members() {
        sizes.member(&member.ty, &format!("m_{}", member.name));
    }
    out.push_str(&sizes.finish());
    out.push_str("\n    return current_align;\n}\n\n");

    out.push_str(&format!(
        "bool {class}::isKeyDefined()\n{{\n    return {};\n}}\n\n",
        s.has_identity_key()
    ));

    out.push_str(&format!(
        "void {class}::serializeKey(eprosima::fastcdr::Cdr &scdr) const\n{{\n    (void) scdr;\n"
    ));
    for member in s.key_members() {
        if is_enum(ctx, &member.ty) {
            out.push_str(&format!("    scdr << (uint32_t)m_{};\n", member.name));
        } else {
            out.push_str(&format!("    scdr << m_{};\n", member.name));
        }
    }
    out.push_str("}\n\n");
}

fn assign_members(out: &mut String, s: &StructTypeCode, moving: bool) {
    for member in s.members() {
        let m = &member.name;
        if moving {
            out.push_str(&format!("    m_{m} = std::move(x.m_{m});\n"));
        } else {
            out.push_str(&format!("    m_{m} = x.m_{m};\n"));
        }
    }
}

fn accessors(out: &mut String, ctx: &Context, class: &str, member: &MemberTypeCode) {
    let ty = cpp_type(&member.ty);
    let m = &member.name;

    if is_by_value(ctx, &member.ty) {
        out.push_str(&format!(
            "void {class}::{m}({ty} _{m})\n{{\n    m_{m} = _{m};\n}}\n\n"
        ));
        out.push_str(&format!("{ty} {class}::{m}() const\n{{\n    return m_{m};\n}}\n\n"));
    } else {
        out.push_str(&format!(
            "void {class}::{m}(const {ty} &_{m})\n{{\n    m_{m} = _{m};\n}}\n\n"
        ));
        out.push_str(&format!(
            "void {class}::{m}({ty} &&_{m})\n{{\n    m_{m} = std::move(_{m});\n}}\n\n"
        ));
        out.push_str(&format!(
            "const {ty}& {class}::{m}() const\n{{\n    return m_{m};\n}}\n\n"
        ));
    }
    out.push_str(&format!("{ty}& {class}::{m}()\n{{\n    return m_{m};\n}}\n\n"));
}

/// Primitives and enums are passed by value, everything else by reference.
fn is_by_value(ctx: &Context, ty: &TypeSpec) -> bool {
    matches!(resolve_alias(ctx, ty), TypeSpec::Primitive(_)) || is_enum(ctx, ty)
}

fn default_value(ctx: &Context, ty: &TypeSpec) -> Option<String> {
    match resolve_alias(ctx, ty) {
        TypeSpec::Primitive(kind) => Some(match cpp_primitive(*kind) {
            "bool" => "false".to_string(),
            _ => "0".to_string(),
        }),
        TypeSpec::String { wide: false, .. } => Some("\"\"".to_string()),
        TypeSpec::Named(_) if is_enum(ctx, ty) => Some(format!("({})0", cpp_type(ty))),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SizeMode {
    /// Worst case, from bounds.
    Max,
    /// Actual size of `data`.
    Data,
}

/// Emits the statements that add up a serialized size. Nested collections
/// get loop variables `a`, `b`, ... restarted for every member.
struct SizeWriter<'a> {
    ctx: &'a Context,
    mode: SizeMode,
    acc: &'static str,
    loops: LoopVariables,
    fresh: bool,
    out: String,
}

impl<'a> SizeWriter<'a> {
    fn new(ctx: &'a Context, mode: SizeMode) -> Self {
        Self {
            ctx,
            mode,
            acc: "current_alignment",
            loops: LoopVariables::default(),
            fresh: true,
            out: String::new(),
        }
    }

    fn with_accumulator(mut self, acc: &'static str) -> Self {
        self.acc = acc;
        self
    }

    fn member(&mut self, ty: &TypeSpec, access: &str) {
        self.fresh = true;
        self.size(ty, access, 1);
    }

    fn finish(self) -> String {
        self.out
    }

    fn loop_variable(&mut self) -> String {
        if self.fresh {
            self.fresh = false;
            self.loops.restart()
        } else {
            self.loops.advance()
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        self.out.push_str(&"    ".repeat(depth));
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn aligned(&self, count: &str, size: usize) -> String {
        format!(
            "{acc} += ({count} * {size}) + eprosima::fastcdr::Cdr::alignment({acc}, {size});",
            acc = self.acc
        )
    }

    fn size(&mut self, ty: &TypeSpec, access: &str, depth: usize) {
        let ctx = self.ctx;
        let acc = self.acc;
        let resolved = resolve_alias(ctx, ty);

        match resolved {
            TypeSpec::Primitive(kind) => {
                let line = self.aligned("1", primitive_size(*kind));
                self.line(depth, &line);
            }
            TypeSpec::String { wide, bound } => {
                let char_size = if *wide { 4 } else { 1 };
                let length = match self.mode {
                    SizeMode::Max => bound.unwrap_or(DEFAULT_STRING_BOUND).to_string(),
                    SizeMode::Data => format!("{access}.size()"),
                };
                self.line(
                    depth,
                    &format!(
                        "{acc} += 4 + eprosima::fastcdr::Cdr::alignment({acc}, 4) + ({length} * \
                            {char_size}) + 1;"
                    ),
                );
            }
            TypeSpec::Sequence { element, bound } => {
                self.line(
                    depth,
                    &format!("{acc} += 4 + eprosima::fastcdr::Cdr::alignment({acc}, 4);"),
                );
                let count = match self.mode {
                    SizeMode::Max => bound.unwrap_or(DEFAULT_SEQUENCE_BOUND).to_string(),
                    SizeMode::Data => format!("{access}.size()"),
                };
                self.elements(element, access, &count, depth);
            }
            TypeSpec::Array {
                element,
                dimensions,
            } => {
                if let TypeSpec::Primitive(kind) = resolve_alias(ctx, element) {
                    let total: u64 = dimensions.iter().map(|d| u64::from(*d)).product();
                    let line = self.aligned(&total.to_string(), primitive_size(*kind));
                    self.line(depth, &line);
                } else {
                    self.nested_array(element, dimensions, access, depth);
                }
            }
            TypeSpec::Named(name) => {
                if is_enum(ctx, resolved) {
                    let line = self.aligned("1", 4);
                    self.line(depth, &line);
                } else {
                    let line = match self.mode {
                        SizeMode::Max => format!(
                            "{acc} += {}::getMaxCdrSerializedSize({acc});",
                            cpp_scoped(name)
                        ),
                        SizeMode::Data => format!(
                            "{acc} += {}::getCdrSerializedSize({access}, {acc});",
                            cpp_scoped(name)
                        ),
                    };
                    self.line(depth, &line);
                }
            }
        }
    }

    fn elements(&mut self, element: &TypeSpec, access: &str, count: &str, depth: usize) {
        if let TypeSpec::Primitive(kind) = resolve_alias(self.ctx, element) {
            let line = self.aligned(count, primitive_size(*kind));
            self.line(depth, &line);
            return;
        }

        let var = self.loop_variable();
        self.line(depth, &format!("for(size_t {var} = 0; {var} < {count}; ++{var})"));
        self.line(depth, "{");
        let inner = match self.mode {
            SizeMode::Max => access.to_string(),
            SizeMode::Data => format!("{access}.at({var})"),
        };
        self.size(element, &inner, depth + 1);
        self.line(depth, "}");
    }

    fn nested_array(&mut self, element: &TypeSpec, dimensions: &[u32], access: &str, depth: usize) {
        let Some((first, rest)) = dimensions.split_first() else {
            self.size(element, access, depth);
            return;
        };

        let var = self.loop_variable();
        self.line(depth, &format!("for(size_t {var} = 0; {var} < {first}; ++{var})"));
        self.line(depth, "{");
        let inner = match self.mode {
            SizeMode::Max => access.to_string(),
            SizeMode::Data => format!("{access}[{var}]"),
        };
        self.nested_array(element, rest, &inner, depth + 1);
        self.line(depth, "}");
    }
}

pub(super) fn open_namespaces(out: &mut String, scope: &[String]) {
    for module in scope {
        out.push_str(&format!("namespace {module}\n{{\n"));
    }
}

pub(super) fn close_namespaces(out: &mut String, scope: &[String]) {
    for module in scope.iter().rev() {
        out.push_str(&format!("}} // namespace {module}\n"));
    }
}

fn push_export_macros(out: &mut String, ctx: &Context) {
    let upper = ctx.filename_upper();
    out.push_str("#if defined(_WIN32)\n#if defined(EPROSIMA_USER_DLL_EXPORT)\n");
    out.push_str(&format!("#define {EXPORT} __declspec( dllexport )\n#else\n#define {EXPORT}\
        \n#endif\n#else\n#define {EXPORT}\n#endif\n\n"));
    out.push_str("#if defined(_WIN32)\n#if defined(EPROSIMA_USER_DLL_EXPORT)\n");
    out.push_str(&format!("#if defined({upper}_SOURCE)\n#define {upper}_DllAPI __declspec( \
        dllexport )\n#else\n#define {upper}_DllAPI __declspec( dllimport )\n#endif // \
        {upper}_SOURCE\n"));
    out.push_str(&format!("#else\n#define {upper}_DllAPI\n#endif\n#else\n#define {upper}_DllAPI\
        \n#endif // _WIN32\n\n"));
}

/// File stems of the unit's included IDL files, in stable order.
pub(super) fn dependency_stems(ctx: &Context) -> Vec<String> {
    ctx.dependencies()
        .iter()
        .filter_map(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .collect()
}

pub(super) fn idl_name(ctx: &Context) -> String {
    ctx.source_path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}.idl", ctx.filename()))
}
