//! Type and identifier spelling in the generated languages.

use ddsgen_core::{Context, JavaPackage, PrimitiveKind, ScopedName, TypeCode, TypeSpec};

/// Default bound for unbounded strings when sizing buffers.
pub const DEFAULT_STRING_BOUND: u32 = 255;

/// Default bound for unbounded sequences when sizing buffers.
pub const DEFAULT_SEQUENCE_BOUND: u32 = 100;

/// C++ spelling of an IDL type.
pub fn cpp_type(ty: &TypeSpec) -> String {
    match ty {
        TypeSpec::Primitive(kind) => cpp_primitive(*kind).to_string(),
        TypeSpec::String { wide: false, .. } => "std::string".to_string(),
        TypeSpec::String { wide: true, .. } => "std::wstring".to_string(),
        TypeSpec::Sequence { element, .. } => format!("std::vector<{}>", cpp_type(element)),
        TypeSpec::Array {
            element,
            dimensions,
        } => dimensions
            .iter()
            .rev()
            .fold(cpp_type(element), |inner, dim| {
                format!("std::array<{inner}, {dim}>")
            }),
        TypeSpec::Named(name) => cpp_scoped(name),
    }
}

/// `::geo::Point` becomes `geo::Point`.
pub fn cpp_scoped(name: &ScopedName) -> String {
    name.parts.join("::")
}

pub fn cpp_primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Boolean => "bool",
        PrimitiveKind::Char => "char",
        PrimitiveKind::WChar => "wchar_t",
        PrimitiveKind::Octet | PrimitiveKind::UInt8 => "uint8_t",
        PrimitiveKind::Int8 => "int8_t",
        PrimitiveKind::Short => "int16_t",
        PrimitiveKind::UShort => "uint16_t",
        PrimitiveKind::Long => "int32_t",
        PrimitiveKind::ULong => "uint32_t",
        PrimitiveKind::LongLong => "int64_t",
        PrimitiveKind::ULongLong => "uint64_t",
        PrimitiveKind::Float => "float",
        PrimitiveKind::Double => "double",
        PrimitiveKind::LongDouble => "long double",
    }
}

/// Size and alignment of a primitive in the serialized form.
pub fn primitive_size(kind: PrimitiveKind) -> usize {
    match kind {
        PrimitiveKind::Boolean
        | PrimitiveKind::Char
        | PrimitiveKind::Octet
        | PrimitiveKind::Int8
        | PrimitiveKind::UInt8 => 1,
        PrimitiveKind::Short | PrimitiveKind::UShort => 2,
        PrimitiveKind::WChar
        | PrimitiveKind::Long
        | PrimitiveKind::ULong
        | PrimitiveKind::Float => 4,
        PrimitiveKind::LongLong | PrimitiveKind::ULongLong | PrimitiveKind::Double => 8,
        PrimitiveKind::LongDouble => 16,
    }
}

/// Java spelling of an IDL type. `boxed` selects wrapper classes, as needed
/// for generic arguments.
pub fn java_type(ty: &TypeSpec, package: &JavaPackage, boxed: bool) -> String {
    match ty {
        TypeSpec::Primitive(kind) => java_primitive(*kind, boxed).to_string(),
        TypeSpec::String { .. } => "String".to_string(),
        TypeSpec::Sequence { element, .. } => {
            format!("java.util.List<{}>", java_type(element, package, true))
        }
        TypeSpec::Array {
            element,
            dimensions,
        } => format!(
            "{}{}",
            java_type(element, package, false),
            "[]".repeat(dimensions.len())
        ),
        TypeSpec::Named(name) => format!("{}{}", package.prefix(), name.parts.join(".")),
    }
}

fn java_primitive(kind: PrimitiveKind, boxed: bool) -> &'static str {
    match (kind, boxed) {
        (PrimitiveKind::Boolean, false) => "boolean",
        (PrimitiveKind::Boolean, true) => "Boolean",
        (PrimitiveKind::Char | PrimitiveKind::WChar, false) => "char",
        (PrimitiveKind::Char | PrimitiveKind::WChar, true) => "Character",
        (PrimitiveKind::Octet | PrimitiveKind::Int8 | PrimitiveKind::UInt8, false) => "byte",
        (PrimitiveKind::Octet | PrimitiveKind::Int8 | PrimitiveKind::UInt8, true) => "Byte",
        (PrimitiveKind::Short | PrimitiveKind::UShort, false) => "short",
        (PrimitiveKind::Short | PrimitiveKind::UShort, true) => "Short",
        (PrimitiveKind::Long | PrimitiveKind::ULong, false) => "int",
        (PrimitiveKind::Long | PrimitiveKind::ULong, true) => "Integer",
        (PrimitiveKind::LongLong | PrimitiveKind::ULongLong, false) => "long",
        (PrimitiveKind::LongLong | PrimitiveKind::ULongLong, true) => "Long",
        (PrimitiveKind::Float, false) => "float",
        (PrimitiveKind::Float, true) => "Float",
        (PrimitiveKind::Double | PrimitiveKind::LongDouble, false) => "double",
        (PrimitiveKind::Double | PrimitiveKind::LongDouble, true) => "Double",
    }
}

/// Default value expression for a Java field.
pub fn java_default(ty: &TypeSpec, package: &JavaPackage) -> String {
    match ty {
        TypeSpec::Primitive(PrimitiveKind::Boolean) => "false".to_string(),
        TypeSpec::Primitive(PrimitiveKind::Char | PrimitiveKind::WChar) => "'\\0'".to_string(),
        TypeSpec::Primitive(_) => "0".to_string(),
        TypeSpec::String { .. } => "\"\"".to_string(),
        TypeSpec::Sequence { .. } => "new java.util.ArrayList<>()".to_string(),
        TypeSpec::Array {
            element,
            dimensions,
        } => {
            let dims: String = dimensions.iter().map(|d| format!("[{d}]")).collect();
            format!("new {}{dims}", java_type(element, package, false))
        }
        TypeSpec::Named(_) => "null".to_string(),
    }
}

/// `_SHAPES_PUBSUBTYPES_H_`
pub fn header_guard(ctx: &Context, suffix: &str) -> String {
    format!("_{}{}_H_", ctx.filename_upper(), suffix.to_uppercase())
}

/// Follow typedefs until a non-alias type is reached. Unknown names are
/// returned as they are.
pub fn resolve_alias<'a>(ctx: &'a Context, ty: &'a TypeSpec) -> &'a TypeSpec {
    let mut current = ty;
    // Bounded walk: a typedef chain cannot be longer than the type table.
    for _ in 0..=ctx.types().len() {
        match current {
            TypeSpec::Named(name) => match ctx.lookup(&name.to_string()) {
                Some(TypeCode::Alias(alias)) => current = &alias.ty,
                _ => return current,
            },
            _ => return current,
        }
    }
    current
}

/// Whether a named type resolves to an enum.
pub fn is_enum(ctx: &Context, ty: &TypeSpec) -> bool {
    match resolve_alias(ctx, ty) {
        TypeSpec::Named(name) => matches!(ctx.lookup(&name.to_string()), Some(TypeCode::Enum(_))),
        _ => false,
    }
}

/// Capitalize the first letter, for accessor names.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use test_case::test_case;

    fn seq(element: TypeSpec) -> TypeSpec {
        TypeSpec::Sequence {
            element: Box::new(element),
            bound: None,
        }
    }

    #[test_case(TypeSpec::Primitive(PrimitiveKind::Long), "int32_t" ; "long")]
    #[test_case(TypeSpec::Primitive(PrimitiveKind::ULongLong), "uint64_t" ; "unsigned long long")]
    #[test_case(TypeSpec::string(), "std::string" ; "string")]
    #[test_case(
        seq(TypeSpec::Primitive(PrimitiveKind::Octet)),
        "std::vector<uint8_t>" ;
        "sequence"
    )]
    #[test_case(TypeSpec::named("::geo::Point"), "geo::Point" ; "absolute name")]
    fn cpp_type___idl_types___map_to_cpp(ty: TypeSpec, expected: &str) {
        assert_eq!(cpp_type(&ty), expected);
    }

    #[test]
    fn cpp_type___multi_dimensional_array___nests_outer_first() {
        let ty = TypeSpec::Array {
            element: Box::new(TypeSpec::Primitive(PrimitiveKind::Float)),
            dimensions: vec![2, 3],
        };

        assert_eq!(cpp_type(&ty), "std::array<std::array<float, 3>, 2>");
    }

    #[test]
    fn java_type___sequence_of_primitive___boxes_element() {
        let ty = seq(TypeSpec::Primitive(PrimitiveKind::Long));

        assert_eq!(
            java_type(&ty, &JavaPackage::default(), false),
            "java.util.List<Integer>"
        );
    }

    #[test]
    fn java_type___named___uses_package_prefix() {
        let ty = TypeSpec::named("::geo::Point");

        assert_eq!(
            java_type(&ty, &JavaPackage::new("com.acme"), false),
            "com.acme.geo.Point"
        );
    }

    #[test]
    fn java_default___array___allocates_dimensions() {
        let ty = TypeSpec::Array {
            element: Box::new(TypeSpec::Primitive(PrimitiveKind::Short)),
            dimensions: vec![4, 2],
        };

        assert_eq!(java_default(&ty, &JavaPackage::default()), "new short[4][2]");
    }

    #[test]
    fn capitalize___word___uppercases_first_letter() {
        assert_eq!(capitalize("color"), "Color");
        assert_eq!(capitalize(""), "");
    }
}
