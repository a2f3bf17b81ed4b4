#![allow(non_snake_case)]

use super::*;
use crate::annotation::RawAnnotation;
use crate::tree::{Member, ModuleDecl, Origin, PrimitiveKind};

fn long_member(name: &str) -> Member {
    Member::new(name, TypeSpec::Primitive(PrimitiveKind::Long))
}

fn plain_struct(name: &str) -> Definition {
    Definition::Struct(StructDecl::new(name, vec![long_member("x")]))
}

fn module(name: &str, definitions: Vec<Definition>) -> Definition {
    Definition::Module(ModuleDecl {
        name: name.to_string(),
        annotations: vec![],
        definitions,
    })
}

fn register_all(ctx: &mut Context, definitions: Vec<Definition>) {
    let spec = Specification {
        definitions,
        dependencies: Default::default(),
    };
    ctx.register_specification(&spec).unwrap();
}

// ============================================================================
// Topic selection
// ============================================================================

#[test]
fn Context___single_struct___is_selected_topic() {
    let mut ctx = Context::new("Shapes.idl");

    register_all(&mut ctx, vec![plain_struct("Shape")]);

    assert_eq!(ctx.topic().map(|t| t.name()), Some("Shape"));
}

#[test]
fn Context___several_eligible_structs___last_one_wins() {
    let mut ctx = Context::new("Shapes.idl");

    register_all(
        &mut ctx,
        vec![plain_struct("First"), plain_struct("Second"), plain_struct("Third")],
    );

    assert_eq!(ctx.topic().map(|t| t.name()), Some("Third"));
}

#[test]
fn Context___topic_false_after_eligible___keeps_earlier_selection() {
    let mut ctx = Context::new("Shapes.idl");
    let suppressed = StructDecl::new("Helper", vec![long_member("x")])
        .with_annotation(RawAnnotation::new("Topic").with_param("value", "false"));

    register_all(
        &mut ctx,
        vec![plain_struct("Shape"), Definition::Struct(suppressed)],
    );

    assert_eq!(ctx.topic().map(|t| t.name()), Some("Shape"));
}

#[test]
fn Context___only_suppressed_structs___has_no_topic() {
    let mut ctx = Context::new("Shapes.idl");
    let suppressed = StructDecl::new("Helper", vec![long_member("x")])
        .with_annotation(RawAnnotation::new("topic").with_value("FALSE"));

    register_all(&mut ctx, vec![Definition::Struct(suppressed)]);

    assert!(!ctx.has_topic());
    assert_eq!(ctx.structs().count(), 1);
}

#[test]
fn Context___included_struct___is_not_eligible() {
    let mut ctx = Context::new("Shapes.idl");
    let included = StructDecl::new("Base", vec![long_member("x")])
        .with_origin(Origin::Included("Common.idl".into()));

    register_all(&mut ctx, vec![plain_struct("Shape"), Definition::Struct(included)]);

    assert_eq!(ctx.topic().map(|t| t.name()), Some("Shape"));
}

#[test]
fn Context___forward_declaration___is_not_selected() {
    let mut ctx = Context::new("Shapes.idl");
    let mut forward = StructDecl::new("Later", vec![]);
    forward.forward = true;

    register_all(&mut ctx, vec![plain_struct("Shape"), Definition::Struct(forward)]);

    assert_eq!(ctx.topic().map(|t| t.name()), Some("Shape"));
}

#[test]
fn Context___struct_in_module___topic_is_scoped() {
    let mut ctx = Context::new("Shapes.idl");

    register_all(&mut ctx, vec![module("geo", vec![plain_struct("Point")])]);

    assert_eq!(
        ctx.topic().map(StructTypeCode::scoped_name).as_deref(),
        Some("geo::Point")
    );
    assert!(ctx.scope().is_empty());
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn Context___relative_name___resolves_from_enclosing_scope() {
    let mut ctx = Context::new("Shapes.idl");
    let line = StructDecl::new(
        "Line",
        vec![
            Member::new("from", TypeSpec::named("Point")),
            Member::new("to", TypeSpec::named("Point")),
        ],
    );

    register_all(
        &mut ctx,
        vec![module(
            "geo",
            vec![plain_struct("Point"), module("paths", vec![Definition::Struct(line)])],
        )],
    );

    let line = ctx.lookup("geo::paths::Line").and_then(TypeCode::as_struct).unwrap();
    assert_eq!(line.members()[0].ty, TypeSpec::named("::geo::Point"));
}

#[test]
fn Context___absolute_name___resolves_from_root() {
    let mut ctx = Context::new("Shapes.idl");
    let holder = StructDecl::new("Holder", vec![Member::new("p", TypeSpec::named("::Point"))]);

    register_all(
        &mut ctx,
        vec![plain_struct("Point"), module("geo", vec![Definition::Struct(holder)])],
    );

    let holder = ctx.lookup("geo::Holder").and_then(TypeCode::as_struct).unwrap();
    assert_eq!(holder.members()[0].ty, TypeSpec::named("::Point"));
}

#[test]
fn Context___sequence_of_named___resolves_element() {
    let mut ctx = Context::new("Shapes.idl");
    let poly = StructDecl::new(
        "Polygon",
        vec![Member::new(
            "points",
            TypeSpec::Sequence {
                element: Box::new(TypeSpec::named("Point")),
                bound: None,
            },
        )],
    );

    register_all(&mut ctx, vec![plain_struct("Point"), Definition::Struct(poly)]);

    let poly = ctx.lookup("Polygon").and_then(TypeCode::as_struct).unwrap();
    assert_eq!(
        poly.members()[0].ty,
        TypeSpec::Sequence {
            element: Box::new(TypeSpec::named("::Point")),
            bound: None
        }
    );
}

#[test]
fn Context___forward_declared_name___resolves() {
    let mut ctx = Context::new("Tree.idl");
    let mut forward = StructDecl::new("Node", vec![]);
    forward.forward = true;
    let node = StructDecl::new(
        "Node",
        vec![Member::new(
            "children",
            TypeSpec::Sequence {
                element: Box::new(TypeSpec::named("Node")),
                bound: None,
            },
        )],
    );

    register_all(
        &mut ctx,
        vec![Definition::Struct(forward), Definition::Struct(node)],
    );

    assert_eq!(ctx.structs().count(), 1);
    assert_eq!(ctx.topic().map(|t| t.name()), Some("Node"));
}

#[test]
fn Context___unknown_name___is_unresolved() {
    let mut ctx = Context::new("Shapes.idl");
    let bad = StructDecl::new("Bad", vec![Member::new("m", TypeSpec::named("Missing"))]);
    let spec = Specification {
        definitions: vec![module("geo", vec![Definition::Struct(bad)])],
        dependencies: Default::default(),
    };

    let err = ctx.register_specification(&spec).unwrap_err();

    assert!(matches!(
        err,
        IdlError::UnresolvedType { ref name, ref scope } if name == "Missing" && scope == "geo"
    ));
    assert!(ctx.scope().is_empty());
}

#[test]
fn Context___redeclared_struct___is_duplicate() {
    let mut ctx = Context::new("Shapes.idl");
    let spec = Specification {
        definitions: vec![plain_struct("Shape"), plain_struct("Shape")],
        dependencies: Default::default(),
    };

    let err = ctx.register_specification(&spec).unwrap_err();

    assert!(matches!(err, IdlError::DuplicateDeclaration(ref n) if n == "Shape"));
}

#[test]
fn Context___typedef_and_enum___are_registered() {
    let mut ctx = Context::new("Shapes.idl");
    let color = Definition::Enum(EnumDecl {
        name: "Color".into(),
        annotations: vec![],
        enumerators: vec!["RED".into(), "GREEN".into()],
        origin: Origin::Unit,
    });
    let alias = Definition::Typedef(TypedefDecl {
        name: "Palette".into(),
        ty: TypeSpec::Sequence {
            element: Box::new(TypeSpec::named("Color")),
            bound: Some(8),
        },
        origin: Origin::Unit,
    });

    register_all(&mut ctx, vec![color, alias]);

    assert_eq!(ctx.types().len(), 2);
    assert!(ctx.lookup("::Palette").is_some());
    assert!(!ctx.has_topic());
}

#[test]
fn Context___specification_dependencies___are_adopted() {
    let mut ctx = Context::new("Shapes.idl");
    let spec = Specification {
        definitions: vec![],
        dependencies: ["Common.idl".into()].into_iter().collect(),
    };

    ctx.register_specification(&spec).unwrap();

    assert!(ctx.dependencies().contains(&PathBuf::from("Common.idl")));
}

// ============================================================================
// Naming and allocators
// ============================================================================

#[test]
fn Context___new___derives_filename_from_stem() {
    let ctx = Context::new("idl/Shapes.idl");

    assert_eq!(ctx.filename(), "Shapes");
    assert_eq!(ctx.filename_upper(), "SHAPES");
}

#[test]
fn Context___set_filename___keeps_upper_case_in_sync() {
    let mut ctx = Context::new("Shapes.idl");

    ctx.set_filename("Geometry");

    assert_eq!(ctx.filename_upper(), "GEOMETRY");
}

#[test]
fn Context___loop_variables___yield_a_b_c_d() {
    let mut ctx = Context::new("Shapes.idl");

    let seq = [
        ctx.new_loop_variable(),
        ctx.next_loop_variable(),
        ctx.next_loop_variable(),
        ctx.next_loop_variable(),
    ];

    assert_eq!(seq, ["a", "b", "c", "d"]);
}

#[test]
fn Context___identifiers___are_stacked() {
    let mut ctx = Context::new("Shapes.idl");

    let outer = ctx.new_identifier();
    let inner = ctx.new_identifier();

    assert_eq!(ctx.release_last_identifier(), inner);
    assert_eq!(ctx.release_last_identifier(), outer);
}

#[test]
fn JavaPackage___dotted___derives_path_and_prefixes() {
    let pkg = JavaPackage::new("com.example.shapes");

    assert_eq!(pkg.path(), PathBuf::from("com/example/shapes"));
    assert_eq!(pkg.prefix(), "com.example.shapes.");
    assert_eq!(pkg.symbol_prefix(), "com_example_shapes_");
}

#[test]
fn JavaPackage___default___is_empty() {
    let pkg = JavaPackage::default();

    assert!(pkg.is_empty());
    assert_eq!(pkg.prefix(), "");
    assert_eq!(pkg.path(), PathBuf::new());
}

#[test]
fn Language___parse___accepts_cli_spellings() {
    assert_eq!(Language::parse("C++"), Some(Language::Cpp));
    assert_eq!(Language::parse("java"), Some(Language::Java));
    assert_eq!(Language::parse("rust"), None);
}
