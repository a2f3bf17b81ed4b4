//! Property-based tests for annotation semantics and topic selection
//!
//! Covers the rules that decide what gets generated for a unit: which structs
//! have an identity key, which may be topics, and which one is selected.

use ddsgen_core::{
    Annotation, Context, Definition, Member, MemberTypeCode, Origin, PrimitiveKind, RawAnnotation,
    Specification, StructDecl, StructTypeCode, TypeCode, TypeSpec,
};
use proptest::prelude::*;

// Strategy: the annotation name in any letter case
fn arb_case_of(name: &'static str) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), name.len()).prop_map(move |upper| {
        name.chars()
            .zip(upper)
            .map(|(c, u)| if u { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
            .collect()
    })
}

// Strategy: a value for a boolean annotation parameter, or none at all
fn arb_value() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        arb_case_of("true").prop_map(Some),
        arb_case_of("false").prop_map(Some),
        "[a-z0-9]{1,6}".prop_map(Some),
    ]
}

fn raw(name: String, value: &Option<String>) -> RawAnnotation {
    match value {
        Some(v) => RawAnnotation::new(name).with_param("value", v.clone()),
        None => RawAnnotation::new(name),
    }
}

fn member(name: String, annotations: Vec<Annotation>) -> MemberTypeCode {
    MemberTypeCode {
        name,
        ty: TypeSpec::Primitive(PrimitiveKind::Long),
        annotations,
    }
}

// One struct declaration: (eligible as topic, from the unit itself)
fn arb_struct_flags() -> impl Strategy<Value = (bool, bool)> {
    (any::<bool>(), any::<bool>())
}

proptest! {
    /// Property: a struct has an identity key iff some member has a Key whose
    /// value is omitted or exactly `true`, whatever the spelling of the
    /// annotation name
    #[test]
    fn proptest_identity_key_matches_true_key_members(
        keys in prop::collection::vec((arb_case_of("key"), arb_value()), 0..8),
    ) {
        let expected = keys.iter().any(|(_, value)| match value {
            None => true,
            Some(v) => v == "true",
        });
        let members = keys
            .iter()
            .enumerate()
            .map(|(i, (name, value))| {
                member(format!("m{i}"), vec![Annotation::resolve(raw(name.clone(), value))])
            })
            .collect();

        let ts = StructTypeCode::new(vec![], "S", members, vec![], Origin::Unit);

        prop_assert_eq!(ts.has_identity_key(), expected);
    }

    /// Property: a struct is a topic unless it carries Topic(false), any case
    #[test]
    fn proptest_is_topic_only_suppressed_by_false(
        topic in prop::option::of((arb_case_of("topic"), arb_value())),
    ) {
        let expected = !matches!(
            &topic,
            Some((_, Some(v))) if v.eq_ignore_ascii_case("false")
        );
        let annotations = topic
            .iter()
            .map(|(name, value)| Annotation::resolve(raw(name.clone(), value)))
            .collect();

        let ts = StructTypeCode::new(vec![], "S", vec![], annotations, Origin::Unit);

        prop_assert_eq!(ts.is_topic(), expected);
    }

    /// Property: after registering a sequence of structs, the selected topic is
    /// the last one that is eligible and declared in the unit itself
    #[test]
    fn proptest_last_eligible_struct_is_selected(
        flags in prop::collection::vec(arb_struct_flags(), 0..12),
    ) {
        let definitions = flags
            .iter()
            .enumerate()
            .map(|(i, &(eligible, in_unit))| {
                let mut decl = StructDecl::new(
                    format!("S{i}"),
                    vec![Member::new("v", TypeSpec::Primitive(PrimitiveKind::Long))],
                );
                if !eligible {
                    decl = decl.with_annotation(RawAnnotation::new("Topic").with_value("false"));
                }
                if !in_unit {
                    decl = decl.with_origin(Origin::Included("Other.idl".into()));
                }
                Definition::Struct(decl)
            })
            .collect();
        let expected = flags
            .iter()
            .rposition(|&(eligible, in_unit)| eligible && in_unit)
            .map(|i| format!("S{i}"));

        let mut ctx = Context::new("Unit.idl");
        ctx.register_specification(&Specification {
            definitions,
            dependencies: Default::default(),
        })
        .unwrap();

        prop_assert_eq!(ctx.topic().map(|t| t.name().to_string()), expected);
        prop_assert_eq!(ctx.types().iter().filter_map(TypeCode::as_struct).count(), flags.len());
    }
}
