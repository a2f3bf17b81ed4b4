#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

// Key resolution

#[test_case("Key" ; "exact case")]
#[test_case("key" ; "lower case")]
#[test_case("KEY" ; "upper case")]
fn Annotation___key_without_value___resolves_to_true_key(name: &str) {
    let annotation = Annotation::resolve(RawAnnotation::new(name));

    assert_eq!(annotation, Annotation::Key { value: true });
    assert!(annotation.is_true_key());
}

#[test_case("true", true)]
#[test_case(" true ", true)]
#[test_case("TRUE", false)]
#[test_case("True", false)]
#[test_case("\"true\"", false)]
#[test_case("false", false)]
#[test_case("1", false)]
#[test_case("yes", false)]
fn Annotation___key_with_value___only_literal_true_counts(value: &str, expected: bool) {
    let raw = RawAnnotation::new("Key").with_param("value", value);

    let annotation = Annotation::resolve(raw);

    assert_eq!(annotation.is_true_key(), expected);
}

#[test]
fn Annotation___key_positional_value___is_used() {
    let raw = RawAnnotation::new("key").with_value("false");

    assert_eq!(Annotation::resolve(raw), Annotation::Key { value: false });
}

// Topic resolution

#[test_case("false", false)]
#[test_case("FALSE", false)]
#[test_case("False", false)]
#[test_case("true", true)]
#[test_case("maybe", true)]
fn Annotation___topic_value___only_literal_false_suppresses(value: &str, expected: bool) {
    let raw = RawAnnotation::new("Topic").with_param("value", value);

    let annotation = Annotation::resolve(raw);

    assert_eq!(annotation, Annotation::Topic { value: expected });
    assert_eq!(annotation.is_topic_suppression(), !expected);
}

#[test]
fn Annotation___topic_without_value___is_eligible() {
    let annotation = Annotation::resolve(RawAnnotation::new("Topic"));

    assert_eq!(annotation, Annotation::Topic { value: true });
}

// Other annotations

#[test]
fn Annotation___unknown_name___kept_verbatim() {
    let raw = RawAnnotation::new("default").with_value("5");

    let annotation = Annotation::resolve(raw.clone());

    assert_eq!(annotation, Annotation::Other(raw));
    assert_eq!(annotation.name(), "default");
}

#[test]
fn RawAnnotation___value___prefers_named_value_param() {
    let raw = RawAnnotation::new("Key")
        .with_value("false")
        .with_param("value", "true");

    assert_eq!(raw.value(), Some("true"));
}

#[test]
fn RawAnnotation___value___ignores_other_named_params() {
    let raw = RawAnnotation::new("range").with_param("min", "0");

    assert_eq!(raw.value(), None);
}

#[test]
fn Annotation___resolve_all___keeps_order() {
    let raw = vec![RawAnnotation::new("Topic"), RawAnnotation::new("key")];

    let resolved = Annotation::resolve_all(&raw);

    assert_eq!(resolved[0].name(), "Topic");
    assert_eq!(resolved[1].name(), "Key");
}
