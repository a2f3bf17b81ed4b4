//! Annotation model.
//!
//! The front-end hands over annotations exactly as written ([`RawAnnotation`]).
//! They are resolved once, while declarations are registered in the
//! [`Context`](crate::Context), into the closed set of [`Annotation`] variants
//! the generator actually understands. Everything downstream matches on the
//! typed variants instead of comparing names and string values.
//!
//! # Well-known annotations
//!
//! | Annotation | Applies to | Meaning |
//! |------------|------------|---------|
//! | `@Key` / `@key` | struct member | member is part of the instance identity key |
//! | `@Topic(false)` | struct | struct is never selected as the unit's topic |
//!
//! Both take a boolean `value` parameter that defaults to `true` when omitted,
//! matching the built-in declarations `@Key(value = true)` and
//! `@Topic(value = true)`.

use serde::{Deserialize, Serialize};

const KEY: &str = "key";
const TOPIC: &str = "topic";
const VALUE: &str = "value";

/// An annotation as it appears in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnnotation {
    /// Annotation name without the leading `@`.
    pub name: String,

    /// Parameters in declaration order.
    #[serde(default)]
    pub params: Vec<AnnotationParam>,
}

/// A single annotation parameter. Positional parameters have no name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationParam {
    pub name: Option<String>,
    pub value: String,
}

impl RawAnnotation {
    /// Create an annotation without parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Add a named parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(AnnotationParam {
            name: Some(name.into()),
            value: value.into(),
        });
        self
    }

    /// Add a positional parameter.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.params.push(AnnotationParam {
            name: None,
            value: value.into(),
        });
        self
    }

    /// The `value` member: the parameter named `value`, or else the single
    /// positional parameter.
    pub fn value(&self) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.as_deref() == Some(VALUE))
            .or_else(|| self.params.iter().find(|p| p.name.is_none()))
            .map(|p| p.value.as_str())
    }
}

/// A resolved annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// `@Key(value = ..)`
    Key { value: bool },

    /// `@Topic(value = ..)`
    Topic { value: bool },

    /// Anything else, kept verbatim for templates.
    Other(RawAnnotation),
}

impl Annotation {
    /// Resolve a raw annotation into its typed form.
    ///
    /// Names are matched case-insensitively, so `@Key`, `@key` and `@KEY` are
    /// the same annotation. A `Key` only counts when its value is exactly
    /// `true` (or omitted); a `Topic` is suppressed by `false` in any letter
    /// case.
    pub fn resolve(raw: RawAnnotation) -> Self {
        if raw.name.eq_ignore_ascii_case(KEY) {
            let value = match raw.value() {
                None => true,
                Some(v) => v.trim() == "true",
            };
            Annotation::Key { value }
        } else if raw.name.eq_ignore_ascii_case(TOPIC) {
            let value = !matches!(raw.value().map(parse_bool), Some(Some(false)));
            Annotation::Topic { value }
        } else {
            Annotation::Other(raw)
        }
    }

    /// Resolve every annotation in a list, keeping order.
    pub fn resolve_all(raw: &[RawAnnotation]) -> Vec<Annotation> {
        raw.iter().cloned().map(Annotation::resolve).collect()
    }

    /// Name as it should be printed back into generated code.
    pub fn name(&self) -> &str {
        match self {
            Annotation::Key { .. } => "Key",
            Annotation::Topic { .. } => "Topic",
            Annotation::Other(raw) => &raw.name,
        }
    }

    /// Whether this is a `Key` annotation with a true value.
    pub fn is_true_key(&self) -> bool {
        matches!(self, Annotation::Key { value: true })
    }

    /// Whether this is a `Topic` annotation with a false value.
    pub fn is_topic_suppression(&self) -> bool {
        matches!(self, Annotation::Topic { value: false })
    }
}

/// Parse an IDL boolean literal, tolerating quotes and any letter case.
fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim().trim_matches('"');
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "annotation/annotation_tests.rs"]
mod annotation_tests;
