//! Field matcher registry.
//!
//! Each queryable field is described by a [`FieldMatcher`]: how to pull raw
//! values out of an annotation, how to normalize a value (applied to terms at
//! build time and to field values at match time), and how to compare the two.
//! Text fields share one normalize/compare pair and only differ in
//! extraction; `since` plugs numeric semantics into the same slots.
//!
//! Adding a field means adding one entry to [`MATCHERS`].

use std::borrow::Cow;

use smallvec::SmallVec;

use super::canonicalize::fold_for_match;
use super::query::{ANY_FIELD, Term};
use crate::model::types::Annotation;

/// Real fields searched by the [`ANY_FIELD`] pseudo-field.
///
/// `uri` and `since` are deliberately absent.
pub const ANY_FIELD_TARGETS: &[&str] = &["quote", "text", "tag", "user"];

/// A normalized (or about to be normalized) value on either side of a comparison.
///
/// Extracted text borrows from the annotation until normalization replaces it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Text(Cow<'a, str>),
    Number(f64),
}

impl From<&Term> for Value<'static> {
    fn from(term: &Term) -> Self {
        match term {
            Term::Text(s) => Value::Text(Cow::Owned(s.clone())),
            Term::Number(n) => Value::Number(*n),
        }
    }
}

/// Values extracted from one annotation for one field. Most fields yield one
/// value, `user` yields two; `tag` spills to the heap for long tag lists.
pub type FieldValues<'a> = SmallVec<[Value<'a>; 2]>;

/// Per-evaluation inputs shared by every comparison in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchContext {
    /// Reference instant for recency comparisons, in epoch milliseconds.
    pub now_ms: i64,
}

impl MatchContext {
    pub fn at(now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            now_ms: now.timestamp_millis(),
        }
    }
}

/// Extraction, normalization and comparison for one field.
pub struct FieldMatcher {
    pub field: &'static str,
    pub extract: fn(&Annotation) -> FieldValues<'_>,
    pub normalize: fn(Value<'_>) -> Value<'_>,
    /// `compare(field_value, term, ctx)`, both sides already normalized.
    pub compare: fn(&Value<'_>, &Value<'_>, &MatchContext) -> bool,
}

impl std::fmt::Debug for FieldMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMatcher")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

impl FieldMatcher {
    /// True if any extracted value satisfies the comparison against `term`.
    pub fn matches(&self, annotation: &Annotation, term: &Value<'_>, ctx: &MatchContext) -> bool {
        (self.extract)(annotation)
            .into_iter()
            .map(self.normalize)
            .any(|value| (self.compare)(&value, term, ctx))
    }
}

/// The registry. Field names are unique.
pub static MATCHERS: &[FieldMatcher] = &[
    FieldMatcher {
        field: "quote",
        extract: extract_quote,
        normalize: normalize_text,
        compare: contains_term,
    },
    FieldMatcher {
        field: "since",
        extract: extract_updated_ms,
        normalize: normalize_seconds,
        compare: updated_within,
    },
    FieldMatcher {
        field: "tag",
        extract: extract_tags,
        normalize: normalize_text,
        compare: contains_term,
    },
    FieldMatcher {
        field: "text",
        extract: extract_text,
        normalize: normalize_text,
        compare: contains_term,
    },
    FieldMatcher {
        field: "uri",
        extract: extract_uri,
        normalize: normalize_text,
        compare: contains_term,
    },
    FieldMatcher {
        field: "user",
        extract: extract_user,
        normalize: normalize_text,
        compare: contains_term,
    },
];

/// Look up the matcher for a real field. [`ANY_FIELD`] is not a real field.
pub fn matcher_for(field: &str) -> Option<&'static FieldMatcher> {
    if field == ANY_FIELD {
        return None;
    }
    MATCHERS.iter().find(|m| m.field == field)
}

/// Names of every registered field, in registry order.
pub fn known_fields() -> impl Iterator<Item = &'static str> {
    MATCHERS.iter().map(|m| m.field)
}

fn single(value: Value<'_>) -> FieldValues<'_> {
    let mut values = FieldValues::new();
    values.push(value);
    values
}

fn borrowed(text: &str) -> Value<'_> {
    Value::Text(Cow::Borrowed(text))
}

fn extract_quote(ann: &Annotation) -> FieldValues<'_> {
    single(borrowed(ann.quote().unwrap_or_default()))
}

fn extract_text(ann: &Annotation) -> FieldValues<'_> {
    single(borrowed(&ann.text))
}

fn extract_tags(ann: &Annotation) -> FieldValues<'_> {
    ann.tags.iter().map(|tag| borrowed(tag)).collect()
}

fn extract_uri(ann: &Annotation) -> FieldValues<'_> {
    single(borrowed(&ann.uri))
}

fn extract_user(ann: &Annotation) -> FieldValues<'_> {
    let mut values = FieldValues::new();
    values.push(borrowed(&ann.user));
    values.push(borrowed(ann.display_name().unwrap_or_default()));
    values
}

fn extract_updated_ms(ann: &Annotation) -> FieldValues<'_> {
    let Some(updated) = ann.updated.as_ref() else {
        return FieldValues::new();
    };
    match updated.to_epoch_millis() {
        Some(ms) => single(Value::Number(ms as f64)),
        None => {
            tracing::trace!(id = ?ann.id, ?updated, "unusable updated timestamp");
            FieldValues::new()
        }
    }
}

fn normalize_text(value: Value<'_>) -> Value<'_> {
    match value {
        Value::Text(s) => Value::Text(Cow::Owned(fold_for_match(&s))),
        Value::Number(n) => {
            let rendered = Term::Number(n).to_string();
            Value::Text(Cow::Owned(fold_for_match(&rendered)))
        }
    }
}

/// Numbers pass through; numeric strings are accepted as seconds.
fn normalize_seconds(value: Value<'_>) -> Value<'_> {
    match value {
        Value::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(s),
        },
        number => number,
    }
}

fn contains_term(value: &Value<'_>, term: &Value<'_>, _ctx: &MatchContext) -> bool {
    match (value, term) {
        (Value::Text(value), Value::Text(term)) => value.contains(&**term),
        _ => false,
    }
}

/// Age of `value` (epoch ms) in seconds is at most `term`.
fn updated_within(value: &Value<'_>, term: &Value<'_>, ctx: &MatchContext) -> bool {
    match (value, term) {
        (Value::Number(updated_ms), Value::Number(max_age_secs)) => {
            (ctx.now_ms as f64 - updated_ms) / 1000.0 <= *max_age_secs
        }
        _ => false,
    }
}
