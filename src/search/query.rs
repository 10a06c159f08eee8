//! Structured query types.
//!
//! A [`StructuredQuery`] is what the search-bar parser hands to the filter
//! engine: one [`Facet`] per field name, each carrying raw terms and the
//! operator that combines them. Fields are always combined with AND.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Pseudo-field that fans a term out over several real fields.
pub const ANY_FIELD: &str = "any";

/// Errors raised while turning a query into a filter tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown filter field: {field}")]
    UnknownField { field: String },
}

/// How multiple terms (or child filters) combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    #[default]
    And,
    Or,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
        }
    }
}

/// A single user-supplied search value.
///
/// Query parsers emit strings for text fields and numbers for `since`
/// (age in seconds); both shapes are accepted for every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Term {
    Number(f64),
    Text(String),
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Text(s.to_string())
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::Text(s)
    }
}

impl From<f64> for Term {
    fn from(n: f64) -> Self {
        Term::Number(n)
    }
}

impl From<u64> for Term {
    fn from(n: u64) -> Self {
        Term::Number(n as f64)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Text(s) => write!(f, "{s}"),
            Term::Number(n) => write!(f, "{n}"),
        }
    }
}

/// One field's contribution to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Facet {
    #[serde(default)]
    pub terms: Vec<Term>,
    #[serde(default)]
    pub operator: Operator,
}

impl Facet {
    pub fn new<I, T>(operator: Operator, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            operator,
        }
    }

    /// Facet whose terms must all match.
    pub fn all<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        Self::new(Operator::And, terms)
    }

    /// Facet where any single term matching is enough.
    pub fn any<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        Self::new(Operator::Or, terms)
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Mapping from field name (including [`ANY_FIELD`]) to facet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct StructuredQuery {
    facets: BTreeMap<String, Facet>,
}

impl StructuredQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; a repeated field replaces the earlier facet.
    pub fn with_facet(mut self, field: impl Into<String>, facet: Facet) -> Self {
        self.insert(field, facet);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, facet: Facet) -> Option<Facet> {
        self.facets.insert(field.into(), facet)
    }

    pub fn get(&self, field: &str) -> Option<&Facet> {
        self.facets.get(field)
    }

    /// Facets in field-name order, including empty ones.
    pub fn facets(&self) -> impl Iterator<Item = (&str, &Facet)> {
        self.facets.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Facets that contribute at least one term.
    pub fn active_facets(&self) -> impl Iterator<Item = (&str, &Facet)> {
        self.facets().filter(|(_, facet)| !facet.is_empty())
    }

    /// True when no facet carries a term.
    pub fn is_empty(&self) -> bool {
        self.active_facets().next().is_none()
    }
}

impl<K: Into<String>> FromIterator<(K, Facet)> for StructuredQuery {
    fn from_iter<I: IntoIterator<Item = (K, Facet)>>(iter: I) -> Self {
        Self {
            facets: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
