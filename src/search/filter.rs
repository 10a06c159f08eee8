//! Composable filter nodes.
//!
//! A query compiles into a small tree of [`Filter`]s: [`TermFilter`] leaves
//! test one pre-normalized term against one field, [`BooleanFilter`] nodes
//! combine children with AND / OR. Trees are built per query, never mutated,
//! and dropped after evaluation.

use super::matchers::{FieldMatcher, MatchContext, Value};
use super::query::{Operator, Term};
use crate::model::types::Annotation;

/// Leaf: one term against one field.
#[derive(Debug, Clone)]
pub struct TermFilter {
    term: Value<'static>,
    matcher: &'static FieldMatcher,
}

impl TermFilter {
    /// Normalizes `term` once with the matcher's normalizer. Touches no annotation.
    pub fn new(term: &Term, matcher: &'static FieldMatcher) -> Self {
        Self {
            term: (matcher.normalize)(Value::from(term)),
            matcher,
        }
    }

    pub fn field(&self) -> &'static str {
        self.matcher.field
    }

    /// The stored, already-normalized term.
    pub fn term(&self) -> &Value<'static> {
        &self.term
    }

    pub fn matches(&self, annotation: &Annotation, ctx: &MatchContext) -> bool {
        self.matcher.matches(annotation, &self.term, ctx)
    }
}

/// Internal node combining children with one operator.
#[derive(Debug, Clone)]
pub struct BooleanFilter {
    operator: Operator,
    children: Vec<Filter>,
}

impl BooleanFilter {
    pub fn new(operator: Operator, children: Vec<Filter>) -> Self {
        Self { operator, children }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn children(&self) -> &[Filter] {
        &self.children
    }

    /// AND with no children is true, OR with no children is false.
    pub fn matches(&self, annotation: &Annotation, ctx: &MatchContext) -> bool {
        match self.operator {
            Operator::And => self.children.iter().all(|c| c.matches(annotation, ctx)),
            Operator::Or => self.children.iter().any(|c| c.matches(annotation, ctx)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Filter {
    Term(TermFilter),
    Boolean(BooleanFilter),
}

impl Filter {
    pub fn term(term: &Term, matcher: &'static FieldMatcher) -> Self {
        Filter::Term(TermFilter::new(term, matcher))
    }

    pub fn and(children: Vec<Filter>) -> Self {
        Filter::Boolean(BooleanFilter::new(Operator::And, children))
    }

    pub fn or(children: Vec<Filter>) -> Self {
        Filter::Boolean(BooleanFilter::new(Operator::Or, children))
    }

    pub fn combine(operator: Operator, children: Vec<Filter>) -> Self {
        Filter::Boolean(BooleanFilter::new(operator, children))
    }

    pub fn matches(&self, annotation: &Annotation, ctx: &MatchContext) -> bool {
        match self {
            Filter::Term(t) => t.matches(annotation, ctx),
            Filter::Boolean(b) => b.matches(annotation, ctx),
        }
    }

    /// Number of term leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Filter::Term(_) => 1,
            Filter::Boolean(b) => b.children.iter().map(Filter::leaf_count).sum(),
        }
    }
}
