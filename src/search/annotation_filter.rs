//! Query-to-tree compilation and evaluation over an annotation collection.
//!
//! Tree shape for a query:
//!
//! ```text
//! AND                                  (one child per non-empty facet)
//! ├── <facet op>                       (one child per term)
//! │   ├── Term(field, t1)
//! │   └── Term(field, t2)
//! └── <facet op>                       ("any" facet)
//!     └── OR                           (one per term)
//!         ├── Term(quote, t)
//!         ├── Term(text, t)
//!         ├── Term(tag, t)
//!         └── Term(user, t)
//! ```

use chrono::{DateTime, Utc};
use tracing::debug;

use super::filter::Filter;
use super::matchers::{ANY_FIELD_TARGETS, MatchContext, matcher_for};
use super::query::{ANY_FIELD, Facet, FilterError, StructuredQuery, Term};
use crate::config::{FilterConfig, UnknownFieldPolicy};
use crate::model::types::Annotation;

/// Per-call knobs for building a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub unknown_fields: UnknownFieldPolicy,
    /// Reference instant for `since`. Defaults to the wall clock at build time.
    pub now: Option<DateTime<Utc>>,
}

impl FilterOptions {
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }
}

impl From<&FilterConfig> for FilterOptions {
    fn from(config: &FilterConfig) -> Self {
        Self {
            unknown_fields: config.unknown_fields,
            now: None,
        }
    }
}

/// A compiled query, ready to test annotations.
#[derive(Debug, Clone)]
pub struct AnnotationFilter {
    root: Filter,
    ctx: MatchContext,
}

impl AnnotationFilter {
    /// Compile `query` into a filter tree.
    ///
    /// Facets without terms are dropped. Unknown field names are skipped or
    /// rejected per `options.unknown_fields`.
    pub fn build(query: &StructuredQuery, options: &FilterOptions) -> Result<Self, FilterError> {
        let mut field_filters = Vec::new();
        for (field, facet) in query.active_facets() {
            match facet_filter(field, facet) {
                Some(filter) => field_filters.push(filter),
                None => match options.unknown_fields {
                    UnknownFieldPolicy::Ignore => {
                        debug!(field, "ignoring unknown filter field");
                    }
                    UnknownFieldPolicy::Reject => {
                        return Err(FilterError::UnknownField {
                            field: field.to_string(),
                        });
                    }
                },
            }
        }

        let facets = field_filters.len();
        let root = Filter::and(field_filters);
        let now = options.now.unwrap_or_else(Utc::now);
        debug!(
            facets,
            leaves = root.leaf_count(),
            now = %now,
            "built annotation filter"
        );
        Ok(Self {
            root,
            ctx: MatchContext::at(now),
        })
    }

    pub fn root(&self) -> &Filter {
        &self.root
    }

    pub fn matches(&self, annotation: &Annotation) -> bool {
        self.root.matches(annotation, &self.ctx)
    }

    /// Ids of matching annotations, in input order. Annotations without a
    /// non-empty id are never returned.
    pub fn apply<'a>(&self, annotations: &'a [Annotation]) -> Vec<&'a str> {
        let ids: Vec<&str> = annotations
            .iter()
            .filter_map(|ann| ann.usable_id().filter(|_| self.matches(ann)))
            .collect();
        debug!(
            total = annotations.len(),
            matched = ids.len(),
            "filtered annotations"
        );
        ids
    }
}

/// Per-field node for one facet, `None` if the field is unknown.
fn facet_filter(field: &str, facet: &Facet) -> Option<Filter> {
    let term_filters: Vec<Filter> = if field == ANY_FIELD {
        facet.terms.iter().map(any_field_filter).collect()
    } else {
        let matcher = matcher_for(field)?;
        facet
            .terms
            .iter()
            .map(|term| Filter::term(term, matcher))
            .collect()
    };
    Some(Filter::combine(facet.operator, term_filters))
}

/// OR over every "any" target field for one term.
fn any_field_filter(term: &Term) -> Filter {
    Filter::or(
        ANY_FIELD_TARGETS
            .iter()
            .filter_map(|field| matcher_for(field))
            .map(|matcher| Filter::term(term, matcher))
            .collect(),
    )
}

/// Ids of annotations matching `query`, in input order.
///
/// Unknown fields are ignored and `since` is measured against the current time.
pub fn filter_annotations(annotations: &[Annotation], query: &StructuredQuery) -> Vec<String> {
    // The default options never reject, so this cannot fail.
    filter_annotations_with(annotations, query, &FilterOptions::default()).unwrap_or_default()
}

/// [`filter_annotations`] with explicit options.
pub fn filter_annotations_with(
    annotations: &[Annotation],
    query: &StructuredQuery,
    options: &FilterOptions,
) -> Result<Vec<String>, FilterError> {
    let filter = AnnotationFilter::build(query, options)?;
    Ok(filter
        .apply(annotations)
        .into_iter()
        .map(str::to_string)
        .collect())
}
