//! Search layer facade.
//!
//! - **[`canonicalize`]**: Case/diacritic folding applied to terms and field values.
//! - **[`query`]**: Structured query types (facets, terms, operators).
//! - **[`matchers`]**: Field matcher registry (extract / normalize / compare per field).
//! - **[`filter`]**: Term and boolean filter nodes.
//! - **[`annotation_filter`]**: Builds the filter tree for a query and evaluates it.

pub mod annotation_filter;
pub mod canonicalize;
pub mod filter;
pub mod matchers;
pub mod query;
