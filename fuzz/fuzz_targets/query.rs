//! Fuzz target for query and annotation JSON through the filter engine.
//!
//! Arbitrary JSON for both sides must either fail to deserialize or filter
//! without panicking, under both unknown-field policies.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use annotation_filter::{
    Annotation, FilterOptions, StructuredQuery, UnknownFieldPolicy, filter_annotations_with,
};

#[derive(Arbitrary, Debug)]
struct FilterInput {
    /// Raw query JSON
    query_json: String,
    /// Raw annotations JSON (array)
    annotations_json: String,
    reject_unknown: bool,
}

fuzz_target!(|input: FilterInput| {
    let Ok(query) = serde_json::from_str::<StructuredQuery>(&input.query_json) else {
        return;
    };
    let Ok(annotations) = serde_json::from_str::<Vec<Annotation>>(&input.annotations_json) else {
        return;
    };

    let policy = if input.reject_unknown {
        UnknownFieldPolicy::Reject
    } else {
        UnknownFieldPolicy::Ignore
    };
    let options = FilterOptions::default().with_unknown_fields(policy);

    if let Ok(ids) = filter_annotations_with(&annotations, &query, &options) {
        assert!(ids.len() <= annotations.len());
        assert!(ids.iter().all(|id| !id.is_empty()));
    }
});
