//! Client-side annotation filtering.
//!
//! Given annotations and a structured query (field name to terms plus an
//! operator), [`filter_annotations`] returns the ids of the annotations that
//! satisfy the query, in input order.
//!
//! ```
//! use annotation_filter::{Annotation, Facet, StructuredQuery, filter_annotations};
//!
//! let annotations = vec![Annotation {
//!     id: Some("a1".into()),
//!     text: "Résumé notes".into(),
//!     ..Annotation::default()
//! }];
//! let query = StructuredQuery::new().with_facet("any", Facet::all(["resume"]));
//! assert_eq!(filter_annotations(&annotations, &query), vec!["a1"]);
//! ```

pub mod config;
pub mod model;
pub mod search;

pub use config::{ConfigError, FilterConfig, UnknownFieldPolicy};
pub use model::types::{Annotation, Selector, Target, Timestamp, UserInfo};
pub use search::annotation_filter::{
    AnnotationFilter, FilterOptions, filter_annotations, filter_annotations_with,
};
pub use search::query::{Facet, FilterError, Operator, StructuredQuery, Term};
