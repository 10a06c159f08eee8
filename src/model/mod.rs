//! Data model consumed by the filter engine.

pub mod types;
