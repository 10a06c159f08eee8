//! Text folding for case- and diacritic-insensitive matching.
//!
//! Every term and every extracted field value passes through
//! [`fold_for_match`] before comparison, so "Café", "CAFE" and "cafe\u{0301}"
//! all compare equal.
//!
//! The pipeline is:
//!
//! 1. NFKD decomposition (splits precomposed letters and compatibility forms)
//! 2. Removal of combining marks
//! 3. Unicode lower-casing
//!
//! # Example
//!
//! ```
//! use annotation_filter::search::canonicalize::fold_for_match;
//!
//! assert_eq!(fold_for_match("Crème Brûlée"), "creme brulee");
//! ```

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fold text into its comparison form.
///
/// Pure and deterministic. Folding is idempotent:
/// `fold_for_match(&fold_for_match(s)) == fold_for_match(s)`.
pub fn fold_for_match(text: &str) -> String {
    if text.is_ascii() {
        return text.to_ascii_lowercase();
    }
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
