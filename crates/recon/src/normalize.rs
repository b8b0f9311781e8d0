//! Product-name join key.
//!
//! Names are trimmed and lower-cased before any grouping or lookup, so
//! `" Widget"`, `"widget"` and `"WIDGET "` all land on the same key. Distinct
//! products whose names differ only by case or surrounding whitespace are
//! merged as a result.

/// Canonical join key for a raw product label.
pub fn normalize(product_name: &str) -> String {
    product_name.trim().to_lowercase()
}
