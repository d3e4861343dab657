//! Human-readable labels derived from schema names.
//!
//! Uses the `inflector` crate with a short list of irregular plurals that
//! show up in warehouse entity names.

use inflector::Inflector;

static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("analysis", "analyses"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("index", "indices"),
    ("matrix", "matrices"),
];

/// Title-case a snake_case name: `manufacturer_address` -> `Manufacturer Address`.
pub fn humanize(name: &str) -> String {
    name.to_title_case()
}

/// Pluralize the last word of a label, keeping its capitalization.
///
/// ```ignore
/// assert_eq!(pluralize_label("Product"), "Products");
/// assert_eq!(pluralize_label("Product Category"), "Product Categories");
/// ```
pub fn pluralize_label(label: &str) -> String {
    let (head, last) = match label.rfind(' ') {
        Some(idx) => (&label[..=idx], &label[idx + 1..]),
        None => ("", label),
    };
    if last.is_empty() {
        return label.to_string();
    }

    let lower = last.to_lowercase();
    let plural = IRREGULAR_PLURALS
        .iter()
        .find(|(singular, plural)| lower == *singular || lower == *plural)
        .map(|(_, plural)| plural.to_string())
        .unwrap_or_else(|| lower.to_plural());

    let capitalized = last.chars().next().is_some_and(char::is_uppercase);
    let plural = if capitalized {
        let mut chars = plural.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => plural,
        }
    } else {
        plural
    };

    format!("{}{}", head, plural)
}
