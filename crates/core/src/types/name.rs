//! Display-name normalization for matching.

/// Normalize a display name for comparison.
///
/// Lowercases, trims, and collapses internal whitespace runs to single
/// spaces. Empty or whitespace-only input yields the empty string.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
