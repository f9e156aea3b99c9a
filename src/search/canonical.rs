// src/search/canonical.rs
//! Deduplication keys for result URLs. Keys are never shown to users.

/// Lowercase, cut at the first `?` or `#`, drop one trailing slash.
pub fn canonical_key(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let end = lower.find(['?', '#']).unwrap_or(lower.len());
    let cut = &lower[..end];
    cut.strip_suffix('/').unwrap_or(cut).to_string()
}
