// src/checker/filter.rs
// =============================================================================
// Decides whether a reference found in course content is worth checking.
//
// Course pages are full of things that look like links but are not
// reachable over HTTP: email addresses, phone numbers, in-page anchors and
// JavaScript handlers. Checking those would only produce false positives.
// =============================================================================

// Prefixes that never point at a network resource
const SKIPPED_PREFIXES: [&str; 4] = ["mailto:", "javascript:", "#", "tel:"];

/// Returns true if `reference` should be resolved and checked.
///
/// Rejects blank strings and anything starting with `mailto:`,
/// `javascript:`, `#` or `tel:`. Everything else is accepted; relative
/// references are resolved later by the extractor.
pub fn is_checkable(reference: &str) -> bool {
    if reference.trim().is_empty() {
        return false;
    }

    !SKIPPED_PREFIXES
        .iter()
        .any(|prefix| reference.starts_with(prefix))
}
