// src/checker/link.rs
// =============================================================================
// The record describing one reference found somewhere in a course.
//
// The same URL can show up on many pages. We check every URL once, but we
// keep one DiscoveredLink per occurrence so the report can point at each
// place that needs fixing.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Where in the markup a reference came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkKind {
    /// `<a href>`
    Link,
    /// `<img src>`
    Image,
    /// `<iframe src>`
    Iframe,
    /// External URL item in a course module
    ModuleItem,
}

/// One reference found in course content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredLink {
    /// Absolute URL to check
    pub url: String,
    /// Display text, alt text or a placeholder
    pub text: String,
    /// URL of the content item the link lives in
    pub source_location: String,
    /// Human readable label such as "Page: Syllabus"
    pub location_name: String,
    pub kind: LinkKind,
}
