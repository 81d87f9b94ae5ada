// src/canvas/mod.rs
// =============================================================================
// This module reads course content from a Canvas LMS instance.
//
// Submodules:
// - fetch: a thin REST client (course, pages, assignments, discussions,
//   announcements, modules) plus course id parsing
// - collect: walks a course and turns its content into DiscoveredLinks
// =============================================================================

mod collect;
mod fetch;

pub use collect::{collect_course_links, CourseLinks};
pub use fetch::{parse_course_id, CanvasClient, SourceError};
