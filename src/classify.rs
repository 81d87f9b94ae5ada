// src/classify.rs
// =============================================================================
// Turns (link, check result) pairs into report rows.
//
// Most links are fine and produce nothing. The rest are sorted into issue
// types an instructor can act on: fix a typo (4xx), update a moved link
// (redirect), unlock content (401/403 on Canvas) or ask another instructor
// for access (401/403 pointing into a different course).
// =============================================================================

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::checker::{CheckResult, DiscoveredLink};

/// Canvas puts the course id right after `/courses/` in every course URL
pub const DEFAULT_CONTAINER_PATTERN: &str = r"/courses/(\d+)";

/// What is wrong with a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueType {
    #[serde(rename = "Server Error (5xx)")]
    ServerError,
    #[serde(rename = "Inaccessible Content (Other Container)")]
    OtherContainer,
    #[serde(rename = "Access Denied (Locked Content)")]
    AccessDenied,
    #[serde(rename = "Broken Link (4xx)")]
    ClientError,
    #[serde(rename = "Connection Failed")]
    ConnectionFailed,
    #[serde(rename = "Redirect")]
    Redirect,
    /// Catch-all used by the two-category policy
    #[serde(rename = "Broken Link")]
    Broken,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::ServerError => "Server Error (5xx)",
            IssueType::OtherContainer => "Inaccessible Content (Other Container)",
            IssueType::AccessDenied => "Access Denied (Locked Content)",
            IssueType::ClientError => "Broken Link (4xx)",
            IssueType::ConnectionFailed => "Connection Failed",
            IssueType::Redirect => "Redirect",
            IssueType::Broken => "Broken Link",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the report. Field names are the report's column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    #[serde(rename = "Issue Type")]
    pub issue_type: IssueType,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Status Code")]
    pub status_code: u16,
    #[serde(rename = "Status Msg")]
    pub status_text: String,
    #[serde(rename = "Link Text")]
    pub link_text: String,
    #[serde(rename = "Original URL")]
    pub original_url: String,
    /// Only filled in for redirects
    #[serde(rename = "Final URL")]
    pub final_url: String,
    #[serde(rename = "Edit Link")]
    pub edit_link: String,
}

/// The course being audited and how to spot other courses in a URL
#[derive(Debug, Clone)]
pub struct CourseContext {
    course_id: String,
    container_pattern: Regex,
}

impl CourseContext {
    /// Uses the default `/courses/<id>` pattern
    #[cfg(test)]
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            container_pattern: default_pattern(),
        }
    }

    /// Uses `pattern` to find container ids in URLs. The first capture
    /// group is the id; without groups the whole match is used.
    pub fn with_pattern(course_id: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            course_id: course_id.into(),
            container_pattern: Regex::new(pattern)?,
        })
    }

    /// Same pattern, different course
    pub fn with_course_id(self, course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            ..self
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    /// The container id embedded in `url`, if any
    pub fn container_id<'a>(&self, url: &'a str) -> Option<&'a str> {
        let captures = self.container_pattern.captures(url)?;
        captures.get(1).or_else(|| captures.get(0)).map(|m| m.as_str())
    }

    /// True if `url` names a container other than the current course
    pub fn is_foreign(&self, url: &str) -> bool {
        matches!(self.container_id(url), Some(id) if id != self.course_id)
    }
}

#[cfg(test)]
fn default_pattern() -> Regex {
    Regex::new(DEFAULT_CONTAINER_PATTERN)
        .unwrap_or_else(|e| panic!("invalid default container pattern: {e}"))
}

/// Which set of issue types to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Server error, other container, access denied, 4xx, connection, redirect
    #[default]
    Detailed,
    /// Just "Broken Link" and "Redirect"
    Simple,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    policy: Policy,
}

impl Classifier {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    /// Classifies one occurrence of a link. Returns `None` for healthy links.
    pub fn classify(
        &self,
        link: &DiscoveredLink,
        result: &CheckResult,
        ctx: &CourseContext,
    ) -> Option<IssueRecord> {
        let issue_type = match self.policy {
            Policy::Detailed => detailed(link, result, ctx),
            Policy::Simple => simple(result),
        }?;

        Some(IssueRecord {
            issue_type,
            location: link.location_name.clone(),
            status_code: result.status_code,
            status_text: result.status_text.clone(),
            link_text: link.text.clone(),
            original_url: link.url.clone(),
            final_url: if issue_type == IssueType::Redirect {
                result.final_url.clone()
            } else {
                String::new()
            },
            edit_link: link.source_location.clone(),
        })
    }
}

// First matching rule wins
fn detailed(link: &DiscoveredLink, result: &CheckResult, ctx: &CourseContext) -> Option<IssueType> {
    let status = result.status_code;

    if status >= 500 {
        Some(IssueType::ServerError)
    } else if result.is_internal && matches!(status, 401 | 403) {
        if ctx.is_foreign(&link.url) {
            Some(IssueType::OtherContainer)
        } else {
            Some(IssueType::AccessDenied)
        }
    } else if status >= 400 {
        Some(IssueType::ClientError)
    } else if status == 0 {
        Some(IssueType::ConnectionFailed)
    } else if result.is_redirect {
        Some(IssueType::Redirect)
    } else {
        None
    }
}

fn simple(result: &CheckResult) -> Option<IssueType> {
    if result.status_code >= 400 || result.status_code == 0 {
        Some(IssueType::Broken)
    } else if result.is_redirect {
        Some(IssueType::Redirect)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::LinkKind;

    fn link(url: &str) -> DiscoveredLink {
        DiscoveredLink {
            url: url.to_string(),
            text: "Syllabus PDF".to_string(),
            source_location: "https://lms.example/courses/42/pages/intro".to_string(),
            location_name: "Page: Intro".to_string(),
            kind: LinkKind::Link,
        }
    }

    fn result(url: &str, status_code: u16, is_redirect: bool, is_internal: bool) -> CheckResult {
        CheckResult {
            url: url.to_string(),
            status_code,
            status_text: "status".to_string(),
            is_redirect,
            final_url: if is_redirect { "https://lms.example/final".to_string() } else { String::new() },
            is_internal,
        }
    }

    fn detailed_type(url: &str, status: u16, redirect: bool, internal: bool) -> Option<IssueType> {
        Classifier::default()
            .classify(&link(url), &result(url, status, redirect, internal), &CourseContext::new("42"))
            .map(|r| r.issue_type)
    }

    #[test]
    fn test_healthy_link_has_no_issue() {
        assert_eq!(detailed_type("https://ok.example", 200, false, false), None);
        assert_eq!(detailed_type("https://ok.example", 204, false, true), None);
    }

    #[test]
    fn test_server_error_outranks_redirect() {
        assert_eq!(detailed_type("https://x.example", 503, true, false), Some(IssueType::ServerError));
        assert_eq!(detailed_type("https://lms.example/courses/7", 500, false, true), Some(IssueType::ServerError));
    }

    #[test]
    fn test_internal_access_denied_same_course() {
        let url = "https://lms.example/courses/42/files/3";
        assert_eq!(detailed_type(url, 401, false, true), Some(IssueType::AccessDenied));
        assert_eq!(detailed_type(url, 403, false, true), Some(IssueType::AccessDenied));
        // No course id in the URL at all
        assert_eq!(detailed_type("https://lms.example/files/3", 403, false, true), Some(IssueType::AccessDenied));
    }

    #[test]
    fn test_internal_access_denied_other_course() {
        let url = "https://lms.example/courses/999/files/3";
        assert_eq!(detailed_type(url, 401, false, true), Some(IssueType::OtherContainer));
        assert_eq!(detailed_type(url, 403, true, true), Some(IssueType::OtherContainer));
    }

    #[test]
    fn test_external_auth_errors_are_broken_links() {
        let url = "https://publisher.example/courses/999";
        assert_eq!(detailed_type(url, 403, false, false), Some(IssueType::ClientError));
        assert_eq!(detailed_type(url, 404, false, true), Some(IssueType::ClientError));
    }

    #[test]
    fn test_connection_failure_and_redirect() {
        assert_eq!(detailed_type("http://dead.example", 0, false, false), Some(IssueType::ConnectionFailed));
        assert_eq!(detailed_type("http://moved.example", 301, true, false), Some(IssueType::Redirect));
        assert_eq!(detailed_type("http://moved.example", 200, true, false), Some(IssueType::Redirect));
    }

    #[test]
    fn test_final_url_only_for_redirects() {
        let classifier = Classifier::default();
        let ctx = CourseContext::new("42");

        let redirect = classifier
            .classify(&link("https://a.example"), &result("https://a.example", 200, true, false), &ctx)
            .unwrap();
        assert_eq!(redirect.final_url, "https://lms.example/final");

        let server = classifier
            .classify(&link("https://a.example"), &result("https://a.example", 502, true, false), &ctx)
            .unwrap();
        assert!(server.final_url.is_empty());
        assert_eq!(server.edit_link, "https://lms.example/courses/42/pages/intro");
        assert_eq!(server.location, "Page: Intro");
        assert_eq!(server.link_text, "Syllabus PDF");
        assert_eq!(server.original_url, "https://a.example");
    }

    #[test]
    fn test_simple_policy() {
        let classifier = Classifier::new(Policy::Simple);
        let ctx = CourseContext::new("42");
        let kind = |status, redirect| {
            classifier
                .classify(&link("https://a.example"), &result("https://a.example", status, redirect, true), &ctx)
                .map(|r| r.issue_type)
        };

        assert_eq!(kind(404, true), Some(IssueType::Broken));
        assert_eq!(kind(0, false), Some(IssueType::Broken));
        assert_eq!(kind(503, false), Some(IssueType::Broken));
        assert_eq!(kind(200, true), Some(IssueType::Redirect));
        assert_eq!(kind(200, false), None);
    }

    #[test]
    fn test_custom_container_pattern() {
        let ctx = CourseContext::with_pattern("abc", r"/sections/([a-z]+)").unwrap();
        assert_eq!(ctx.container_id("https://lms.example/sections/xyz/files"), Some("xyz"));
        assert!(ctx.is_foreign("https://lms.example/sections/xyz"));
        assert!(!ctx.is_foreign("https://lms.example/sections/abc"));
        assert!(!ctx.is_foreign("https://lms.example/courses/1"));

        assert!(CourseContext::with_pattern("1", "(unclosed").is_err());

        let moved = ctx.with_course_id("xyz");
        assert_eq!(moved.course_id(), "xyz");
        assert!(!moved.is_foreign("https://lms.example/sections/xyz"));
    }

    #[test]
    fn test_issue_type_serializes_as_label() {
        assert_eq!(serde_json::to_string(&IssueType::OtherContainer).unwrap(), "\"Inaccessible Content (Other Container)\"");
        assert_eq!(IssueType::ClientError.to_string(), "Broken Link (4xx)");
    }
}
