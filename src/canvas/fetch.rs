// src/canvas/fetch.rs
// =============================================================================
// A small client for the parts of the Canvas REST API we read.
//
// Every call returns Result<T, SourceError> so the collector can decide, call
// by call, whether a failure ends the run or just skips one section.
//
// Listings are fetched with per_page=100 in a single request; following
// Canvas' Link-header pagination is out of scope.
// =============================================================================

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::checker::Credential;

const PER_PAGE: &str = "100";

/// Errors from the Canvas API
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("cannot build an API URL from {0}")]
    InvalidUrl(String),
    #[error("not a course id or course URL: {0:?}")]
    InvalidCourse(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub syllabus_body: Option<String>,
}

/// Entry of the page listing; the listing leaves out the body
#[derive(Debug, Clone, Deserialize)]
pub struct PageSummary {
    pub url: String,
    pub title: String,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Assignment {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
}

/// A discussion or an announcement
#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionTopic {
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Module {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleItem {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub external_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CanvasClient {
    client: Client,
    base: Url,
    credential: Credential,
}

impl CanvasClient {
    pub fn new(base: Url, credential: Credential, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| SourceError::Http {
                url: base.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base,
            credential,
        })
    }

    /// Scheme, host and port of the Canvas instance, e.g.
    /// "https://school.instructure.com"
    pub fn origin(&self) -> String {
        self.base.origin().ascii_serialization()
    }

    /// The course, including its syllabus body
    pub async fn course(&self, course_id: &str) -> Result<Course, SourceError> {
        self.get(&["courses", course_id], &[("include[]", "syllabus_body")])
            .await
    }

    pub async fn pages(&self, course_id: &str) -> Result<Vec<PageSummary>, SourceError> {
        self.get(&["courses", course_id, "pages"], &[("per_page", PER_PAGE)])
            .await
    }

    pub async fn page(&self, course_id: &str, page_url: &str) -> Result<Page, SourceError> {
        self.get(&["courses", course_id, "pages", page_url], &[]).await
    }

    pub async fn assignments(&self, course_id: &str) -> Result<Vec<Assignment>, SourceError> {
        self.get(&["courses", course_id, "assignments"], &[("per_page", PER_PAGE)])
            .await
    }

    /// Discussions, or announcements when `only_announcements` is set
    pub async fn discussion_topics(
        &self,
        course_id: &str,
        only_announcements: bool,
    ) -> Result<Vec<DiscussionTopic>, SourceError> {
        let mut query = vec![("per_page", PER_PAGE)];
        if only_announcements {
            query.push(("only_announcements", "true"));
        }
        self.get(&["courses", course_id, "discussion_topics"], &query)
            .await
    }

    pub async fn modules(&self, course_id: &str) -> Result<Vec<Module>, SourceError> {
        self.get(&["courses", course_id, "modules"], &[("per_page", PER_PAGE)])
            .await
    }

    pub async fn module_items(
        &self,
        course_id: &str,
        module_id: u64,
    ) -> Result<Vec<ModuleItem>, SourceError> {
        let module_id = module_id.to_string();
        self.get(
            &["courses", course_id, "modules", &module_id, "items"],
            &[("per_page", PER_PAGE)],
        )
        .await
    }

    // Builds <origin>/api/v1/<segments...>?<query>, encoding each segment
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, SourceError> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidUrl(self.base.to_string()))?
            .clear()
            .extend(["api", "v1"])
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let url = self.endpoint(segments, query)?;
        tracing::debug!(url = %url, "canvas request");

        let http_error = |source: reqwest::Error| SourceError::Http {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, self.credential.bearer())
            .send()
            .await
            .map_err(http_error)?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        response.json().await.map_err(http_error)
    }
}

/// Extracts the course id from a bare id or a course URL.
///
/// "12345", "https://school.instructure.com/courses/12345/pages/x" and
/// "courses/12345?module_item_id=9" all give "12345".
pub fn parse_course_id(input: &str) -> Result<String, SourceError> {
    let input = input.trim();

    let id = match input.rsplit_once("courses/") {
        Some((_, rest)) => rest
            .split(|c| c == '/' || c == '?' || c == '#')
            .next()
            .unwrap_or_default(),
        None => input,
    };

    if id.is_empty() || id.contains('/') || id.contains(char::is_whitespace) {
        return Err(SourceError::InvalidCourse(input.to_string()));
    }
    Ok(id.to_string())
}
