// src/checker/http.rs
// =============================================================================
// This module checks if URLs are alive by making HTTP requests.
//
// Key functionality:
// - One GET per URL, redirects followed and counted, body never downloaded
// - Canvas links get the API token, everything else goes out anonymous
// - A browser User-Agent so strict servers don't answer 403 to bots
// - A small random pause before each request to stay under rate limits
// - Transport failures are turned into results, never into errors
// =============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, LOCATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

/// User-Agent sent with every check. Some servers (Wikipedia, Amazon, ...)
/// refuse requests that don't look like a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const MAX_REDIRECTS: usize = 10;

/// Outcome of probing one unique URL.
///
/// `status_code` is 0 when no HTTP response was received at all; in that
/// case `status_text` says why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub url: String,
    pub status_code: u16,
    pub status_text: String,
    /// True if at least one redirect was followed
    pub is_redirect: bool,
    /// Where the redirects ended up, empty if there were none
    pub final_url: String,
    /// True if the URL lives on the Canvas instance
    pub is_internal: bool,
}

impl CheckResult {
    /// A result for a URL that never produced an HTTP response
    pub fn failed(url: impl Into<String>, reason: impl Into<String>, is_internal: bool) -> Self {
        Self {
            url: url.into(),
            status_code: 0,
            status_text: reason.into(),
            is_redirect: false,
            final_url: String::new(),
            is_internal,
        }
    }
}

/// The Canvas API token. Debug output never shows the value.
#[derive(Clone)]
pub struct Credential(Arc<str>);

impl Credential {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self(Arc::from(token.as_ref()))
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Random pause inserted before each check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min: Duration,
    pub max: Duration,
}

impl Pacing {
    pub fn delay(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(500),
            max: Duration::from_millis(1500),
        }
    }
}

/// Settings for the URL checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// `None` disables the pause before each request
    pub pacing: Option<Pacing>,
    /// Accept invalid TLS certificates
    pub insecure: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            pacing: Some(Pacing::default()),
            insecure: false,
        }
    }
}

/// Checks single URLs. Cheap to clone: the HTTP client and the credential
/// are shared between clones.
#[derive(Debug, Clone)]
pub struct UrlChecker {
    client: Client,
    base: Arc<Url>,
    credential: Credential,
    pacing: Option<Pacing>,
}

impl UrlChecker {
    pub fn new(config: &CheckerConfig, base: Url, credential: Credential) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base: Arc::new(base),
            credential,
            pacing: config.pacing,
        })
    }

    /// True if `url` points at the same host (and port) as the Canvas base URL
    pub fn is_internal(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => {
                parsed.host_str().is_some()
                    && parsed.host_str() == self.base.host_str()
                    && parsed.port_or_known_default() == self.base.port_or_known_default()
            }
            Err(_) => false,
        }
    }

    /// Probes `url` once. Never fails: transport errors come back as a
    /// result with status code 0.
    pub async fn check(&self, url: &str) -> CheckResult {
        if let Some(pacing) = self.pacing {
            tokio::time::sleep(pacing.delay()).await;
        }

        let is_internal = self.is_internal(url);

        let result = match self.follow(url).await {
            Ok((response, hops)) => analyze_response(url, &response, hops, is_internal),
            Err(e) => categorize_error(url, &e, is_internal),
        };

        tracing::debug!(
            url,
            status = result.status_code,
            redirect = result.is_redirect,
            internal = result.is_internal,
            "checked"
        );
        result
    }

    // Follows redirects hop by hop so that a chain ending back at the
    // requested URL still counts. Only hops on the Canvas host get the token.
    //
    // send() resolves once the headers are in; dropping a response closes
    // the connection without reading the body.
    async fn follow(&self, url: &str) -> Result<(Response, usize), FollowError> {
        let mut current = url.to_string();
        let mut hops = 0;

        loop {
            let mut request = self.client.get(current.as_str());
            if self.is_internal(&current) {
                request = request.header(AUTHORIZATION, self.credential.bearer());
            }
            let response = request.send().await?;

            let Some(next) = redirect_target(&response) else {
                return Ok((response, hops));
            };
            if hops == MAX_REDIRECTS {
                return Err(FollowError::TooManyRedirects);
            }
            tracing::trace!(from = %current, to = %next, "following redirect");
            hops += 1;
            current = next;
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum FollowError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("too many redirects")]
    TooManyRedirects,
}

// Where a redirect response points, resolved against the URL that sent it.
// A redirect status without a usable Location is treated as the final answer.
fn redirect_target(response: &Response) -> Option<String> {
    let status = response.status();
    let followed = [
        StatusCode::MOVED_PERMANENTLY,
        StatusCode::FOUND,
        StatusCode::SEE_OTHER,
        StatusCode::TEMPORARY_REDIRECT,
        StatusCode::PERMANENT_REDIRECT,
    ];
    if !followed.contains(&status) {
        return None;
    }

    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    response.url().join(location).ok().map(String::from)
}

// Turns the last response of a chain into a result
fn analyze_response(url: &str, response: &Response, hops: usize, is_internal: bool) -> CheckResult {
    let status = response.status();
    let is_redirect = hops > 0;

    CheckResult {
        url: url.to_string(),
        status_code: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        is_redirect,
        final_url: if is_redirect {
            response.url().to_string()
        } else {
            String::new()
        },
        is_internal,
    }
}

// Maps failures to a status text.
// Timeouts go first: a connect timeout is also a connect error.
fn categorize_error(url: &str, error: &FollowError, is_internal: bool) -> CheckResult {
    let reason = match error {
        FollowError::Http(e) if e.is_timeout() => "Timeout".to_string(),
        FollowError::Http(e) if e.is_connect() => "Connection Error".to_string(),
        other => format!("Error: {}", other),
    };

    CheckResult::failed(url, reason, is_internal)
}
