// src/checker/pool.rs
// =============================================================================
// Checks every distinct URL exactly once, a few at a time.
//
// How it works:
// 1. Collapse all discovered links into a set of distinct URLs
// 2. Spawn one task per URL, at most `workers` running at once
// 3. Wait for every task, then hand back a map from URL to result
//
// The default pool is small. Canvas and publisher sites start answering
// 403/429 when hit by many parallel requests.
// =============================================================================

use std::collections::{HashMap, HashSet};

use futures::stream::{self, StreamExt};

use super::http::{CheckResult, UrlChecker};
use super::link::DiscoveredLink;

/// Default number of checks in flight at once
pub const DEFAULT_WORKERS: usize = 5;

/// Distinct URLs referenced by `links`
pub fn unique_urls(links: &[DiscoveredLink]) -> HashSet<&str> {
    links.iter().map(|link| link.url.as_str()).collect()
}

/// Checks each distinct URL in `links` once and returns the results keyed
/// by URL.
///
/// Returns only after every check has finished. A check that panics is
/// reported as a failed result for its own URL; the other checks are not
/// affected.
pub async fn check_all(
    links: &[DiscoveredLink],
    checker: &UrlChecker,
    workers: usize,
) -> HashMap<String, CheckResult> {
    let urls: Vec<String> = unique_urls(links).into_iter().map(String::from).collect();

    let checks = urls.into_iter().map(|url| {
        let checker = checker.clone();
        async move {
            let task = tokio::spawn({
                let checker = checker.clone();
                let url = url.clone();
                async move { checker.check(&url).await }
            });

            let result = match task.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "link check task failed");
                    CheckResult::failed(url.clone(), format!("Error: {}", e), checker.is_internal(&url))
                }
            };
            (url, result)
        }
    });

    stream::iter(checks)
        .buffer_unordered(workers.max(1))
        .collect()
        .await
}
