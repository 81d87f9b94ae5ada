// src/checker/mod.rs
// =============================================================================
// This module contains all link discovery and checking logic.
//
// Submodules:
// - filter: decides which references are worth checking
// - link: the DiscoveredLink record shared by everything below
// - html: extracts links, images and iframes from HTML fragments
// - http: probes a single URL
// - pool: checks every distinct URL once with bounded concurrency
// =============================================================================

mod filter;
mod html;
mod http;
mod link;
mod pool;

pub use filter::is_checkable;
pub use html::LinkExtractor;
pub use http::{CheckResult, CheckerConfig, Credential, Pacing, UrlChecker};
pub use link::{DiscoveredLink, LinkKind};
pub use pool::{check_all, unique_urls, DEFAULT_WORKERS};
