// src/canvas/collect.rs
// =============================================================================
// Walks a course and gathers every link worth checking.
//
// Sections scanned, in order:
//   pages, assignments, discussions, syllabus, announcements, module items
//
// Only the course lookup itself is fatal. Any other failure (one section
// or one page) is logged and skipped so a single broken item never hides
// the rest of the course.
// =============================================================================

use std::fmt::Display;

use crate::checker::{is_checkable, DiscoveredLink, LinkExtractor, LinkKind};

use super::fetch::{CanvasClient, SourceError};

const MODULE_LINK_TEXT: &str = "Module External URL";

/// Everything collected from one course
#[derive(Debug, Clone)]
pub struct CourseLinks {
    /// Canvas' numeric id of the course
    pub id: String,
    pub name: String,
    pub links: Vec<DiscoveredLink>,
}

/// Collects the links of every content item in the course.
///
/// Fails only if the course itself cannot be loaded.
pub async fn collect_course_links(
    client: &CanvasClient,
    extractor: &LinkExtractor,
    course_ref: &str,
) -> Result<CourseLinks, SourceError> {
    let course = client.course(course_ref).await?;
    let id = course.id.to_string();
    println!("\n📘 Processing Canvas Course: {} ({})\n", course.name, id);

    let mut links = Vec::new();

    println!("🔎 Scanning Pages …");
    if let Some(pages) = section("pages", client.pages(&id).await) {
        for summary in pages {
            match client.page(&id, &summary.url).await {
                Ok(page) => links.extend(extractor.extract(
                    page.body.as_deref().unwrap_or_default(),
                    &summary.html_url,
                    &format!("Page: {}", summary.title),
                )),
                Err(e) => skip_item("page", &summary.title, &e),
            }
        }
    }

    println!("🔎 Scanning Assignments …");
    if let Some(assignments) = section("assignments", client.assignments(&id).await) {
        for a in assignments {
            links.extend(extractor.extract(
                a.description.as_deref().unwrap_or_default(),
                &a.html_url,
                &format!("Assignment: {}", a.name),
            ));
        }
    }

    println!("🔎 Scanning Discussions …");
    if let Some(topics) = section("discussions", client.discussion_topics(&id, false).await) {
        for d in topics {
            links.extend(extractor.extract(
                d.message.as_deref().unwrap_or_default(),
                &d.html_url,
                &format!("Discussion: {}", d.title),
            ));
        }
    }

    println!("🔎 Scanning Syllabus …");
    if let Some(body) = course.syllabus_body.as_deref() {
        let source = format!("{}/courses/{}/assignments/syllabus", client.origin(), id);
        links.extend(extractor.extract(body, &source, "Syllabus"));
    }

    println!("🔎 Scanning Announcements …");
    if let Some(topics) = section("announcements", client.discussion_topics(&id, true).await) {
        for ann in topics {
            links.extend(extractor.extract(
                ann.message.as_deref().unwrap_or_default(),
                &ann.html_url,
                &format!("Announcement: {}", ann.title),
            ));
        }
    }

    println!("🔎 Scanning Modules (External URL Items) …");
    if let Some(modules) = section("modules", client.modules(&id).await) {
        let source = format!("{}/courses/{}/modules", client.origin(), id);
        for module in modules {
            let items = match client.module_items(&id, module.id).await {
                Ok(items) => items,
                Err(e) => {
                    skip_item("module", &module.name, &e);
                    continue;
                }
            };

            for item in items {
                if item.kind != "ExternalUrl" {
                    continue;
                }
                let Some(url) = item
                    .external_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|u| is_checkable(u)) else {
                    continue;
                };
                links.push(DiscoveredLink {
                    url: url.to_string(),
                    text: MODULE_LINK_TEXT.to_string(),
                    source_location: source.clone(),
                    location_name: format!("Module: {} / Item: {}", module.name, item.title),
                    kind: LinkKind::ModuleItem,
                });
            }
        }
    }

    Ok(CourseLinks {
        id,
        name: course.name,
        links,
    })
}

// Unwraps a section listing, or logs why the section is skipped
fn section<T>(name: &str, listing: Result<T, SourceError>) -> Option<T> {
    match listing {
        Ok(items) => Some(items),
        Err(e) => {
            tracing::warn!(section = name, error = %e, "skipping section");
            println!("⚠️  Could not scan {}: {}", name, e);
            None
        }
    }
}

fn skip_item(kind: &str, title: &str, error: &impl Display) {
    tracing::warn!(kind, title, error = %error, "skipping item");
    println!("⚠️  Skipping {} {:?}: {}", kind, title, error);
}
