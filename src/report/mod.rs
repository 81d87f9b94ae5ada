// src/report/mod.rs
// =============================================================================
// Builds the final report from discovered links and check results, and
// writes it out.
//
// Submodules:
// - export: CSV / JSON files with a CSV fallback
//
// Rows are sorted by issue type, then location, so two reports of the same
// course can be diffed line by line.
// =============================================================================

mod export;

pub use export::{export_with_fallback, write_csv, write_json, ExportFormat};

use std::collections::HashMap;

use serde::Serialize;

use crate::checker::{CheckResult, DiscoveredLink};
use crate::classify::{Classifier, CourseContext, IssueRecord};

/// Column names, in output order
pub const COLUMNS: [&str; 8] = [
    "Issue Type",
    "Location",
    "Status Code",
    "Status Msg",
    "Link Text",
    "Original URL",
    "Final URL",
    "Edit Link",
];

/// Sorted issue rows, ready for export
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Report {
    records: Vec<IssueRecord>,
}

impl Report {
    /// Sorts `records` by (issue type, location). Ties keep their order.
    pub fn new(mut records: Vec<IssueRecord>) -> Self {
        records.sort_by(|a, b| {
            a.issue_type
                .as_str()
                .cmp(b.issue_type.as_str())
                .then_with(|| a.location.cmp(&b.location))
        });
        Self { records }
    }

    /// Classifies every link occurrence against the result for its URL.
    ///
    /// Links whose URL has no result are skipped.
    pub fn assemble(
        links: &[DiscoveredLink],
        results: &HashMap<String, CheckResult>,
        classifier: &Classifier,
        ctx: &CourseContext,
    ) -> Self {
        let records = links
            .iter()
            .filter_map(|link| {
                let result = results.get(&link.url)?;
                classifier.classify(link, result, ctx)
            })
            .collect();
        Self::new(records)
    }

    pub fn records(&self) -> &[IssueRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Number of rows per issue type, in report order
    pub fn summary(&self) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<(&'static str, usize)> = Vec::new();
        for record in &self.records {
            let label = record.issue_type.as_str();
            match counts.last_mut() {
                Some((last, n)) if *last == label => *n += 1,
                _ => counts.push((label, 1)),
            }
        }
        counts
    }

    /// Prints the report as a table in the terminal
    pub fn print_table(&self) {
        println!("{:<32} {:<40} {:<6} {:<60}", "ISSUE", "LOCATION", "CODE", "URL");
        println!("{}", "=".repeat(141));

        for record in &self.records {
            println!(
                "{:<32} {:<40} {:<6} {:<60}",
                clip(record.issue_type.as_str(), 32),
                clip(&record.location, 40),
                record.status_code,
                clip(&record.original_url, 60),
            );
        }

        println!();
        println!("📊 Summary:");
        for (label, count) in self.summary() {
            println!("   {}: {}", label, count);
        }
        println!("   📋 Total: {}", self.len());
    }
}

// Cuts `text` to `width` characters, marking the cut with "..."
fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{LinkExtractor, LinkKind};
    use crate::classify::IssueType;
    use url::Url;

    fn record(issue_type: IssueType, location: &str) -> IssueRecord {
        IssueRecord {
            issue_type,
            location: location.to_string(),
            status_code: 0,
            status_text: String::new(),
            link_text: String::new(),
            original_url: String::new(),
            final_url: String::new(),
            edit_link: String::new(),
        }
    }

    fn ok(url: &str, internal: bool) -> CheckResult {
        CheckResult {
            url: url.to_string(),
            status_code: 200,
            status_text: "OK".to_string(),
            is_redirect: false,
            final_url: String::new(),
            is_internal: internal,
        }
    }

    #[test]
    fn test_sorted_by_issue_type_then_location() {
        let report = Report::new(vec![
            record(IssueType::Redirect, "Page: B"),
            record(IssueType::ClientError, "Page: Z"),
            record(IssueType::Redirect, "Assignment: A"),
            record(IssueType::ConnectionFailed, "Page: A"),
        ]);

        let order: Vec<_> = report
            .records()
            .iter()
            .map(|r| (r.issue_type.as_str(), r.location.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Broken Link (4xx)", "Page: Z"),
                ("Connection Failed", "Page: A"),
                ("Redirect", "Assignment: A"),
                ("Redirect", "Page: B"),
            ]
        );
        assert_eq!(
            report.summary(),
            vec![("Broken Link (4xx)", 1), ("Connection Failed", 1), ("Redirect", 2)]
        );
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_columns_match_record_fields() {
        let json = serde_json::to_value(record(IssueType::Redirect, "Page: A")).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        for column in COLUMNS {
            assert!(keys.iter().any(|k| k == column), "missing column {}", column);
        }
        assert_eq!(keys.len(), COLUMNS.len());
    }

    // <a href="/courses/999/files/1">doc</a> checked as a redirect
    #[test]
    fn test_redirect_scenario() {
        let extractor = LinkExtractor::new(Url::parse("https://lms.example/courses/42").unwrap());
        let links = extractor.extract(
            r#"<a href="/courses/999/files/1">doc</a>"#,
            "https://lms.example/courses/42/pages/a",
            "Page: A",
        );
        let url = "https://lms.example/courses/999/files/1";
        assert_eq!(links[0].url, url);

        let mut results = HashMap::new();
        results.insert(
            url.to_string(),
            CheckResult {
                is_redirect: true,
                final_url: "https://lms.example/files/1".to_string(),
                ..ok(url, true)
            },
        );

        let report = Report::assemble(&links, &results, &Classifier::default(), &CourseContext::new("42"));

        assert_eq!(report.len(), 1);
        let row = &report.records()[0];
        assert_eq!(row.issue_type, IssueType::Redirect);
        assert_eq!(row.final_url, "https://lms.example/files/1");
        assert_eq!(row.link_text, "doc");
        assert_eq!(row.edit_link, "https://lms.example/courses/42/pages/a");
    }

    // <img src="http://dead.example/x.png"> that cannot be reached
    #[test]
    fn test_connection_failed_scenario() {
        let extractor = LinkExtractor::new(Url::parse("https://lms.example").unwrap());
        let links = extractor.extract(
            r#"<img src="http://dead.example/x.png" alt="Lab diagram">"#,
            "https://lms.example/courses/42/assignments/3",
            "Assignment: Lab",
        );

        let mut results = HashMap::new();
        results.insert(
            "http://dead.example/x.png".to_string(),
            CheckResult::failed("http://dead.example/x.png", "Connection Error", false),
        );

        let report = Report::assemble(&links, &results, &Classifier::default(), &CourseContext::new("42"));

        assert_eq!(report.len(), 1);
        let row = &report.records()[0];
        assert_eq!(row.issue_type, IssueType::ConnectionFailed);
        assert_eq!(row.link_text, "Image: Lab diagram");
        assert_eq!(row.status_code, 0);
        assert_eq!(row.status_text, "Connection Error");
        assert!(row.final_url.is_empty());
    }

    // Two pages share one URL: one result, two rows
    #[test]
    fn test_shared_url_scenario() {
        let url = "https://lms.example/courses/42/pages/a";
        let link = |page: &str| DiscoveredLink {
            url: url.to_string(),
            text: "A".to_string(),
            source_location: format!("https://lms.example/courses/42/pages/{}", page),
            location_name: format!("Page: {}", page),
            kind: LinkKind::Link,
        };
        let links = vec![link("one"), link("two")];

        let mut results = HashMap::new();
        results.insert(url.to_string(), CheckResult { status_code: 404, status_text: "Not Found".to_string(), ..ok(url, true) });

        let report = Report::assemble(&links, &results, &Classifier::default(), &CourseContext::new("42"));

        assert_eq!(report.len(), 2);
        assert!(report.records().iter().all(|r| r.status_code == 404 && r.original_url == url));
        assert_eq!(report.records()[0].location, "Page: one");
        assert_eq!(report.records()[1].location, "Page: two");
    }

    #[test]
    fn test_links_without_results_are_skipped() {
        let extractor = LinkExtractor::new(Url::parse("https://lms.example").unwrap());
        let links = extractor.extract(r#"<a href="https://a.example">a</a>"#, "src", "Page: A");
        let report = Report::assemble(&links, &HashMap::new(), &Classifier::default(), &CourseContext::new("1"));
        assert!(report.is_empty());
    }
}
