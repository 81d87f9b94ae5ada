// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments (and CANVAS_* environment variables)
// 2. Collect every link in the course from the Canvas API
// 3. Check each distinct URL once, a few at a time
// 4. Classify the results and print / save the report
// 5. Exit with proper code (0 = no issues, 1 = issues found, 2 = error)
// =============================================================================

mod canvas;   // src/canvas/ - reading course content from Canvas
mod checker;  // src/checker/ - link extraction and checking
mod classify; // src/classify.rs - issue taxonomy
mod cli;      // src/cli.rs - command-line parsing
mod report;   // src/report/ - sorting and exporting the report

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use canvas::{CanvasClient, CourseLinks, SourceError};
use checker::{Credential, LinkExtractor, UrlChecker};
use classify::{Classifier, CourseContext};
use cli::{Cli, Commands, CourseArgs};
use report::Report;

/// Written when the requested report file cannot be created
const FALLBACK_REPORT: &str = "link_report.csv";

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no issues
//   Ok(1) = issues found
//   Err = anything that stopped the scan
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Course(args) => handle_course_scan(args).await,
    }
}

// Diagnostics go to stderr; RUST_LOG wins over -v
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("course_link_audit={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn handle_course_scan(args: CourseArgs) -> Result<i32> {
    let course_ref = canvas::parse_course_id(&args.course)?;
    let ctx = CourseContext::with_pattern(course_ref.as_str(), &args.container_pattern)
        .context("Invalid --container-pattern")?;
    let credential = Credential::new(&args.api_key);

    let client = CanvasClient::new(args.api_url.clone(), credential.clone(), args.timeout())?;
    let extractor = LinkExtractor::new(args.api_url.clone());

    let course: CourseLinks = match canvas::collect_course_links(&client, &extractor, &course_ref).await {
        Ok(course) => course,
        Err(SourceError::Status { status, .. }) if status == reqwest::StatusCode::UNAUTHORIZED => {
            anyhow::bail!("Canvas rejected the API key (HTTP 401) for course {}", course_ref)
        }
        Err(e) => return Err(e).context("Error accessing course"),
    };
    let ctx = ctx.with_course_id(course.id.as_str());
    tracing::info!(course = %course.name, id = %course.id, links = course.links.len(), "course collected");

    if course.links.is_empty() {
        println!("✅ No links found to check");
        return Ok(0);
    }

    let unique = checker::unique_urls(&course.links).len();
    println!(
        "\n🔗 Found {} total links. Checking {} unique URLs ...",
        course.links.len(),
        unique
    );

    let url_checker = UrlChecker::new(&args.checker_config(), args.api_url.clone(), credential)?;
    let results = checker::check_all(&course.links, &url_checker, args.workers).await;
    tracing::info!(checked = results.len(), workers = args.workers, "link checks finished");

    let report = Report::assemble(
        &course.links,
        &results,
        &Classifier::new(args.policy()),
        &ctx,
    );
    println!("\n📊 Processing {} issues found …", report.len());

    if report.is_empty() {
        println!("✅ No broken, redirected, or inaccessible links found!");
        return Ok(0);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_table();
    }

    let target = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("Link_Report_{}.csv", ctx.course_id())));
    let written = report::export_with_fallback(&report, &target, &PathBuf::from(FALLBACK_REPORT))?;
    println!("\n💾 Report saved: {}", written.display());

    Ok(1)
}
