// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// The Canvas URL and API key can come from flags or from the environment
// (CANVAS_API_URL / CANVAS_API_KEY), so the key never has to appear in shell
// history. Everything else has a sensible default.
//
// The parsed arguments are turned into plain config values (CheckerConfig,
// Policy) here, and those are passed down explicitly. Nothing below main.rs
// reads global state.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use url::Url;

use crate::checker::{CheckerConfig, Pacing, DEFAULT_WORKERS};
use crate::classify::{Policy, DEFAULT_CONTAINER_PATTERN};

#[derive(Parser, Debug)]
#[command(
    name = "course-link-audit",
    version,
    about = "Scan a Canvas course for broken, redirected and locked links",
    long_about = "course-link-audit reads every page, assignment, discussion, announcement, \
                  the syllabus and module links of a Canvas course, checks each linked URL, \
                  and writes a report of everything that needs fixing."
)]
pub struct Cli {
    /// More log output on stderr (-v, -vv, -vvv). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan one course
    ///
    /// Example: course-link-audit course https://school.instructure.com/courses/12345
    Course(CourseArgs),
}

#[derive(Args, Debug)]
pub struct CourseArgs {
    /// Course id or any URL inside the course
    pub course: String,

    /// Base URL of the Canvas instance
    #[arg(long, env = "CANVAS_API_URL")]
    pub api_url: Url,

    /// Canvas API access token
    #[arg(long, env = "CANVAS_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Number of links checked at the same time
    ///
    /// Lower is gentler on servers that throttle bots; higher is faster.
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 20)]
    pub timeout: u64,

    /// Skip the random 0.5-1.5s pause before each check
    #[arg(long)]
    pub no_pacing: bool,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// Only report "Broken Link" and "Redirect"
    #[arg(long)]
    pub simple: bool,

    /// Regex that finds the course id in a Canvas URL (first capture group)
    #[arg(long, default_value = DEFAULT_CONTAINER_PATTERN)]
    pub container_pattern: String,

    /// Report file; ".json" writes JSON, anything else CSV
    /// [default: Link_Report_<course id>.csv]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl CourseArgs {
    pub fn checker_config(&self) -> CheckerConfig {
        CheckerConfig {
            timeout: self.timeout(),
            pacing: (!self.no_pacing).then(Pacing::default),
            insecure: self.insecure,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn policy(&self) -> Policy {
        if self.simple {
            Policy::Simple
        } else {
            Policy::Detailed
        }
    }
}
