// src/report/export.rs
// =============================================================================
// Writes a report to disk.
//
// The format follows the file extension: ".json" gives a JSON array, anything
// else gives CSV with a fixed header row. If the requested file cannot be
// written (missing directory, no permission, ...) the report is saved as CSV
// at a fallback path instead, so a finished scan is never thrown away.
// =============================================================================

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{Report, COLUMNS};

/// File format of an exported report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Picks the format from the file extension, defaulting to CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Writes the report as CSV, header row first
pub fn write_csv(report: &Report, path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(COLUMNS)?;
    for record in report.records() {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the report as a pretty-printed JSON array
pub fn write_json(report: &Report, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    Ok(())
}

fn write(report: &Report, path: &Path) -> Result<()> {
    match ExportFormat::from_path(path) {
        ExportFormat::Csv => write_csv(report, path),
        ExportFormat::Json => write_json(report, path),
    }
}

/// Writes the report to `target`, or to `fallback` as CSV if that fails.
///
/// Returns the path that was actually written.
pub fn export_with_fallback(report: &Report, target: &Path, fallback: &Path) -> Result<PathBuf> {
    match write(report, target) {
        Ok(()) => Ok(target.to_path_buf()),
        Err(e) => {
            tracing::warn!(target = %target.display(), error = %e, "export failed, using fallback");
            eprintln!("❌ Could not write {}: {:#}", target.display(), e);

            write_csv(report, fallback)
                .with_context(|| format!("Fallback export to {} failed", fallback.display()))?;
            Ok(fallback.to_path_buf())
        }
    }
}
