use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::types::ScanReport;

/// Write a scan report as pretty-printed JSON.
pub fn write_scan_json(path: &Path, report: &ScanReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create output file: {}", path.display()))?;
    serde_json::to_writer_pretty(file, report)
        .with_context(|| format!("failed to write scan report to {}", path.display()))?;
    Ok(())
}

/// Default artifact name for a target, e.g. `scan_example_com.json`.
/// Dots and IPv6 colons are replaced to keep the name filesystem-friendly.
pub fn default_output_path(target: &str) -> PathBuf {
    PathBuf::from(format!("scan_{}.json", target.replace(['.', ':'], "_")))
}
