//! Target list input.
//!
//! Targets come from a plain text file with one `host[,extra]` line per
//! entry; only the host field before the first comma is used. Blank lines
//! and `#` comments are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

/// Read the list of probe targets from `path`.
pub fn read_targets<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open targets file {}", path.display()))?;

    let mut targets = Vec::new();
    for (line_number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| {
            format!("failed to read {} at line {}", path.display(), line_number + 1)
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let host = line.split(',').next().unwrap_or_default().trim();
        if !host.is_empty() {
            targets.push(host.to_string());
        }
    }
    Ok(targets)
}
