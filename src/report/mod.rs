//! Append-only result sink.
//!
//! Probe actions record their hits here; the pool never sees them. The sink
//! has an explicit lifecycle: created before the pool starts, flushed by the
//! caller after `wait_all`, so there is no global mutable reporting state.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};

/// Shared append-only file of `target,evidence` lines.
pub struct ResultSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl ResultSink {
    /// Open (or create) the result file in append mode.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open result file {}", path.display()))?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Append one result line. Safe to call from any worker.
    pub fn record(&self, target: &str, evidence: &str) -> Result<()> {
        let mut writer = self.writer.lock().unwrap();
        writeln!(writer, "{target},{evidence}")
            .with_context(|| format!("failed to append result for {target}"))
    }

    /// Flush buffered results to disk. Call after the pool has drained.
    pub fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .unwrap()
            .flush()
            .context("failed to flush result file")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
