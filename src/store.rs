use std::{collections::BTreeMap, fs::File, io::BufWriter, path::Path};

use anyhow::Context;

/// Per-URL outcomes accumulated over one run.
///
/// Invariants: a URL lives in at most one of the two maps, and the first
/// recorded outcome wins; later attempts to record the same URL are ignored,
/// which is what makes re-submitting a URL under a second access date a
/// no-op. `BTreeMap` keeps the flushed files deterministically ordered.
#[derive(Debug, Default)]
pub struct ResultStore {
    success: BTreeMap<String, String>,
    failure: BTreeMap<String, String>,
}

impl ResultStore {
    /// Has this URL already been resolved, either way?
    pub fn contains(&self, url: &str) -> bool {
        self.success.contains_key(url) || self.failure.contains_key(url)
    }

    pub fn record_success(&mut self, url: &str, citation: impl Into<String>) {
        if !self.contains(url) {
            self.success.insert(url.to_string(), citation.into());
        }
    }

    pub fn record_failure(&mut self, url: &str, reason: impl Into<String>) {
        if !self.contains(url) {
            self.failure.insert(url.to_string(), reason.into());
        }
    }

    pub fn failure_reason(&self, url: &str) -> Option<&str> {
        self.failure.get(url).map(String::as_str)
    }

    pub fn success_count(&self) -> usize {
        self.success.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failure.len()
    }

    /// Flush both maps as pretty-printed JSON, replacing existing files.
    pub fn write(&self, success_path: &Path, failure_path: &Path) -> anyhow::Result<()> {
        write_map(&self.success, success_path)?;
        write_map(&self.failure, failure_path)
    }
}

fn write_map(map: &BTreeMap<String, String>, path: &Path) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), map)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
