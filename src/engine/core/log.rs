use anyhow::{Context, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only run log: rendered commands, exit statuses, stderr tails.
#[derive(Debug, Clone)]
pub struct DebugLog {
    path: PathBuf,
}

impl DebugLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped entry, creating the file if needed.
    pub fn append(&self, message: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open debug log {}", self.path.display()))?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        for line in message.lines() {
            writeln!(file, "[{}] {}", timestamp, line)?;
        }
        Ok(())
    }
}
