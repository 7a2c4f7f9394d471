//! The packaged build output

use std::path::PathBuf;

/// A deployable archive and the directory it was built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Directory that was archived
    pub output_dir: PathBuf,
    /// The archive file; exists and is non-empty when the artifact is created
    pub archive_path: PathBuf,
    /// Archive size at creation
    pub size_bytes: u64,
}

impl Artifact {
    /// Human readable archive size
    pub fn display_size(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Format a byte count as B, KB or MB
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let value = bytes as f64;
    if value >= MB {
        format!("{:.2} MB", value / MB)
    } else if value >= KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{} B", bytes)
    }
}
