//! Per-run metadata persisted next to the mirrored lists.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::persist;

/// Filename of the run metadata document inside the output directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Outcome of fetching a single source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceOutcome {
    pub url: String,
    pub filename: String,
    pub success: bool,
    /// Whether a checksum header was present and validated.
    pub checksum_validated: bool,
}

/// Record of one fetch run: when it happened and how each source fared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub timestamp: DateTime<Utc>,
    pub sources: Vec<SourceOutcome>,
}

impl RunMetadata {
    pub fn new(sources: Vec<SourceOutcome>) -> Self {
        Self {
            timestamp: Utc::now(),
            sources,
        }
    }

    pub fn success_count(&self) -> usize {
        self.sources.iter().filter(|s| s.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.sources.len() - self.success_count()
    }

    /// Write the record as pretty JSON into `output_dir`.
    pub fn save(&self, output_dir: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        persist::write_atomic(&output_dir.join(METADATA_FILE), &format!("{content}\n"))?;
        Ok(())
    }
}
