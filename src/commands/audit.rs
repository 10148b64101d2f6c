//! Audit command implementation.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::audit;

/// Report entries appearing in more than one list file. Read-only: the
/// report is informational, duplicates are never removed across files.
pub fn run(lists_dir: &Path) -> Result<()> {
    anyhow::ensure!(
        lists_dir.is_dir(),
        "Lists directory not found: {}",
        lists_dir.display()
    );

    let per_file = audit::scan_dir(lists_dir)?;
    info!("Scanning {} files for cross-file duplicates...", per_file.len());
    audit::report(&audit::detect(&per_file));
    Ok(())
}
