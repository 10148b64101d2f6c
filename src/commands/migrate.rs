//! Migrate command implementation.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::lock::LockGuard;
use crate::migrate;

/// Move pure-domain entries from `<lists_dir>/adblock` into category
/// hostlists under `<lists_dir>/hostlist`.
pub fn run(lists_dir: &Path) -> Result<()> {
    let adblock_dir = lists_dir.join("adblock");
    let hostlist_dir = lists_dir.join("hostlist");
    anyhow::ensure!(
        adblock_dir.is_dir(),
        "Adblock directory not found: {}",
        adblock_dir.display()
    );
    anyhow::ensure!(
        hostlist_dir.is_dir(),
        "Hostlist directory not found: {}",
        hostlist_dir.display()
    );

    let _lock = LockGuard::acquire(lists_dir)?;

    let summary = migrate::run(&adblock_dir, &hostlist_dir)?;
    info!(
        "Migrated {} domains from {} files ({} sources left untouched)",
        summary.moved, summary.scanned, summary.skipped_sources
    );
    Ok(())
}
