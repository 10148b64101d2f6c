//! Dedupe command implementation.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use crate::audit;
use crate::dedupe::{self, FileStats};
use crate::lock::LockGuard;

/// Deduplicate every list file under `lists_dir`, then report cross-file
/// duplicates among the survivors.
pub fn run(lists_dir: &Path) -> Result<()> {
    anyhow::ensure!(
        lists_dir.is_dir(),
        "Lists directory not found: {}",
        lists_dir.display()
    );
    let _lock = LockGuard::acquire(lists_dir)?;

    let files = dedupe::list_files(lists_dir);
    anyhow::ensure!(!files.is_empty(), "No .txt files found in {}", lists_dir.display());
    info!("Found {} files", files.len());

    let mut totals = FileStats::default();
    let mut per_file_rules: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for path in files {
        match dedupe::dedupe_file(&path) {
            Ok((stats, rules)) => {
                totals.absorb(&stats);
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                per_file_rules.insert(name, rules);
            }
            Err(e) => warn!("Skipping {}: {e:#}", path.display()),
        }
    }

    info!(
        "Total: {} -> {} lines ({} removed, {:.1}% reduction)",
        totals.original,
        totals.final_count,
        totals.removed,
        totals.compression_ratio()
    );

    info!("Checking for cross-file duplicates...");
    audit::report(&audit::detect(&per_file_rules));

    Ok(())
}
