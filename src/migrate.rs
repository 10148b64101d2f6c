//! Migration of pure-domain entries into category hostlist files.
//!
//! Adblock list files accumulate bare domains that belong in hostlists.
//! The engine scans every source file, extracts its pure-domain entries
//! (strict grammar, see [`crate::rules::is_pure_domain`]), routes each to
//! exactly one category, merges them into the category file without
//! duplicating existing entries, and rewrites the source with only its
//! residual lines.
//!
//! The scan phase is read-only; destination files are written first, and a
//! source file is rewritten only if every destination its domains routed
//! to was written successfully. A source left untouched may hold domains
//! that now also exist in a destination; a later run migrates them again,
//! which is preferable to losing them.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::persist;
use crate::rules;

/// Destination category for a migrated domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Spotify,
    SocialMedia,
    Games,
    Ads,
    Other,
}

impl Category {
    /// Hostlist filename for this category.
    pub fn filename(self) -> &'static str {
        match self {
            Category::Spotify => "Spotify.txt",
            Category::SocialMedia => "Social-Media.txt",
            Category::Games => "Games.txt",
            Category::Ads => "Ads.txt",
            Category::Other => "Other.txt",
        }
    }
}

/// Source-filename keyword rules, evaluated first, in order.
const SOURCE_RULES: &[(&str, Category)] = &[
    ("spotify", Category::Spotify),
    ("youtube", Category::SocialMedia),
    ("twitch", Category::SocialMedia),
    ("reddit", Category::SocialMedia),
    ("twitter", Category::SocialMedia),
    ("game", Category::Games),
];

/// Domain keyword rules, evaluated second, in order.
const DOMAIN_RULES: &[(&str, Category)] = &[
    ("ad", Category::Ads),
    ("ads", Category::Ads),
    ("analytics", Category::Ads),
    ("tracking", Category::Ads),
    ("tracker", Category::Ads),
    ("telemetry", Category::Ads),
    ("metric", Category::Ads),
    ("social", Category::SocialMedia),
    ("facebook", Category::SocialMedia),
    ("twitter", Category::SocialMedia),
    ("instagram", Category::SocialMedia),
];

/// Route a domain to its destination category.
///
/// Precedence is fixed: source-filename keywords beat domain keywords,
/// which beat the [`Category::Other`] fallback. Both tables are ordered;
/// the first matching keyword wins.
pub fn categorize(domain: &str, source_file: &str) -> Category {
    let source_file = source_file.to_ascii_lowercase();
    for (keyword, category) in SOURCE_RULES {
        if source_file.contains(keyword) {
            return *category;
        }
    }

    let domain = domain.to_ascii_lowercase();
    for (keyword, category) in DOMAIN_RULES {
        if domain.contains(keyword) {
            return *category;
        }
    }

    Category::Other
}

/// One source file's split into residual content and extracted domains.
#[derive(Debug)]
struct SourceSplit {
    path: PathBuf,
    /// Everything that is not a pure domain, original order, verbatim.
    residual: Vec<String>,
    /// Extracted pure domains with their destination category.
    moves: Vec<(Category, String)>,
}

/// Totals for one migration run.
#[derive(Debug, Default, Clone, Copy)]
pub struct MigrationSummary {
    /// Source files scanned.
    pub scanned: usize,
    /// Domains newly appended to destination files.
    pub moved: usize,
    /// Source files left untouched because a destination write failed.
    pub skipped_sources: usize,
}

/// Run the migration over `adblock_dir`, appending into hostlists under
/// `hostlist_dir`.
pub fn run(adblock_dir: &Path, hostlist_dir: &Path) -> Result<MigrationSummary> {
    let mut summary = MigrationSummary::default();

    // Phase 1: scan sources (read-only).
    let mut splits: Vec<SourceSplit> = Vec::new();
    for path in crate::dedupe::list_files(adblock_dir) {
        summary.scanned += 1;
        match split_source(&path) {
            Ok(Some(split)) => {
                info!(
                    "{}: {} pure domains to migrate",
                    path.display(),
                    split.moves.len()
                );
                splits.push(split);
            }
            Ok(None) => {}
            Err(e) => warn!("Skipping {}: {e:#}", path.display()),
        }
    }

    if splits.is_empty() {
        info!("No pure domains found in adblock lists");
        return Ok(summary);
    }

    // Phase 2: merge into destinations.
    let mut incoming: BTreeMap<Category, Vec<String>> = BTreeMap::new();
    for split in &splits {
        for (category, domain) in &split.moves {
            incoming.entry(*category).or_default().push(domain.clone());
        }
    }

    let mut failed: BTreeSet<Category> = BTreeSet::new();
    for (category, domains) in &incoming {
        match append_new_domains(hostlist_dir, *category, domains) {
            Ok(appended) => {
                summary.moved += appended;
                if appended > 0 {
                    info!("Appended {} domains to {}", appended, category.filename());
                }
            }
            Err(e) => {
                warn!("Failed to update {}: {e:#}", category.filename());
                failed.insert(*category);
            }
        }
    }

    // Phase 3: rewrite sources whose destinations all succeeded. A source
    // and its destinations form a logical unit: if any destination write
    // failed, the source keeps its domains for a later run.
    for split in &splits {
        if split.moves.iter().any(|(c, _)| failed.contains(c)) {
            warn!(
                "Leaving {} untouched: a destination write failed",
                split.path.display()
            );
            summary.skipped_sources += 1;
            continue;
        }

        let mut content = split.residual.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        if let Err(e) = persist::write_atomic(&split.path, &content) {
            warn!("Failed to rewrite {}: {e:#}", split.path.display());
            summary.skipped_sources += 1;
        }
    }

    Ok(summary)
}

/// Read one source file and split it; `None` when it has no pure domains.
fn split_source(path: &Path) -> Result<Option<SourceSplit>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut residual = Vec::new();
    let mut moves = Vec::new();
    for line in content.lines() {
        if rules::is_pure_domain(line) {
            let domain = line.trim().to_string();
            let category = categorize(&domain, &source_name);
            moves.push((category, domain));
        } else {
            residual.push(line.to_string());
        }
    }

    if moves.is_empty() {
        return Ok(None);
    }
    Ok(Some(SourceSplit {
        path: path.to_path_buf(),
        residual,
        moves,
    }))
}

/// Append the incoming domains that are not already present in the
/// category file, sorted. Returns how many were appended.
fn append_new_domains(hostlist_dir: &Path, category: Category, domains: &[String]) -> Result<usize> {
    let path = hostlist_dir.join(category.filename());
    let existing_content = if path.exists() {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    } else {
        String::new()
    };

    // Only valid-domain lines count as existing entries; comments or
    // patterns in the hostlist never suppress an incoming domain.
    let existing: HashSet<&str> = existing_content
        .lines()
        .map(str::trim)
        .filter(|l| rules::is_valid_domain(l))
        .collect();

    let mut fresh: Vec<&str> = domains
        .iter()
        .map(String::as_str)
        .filter(|d| !existing.contains(d))
        .collect();
    fresh.sort_unstable();
    fresh.dedup();

    if fresh.is_empty() {
        return Ok(0);
    }

    let mut out = existing_content;
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for domain in &fresh {
        out.push_str(domain);
        out.push('\n');
    }
    persist::write_atomic(&path, &out)?;
    Ok(fresh.len())
}
