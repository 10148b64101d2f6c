//! Cross-file duplicate detection.
//!
//! Purely informational: nothing here mutates a file. Entries appearing in
//! two or more files are reported grouped by the set of files sharing
//! them, which keeps the report compact for the common case of a few big
//! overlapping pairs.

use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{info, warn};

/// How many example entries to print per file group before truncating.
const REPORT_SAMPLE: usize = 5;

/// Map each rule appearing in two or more files to the sorted set of
/// filenames containing it.
pub fn detect(per_file_rules: &BTreeMap<String, Vec<String>>) -> BTreeMap<String, BTreeSet<String>> {
    let mut locations: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (file, rules) in per_file_rules {
        for rule in rules {
            let rule = rule.trim();
            if !rule.is_empty() {
                locations
                    .entry(rule.to_string())
                    .or_default()
                    .insert(file.clone());
            }
        }
    }
    locations.retain(|_, files| files.len() > 1);
    locations
}

/// Group duplicates by the exact set of files sharing them.
pub fn group_by_files(
    duplicates: &BTreeMap<String, BTreeSet<String>>,
) -> BTreeMap<BTreeSet<String>, Vec<String>> {
    let mut groups: BTreeMap<BTreeSet<String>, Vec<String>> = BTreeMap::new();
    for (entry, files) in duplicates {
        groups.entry(files.clone()).or_default().push(entry.clone());
    }
    groups
}

/// Collect every non-empty trimmed line of every `.txt` file under
/// `lists_dir`, keyed by filename. Used by the standalone audit command,
/// which inspects files as they are rather than through the dedup pass.
pub fn scan_dir(lists_dir: &Path) -> Result<BTreeMap<String, Vec<String>>> {
    let mut per_file = BTreeMap::new();
    for path in crate::dedupe::list_files(lists_dir) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let lines: Vec<String> = content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect();
                per_file.insert(name, lines);
            }
            Err(e) => warn!("Skipping unreadable file {}: {e}", path.display()),
        }
    }
    Ok(per_file)
}

/// Log the duplicate report.
pub fn report(duplicates: &BTreeMap<String, BTreeSet<String>>) {
    if duplicates.is_empty() {
        info!("No cross-file duplicates found");
        return;
    }

    info!("Found {} entries appearing in multiple files", duplicates.len());
    for (files, entries) in group_by_files(duplicates) {
        let file_list = files.iter().cloned().collect::<Vec<_>>().join(", ");
        info!("{} entries appear in: {}", entries.len(), file_list);
        for entry in entries.iter().take(REPORT_SAMPLE) {
            info!("  {entry}");
        }
        if entries.len() > REPORT_SAMPLE {
            info!("  ... and {} more", entries.len() - REPORT_SAMPLE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_map(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(file, rules)| {
                (
                    file.to_string(),
                    rules.iter().map(|r| r.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_detect_reports_shared_entries_only() {
        let per_file = rule_map(&[
            ("A.txt", &["x", "y"]),
            ("B.txt", &["x"]),
            ("C.txt", &["y", "z"]),
        ]);

        let dups = detect(&per_file);

        assert_eq!(dups.len(), 2);
        let x_files: Vec<_> = dups["x"].iter().cloned().collect();
        assert_eq!(x_files, vec!["A.txt", "B.txt"]);
        let y_files: Vec<_> = dups["y"].iter().cloned().collect();
        assert_eq!(y_files, vec!["A.txt", "C.txt"]);
        assert!(!dups.contains_key("z"));
    }

    #[test]
    fn test_detect_ignores_blank_entries() {
        let per_file = rule_map(&[("A.txt", &["", "  "]), ("B.txt", &["", "  "])]);
        assert!(detect(&per_file).is_empty());
    }

    #[test]
    fn test_repeats_within_one_file_are_not_cross_file() {
        let per_file = rule_map(&[("A.txt", &["x", "x"]), ("B.txt", &["y"])]);
        assert!(detect(&per_file).is_empty());
    }

    #[test]
    fn test_group_by_files() {
        let per_file = rule_map(&[
            ("A.txt", &["x", "y", "w"]),
            ("B.txt", &["x", "y", "z"]),
            ("C.txt", &["w"]),
        ]);
        let groups = group_by_files(&detect(&per_file));

        let ab: BTreeSet<String> = ["A.txt".to_string(), "B.txt".to_string()].into();
        assert_eq!(groups[&ab], vec!["x", "y"]);
        let ac: BTreeSet<String> = ["A.txt".to_string(), "C.txt".to_string()].into();
        assert_eq!(groups[&ac], vec!["w"]);
    }

    #[test]
    fn test_scan_dir_reads_trimmed_nonempty_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x\n\n  y  \n").unwrap();
        std::fs::write(dir.path().join("b.txt"), "y\n").unwrap();

        let per_file = scan_dir(dir.path()).unwrap();
        assert_eq!(per_file["a.txt"], vec!["x", "y"]);

        let dups = detect(&per_file);
        assert_eq!(dups.len(), 1);
        assert!(dups.contains_key("y"));
    }
}
