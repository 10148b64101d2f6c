//! In-file deduplication of filter-list entries.
//!
//! One pass over the file separates the leading header region from the
//! body, drops duplicate and invalid rules together with their pending
//! comment blocks, and re-emits the survivors sorted by rule text. Sorting
//! by rule trades original ordering for compression-friendly, diff-stable
//! output; callers must not assume original order survives.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

use crate::persist;
use crate::rules::{Classifier, LineClass};

/// Before/after line statistics for one processed file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStats {
    pub original: usize,
    pub headers: usize,
    pub final_count: usize,
    pub removed: usize,
}

impl FileStats {
    /// Fraction of lines removed, as a percentage.
    pub fn compression_ratio(&self) -> f64 {
        if self.original == 0 {
            0.0
        } else {
            (1.0 - self.final_count as f64 / self.original as f64) * 100.0
        }
    }

    /// Fold another file's stats into a running total.
    pub fn absorb(&mut self, other: &FileStats) {
        self.original += other.original;
        self.headers += other.headers;
        self.final_count += other.final_count;
        self.removed += other.removed;
    }
}

/// Result of deduplicating one file's lines.
#[derive(Debug)]
pub struct Deduped {
    /// Leading header region, in original order.
    pub headers: Vec<String>,
    /// Body to emit: survivors sorted by rule text, each preceded by its
    /// attached comment block.
    pub body: Vec<String>,
    /// Surviving rule texts only (no comments), for cross-file auditing.
    pub rules: Vec<String>,
    pub stats: FileStats,
}

impl Deduped {
    /// Render headers and body back into file content.
    pub fn to_content(&self) -> String {
        let mut out = String::new();
        for line in self.headers.iter().chain(self.body.iter()) {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Deduplicate a sequence of (right-trimmed) lines.
pub fn process_lines<'a, I>(lines: I) -> Deduped
where
    I: IntoIterator<Item = &'a str>,
{
    let mut stats = FileStats::default();
    let mut headers: Vec<String> = Vec::new();
    let mut survivors: Vec<(String, Vec<String>)> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut pending_comments: Vec<String> = Vec::new();
    let mut classifier = Classifier::new();

    for raw in lines {
        stats.original += 1;
        let line = raw.trim_end();

        // Blank lines survive only inside the header region.
        if line.is_empty() {
            if classifier.in_header() {
                headers.push(String::new());
            }
            continue;
        }

        match classifier.classify(line) {
            LineClass::Header => headers.push(line.to_string()),
            LineClass::Comment => pending_comments.push(line.to_string()),
            LineClass::Rule { text, .. } => {
                if seen.insert(text.clone()) {
                    survivors.push((text, std::mem::take(&mut pending_comments)));
                } else {
                    // A duplicate takes its pending comments down with it.
                    pending_comments.clear();
                }
            }
            LineClass::Invalid => pending_comments.clear(),
        }
    }

    survivors.sort_by(|a, b| a.0.cmp(&b.0));

    let mut body = Vec::new();
    let mut rules = Vec::with_capacity(survivors.len());
    for (rule, comments) in survivors {
        body.extend(comments);
        rules.push(rule.clone());
        body.push(rule);
    }

    stats.headers = headers.len();
    stats.final_count = headers.len() + body.len();
    stats.removed = stats.original.saturating_sub(stats.final_count);

    Deduped {
        headers,
        body,
        rules,
        stats,
    }
}

/// Deduplicate a single file in place (atomic rewrite). Returns the stats
/// and the surviving rule texts.
pub fn dedupe_file(path: &Path) -> Result<(FileStats, Vec<String>)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let deduped = process_lines(content.lines());
    persist::write_atomic(path, &deduped.to_content())?;

    info!(
        "{}: {} -> {} lines ({} removed, {:.1}% reduction)",
        path.display(),
        deduped.stats.original,
        deduped.stats.final_count,
        deduped.stats.removed,
        deduped.stats.compression_ratio()
    );
    Ok((deduped.stats, deduped.rules))
}

/// Find all `.txt` list files under `dir`, recursively, in stable order.
pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "txt"))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_comments_attached_to_survivors() {
        let lines = [
            "! Header line 1",
            "! Header line 2",
            "rule1.com",
            "! Comment for rule2",
            "rule2.com",
            "! Comment for rule3",
            "rule3.com",
            "! Another comment for rule3",
            "rule3.com",
            "! Comment for rule4",
            "rule4.com",
        ];

        let deduped = process_lines(lines);

        assert_eq!(deduped.headers, vec!["! Header line 1", "! Header line 2"]);
        // The duplicate rule3.com is dropped along with its preceding
        // comment; every surviving comment stays glued to its rule.
        assert_eq!(
            deduped.body,
            vec![
                "rule1.com",
                "! Comment for rule2",
                "rule2.com",
                "! Comment for rule3",
                "rule3.com",
                "! Comment for rule4",
                "rule4.com",
            ]
        );
    }

    #[test]
    fn test_survivors_are_sorted_by_rule_text() {
        let lines = ["zeta.com", "alpha.com", "! note", "mid.com"];
        let deduped = process_lines(lines);
        assert_eq!(deduped.rules, vec!["alpha.com", "mid.com", "zeta.com"]);
        assert_eq!(
            deduped.body,
            vec!["alpha.com", "! note", "mid.com", "zeta.com"]
        );
    }

    #[test]
    fn test_invalid_rules_discard_their_comments() {
        let lines = [
            "rule1.com",
            "! comment for a broken rule",
            "||not a domain^",
            "rule2.com",
        ];
        let deduped = process_lines(lines);
        assert_eq!(deduped.body, vec!["rule1.com", "rule2.com"]);
    }

    #[test]
    fn test_stats_accounting() {
        let lines = ["! header", "", "b.com", "a.com", "b.com"];
        let deduped = process_lines(lines);
        assert_eq!(deduped.stats.original, 5);
        assert_eq!(deduped.stats.headers, 2); // "! header" and the blank
        assert_eq!(deduped.stats.final_count, 4);
        assert_eq!(deduped.stats.removed, 1);
        assert!((deduped.stats.compression_ratio() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_final_count_is_headers_plus_unique_rules() {
        let lines = ["! h", "x.com", "y.com", "x.com", "||bogus^"];
        let deduped = process_lines(lines);
        assert_eq!(
            deduped.stats.final_count,
            deduped.stats.headers + deduped.rules.len()
        );
        assert_eq!(deduped.rules.len(), 2);
    }

    #[test]
    fn test_idempotent() {
        let lines = [
            "! Header",
            "",
            "b.example.com",
            "! note",
            "a.example.com",
            "b.example.com",
        ];
        let first = process_lines(lines);
        let content = first.to_content();
        let second = process_lines(content.lines());
        assert_eq!(second.stats.removed, 0);
        assert_eq!(second.to_content(), content);
    }

    #[test]
    fn test_dedupe_file_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("list.txt");
        std::fs::write(&path, "! Title\nb.com\na.com\nb.com\n").unwrap();

        let (stats, rules) = dedupe_file(&path).unwrap();
        assert_eq!(stats.removed, 1);
        assert_eq!(rules, vec!["a.com", "b.com"]);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "! Title\na.com\nb.com\n"
        );
    }

    #[test]
    fn test_list_files_recursive_and_sorted() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::write(dir.path().join("sub/c.txt"), "").unwrap();
        std::fs::write(dir.path().join("notes.md"), "").unwrap();

        let files = list_files(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub/c.txt"]);
    }
}
