//! Rule line classification and the domain grammars.
//!
//! Two domain grammars are deliberately kept apart:
//!
//! - [`is_valid_domain`] is the lenient grammar used to validate the domain
//!   embedded in `||`/`@@||` rules and to recognize existing entries in
//!   hostlist files. It accepts `example.com`.
//! - [`is_pure_domain`] is the strict grammar used by the migration engine.
//!   It additionally requires at least two dots, so `example.com` is not
//!   migrated while `sub.example.com` is. Relaxing this is a deliberate
//!   behavior change, not a fix.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum accepted length of a single rule line, in bytes.
pub const MAX_RULE_LEN: usize = 2048;

/// AdGuard/uBlock syntax indicator tokens. A line containing any of these
/// is filter syntax, never a pure domain.
pub const FILTER_INDICATORS: &[&str] = &[
    "||", "##", "#@#", "#?#", "@@", "$", "^", "*", "!", "[", "]", "~", "|",
];

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[a-z0-9](?:[-a-z0-9]*[a-z0-9])?(?:\.[a-z0-9](?:[-a-z0-9]*[a-z0-9])?)*\.[a-z]{2,}$",
    )
    .expect("domain regex is valid")
});

static PURE_DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[a-z0-9](?:[-a-z0-9]*[a-z0-9])?(?:\.[a-z0-9](?:[-a-z0-9]*[a-z0-9])?)+\.[a-z]{2,}$",
    )
    .expect("pure domain regex is valid")
});

/// Check a string against the lenient domain grammar: dot-separated labels
/// of letters, digits and inner hyphens, alphabetic top label of at least
/// two characters.
pub fn is_valid_domain(s: &str) -> bool {
    DOMAIN_RE.is_match(s)
}

/// True if the line contains any filter-syntax indicator token.
pub fn has_filter_syntax(line: &str) -> bool {
    FILTER_INDICATORS.iter().any(|t| line.contains(t))
}

/// True if the line is a pure domain entry: no filter syntax, no
/// comment/section lead character, and a match for the strict domain
/// grammar (two or more dots).
pub fn is_pure_domain(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return false;
    }
    if line.starts_with(['!', '#', '[', ';', '|', '@', '$', '^', '*', ']', '~']) {
        return false;
    }
    if has_filter_syntax(line) {
        return false;
    }
    PURE_DOMAIN_RE.is_match(line)
}

/// True if the line has the shape of a header/comment line: empty, `! `,
/// `#`, `[` or `;`. Whether it actually *is* a header depends on position
/// in the file; see [`Classifier`].
pub fn is_comment_shaped(line: &str) -> bool {
    line.is_empty() || line.starts_with("! ") || line.starts_with(['#', '[', ';'])
}

/// Classification of a single list-file line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// Comment-shaped line inside the leading header region.
    Header,
    /// Comment-shaped line after the body has started; belongs to the next
    /// surviving rule entry.
    Comment,
    /// A body rule entry. `domain` is populated for `||`/`@@||` rules.
    Rule {
        text: String,
        domain: Option<String>,
    },
    /// Oversized entry or a block rule with an invalid embedded domain.
    Invalid,
}

/// Stateful line classifier.
///
/// Lines are classified as [`LineClass::Header`] only while still inside
/// the leading header region; the first body line switches the classifier
/// out of header mode for good, after which comment-shaped lines become
/// [`LineClass::Comment`].
#[derive(Debug)]
pub struct Classifier {
    in_header: bool,
}

impl Classifier {
    pub fn new() -> Self {
        Self { in_header: true }
    }

    /// Whether the classifier is still inside the leading header region.
    pub fn in_header(&self) -> bool {
        self.in_header
    }

    /// Classify one line. `line` is expected to be right-trimmed.
    pub fn classify(&mut self, line: &str) -> LineClass {
        if is_comment_shaped(line) {
            return if self.in_header {
                LineClass::Header
            } else {
                LineClass::Comment
            };
        }

        self.in_header = false;

        if line.len() > MAX_RULE_LEN {
            return LineClass::Invalid;
        }

        if let Some(rest) = line.strip_prefix("@@||").or_else(|| line.strip_prefix("||")) {
            // The embedded domain ends at the first `^` or `$` separator.
            let domain = rest.split(['^', '$']).next().unwrap_or("");
            if is_valid_domain(domain) {
                LineClass::Rule {
                    text: line.to_string(),
                    domain: Some(domain.to_ascii_lowercase()),
                }
            } else {
                LineClass::Invalid
            }
        } else {
            LineClass::Rule {
                text: line.to_string(),
                domain: None,
            }
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
