//! # admirror - Adblock Filter-List Mirror & Consolidation Tool
//!
//! Maintains a corpus of adblock filter-list files: periodically refreshed
//! from remote sources, kept duplicate-free and internally consistent.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       admirror                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: update, dedupe, migrate, audit             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_json)                                        │
//! │    └── sources.json with first-run template bootstrap       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls)                                 │
//! │    └── bounded-concurrency streamed downloads               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Checksum (md5 + base64)                                    │
//! │    └── Adblock Plus checksum header validation              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Persist (tempfile)                                         │
//! │    └── atomic same-directory replace, min-size gate         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Dedupe / Audit / Migrate                                   │
//! │    └── in-file dedup, cross-file report, domain routing     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fetching is the only concurrent stage; consolidation runs sequentially,
//! file at a time, under an advisory directory lock. No failure in one
//! source or file aborts the rest of a batch: only a missing or malformed
//! configuration is fatal for a run.
//!
//! ## Modules
//!
//! - [`audit`] - cross-file duplicate detection (read-only)
//! - [`checksum`] - Adblock Plus checksum header validation
//! - [`cli`] - command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - sources configuration and template bootstrap
//! - [`dedupe`] - in-file deduplication
//! - [`error`] - pipeline error taxonomy
//! - [`fetcher`] - concurrent HTTP downloads
//! - [`lock`] - advisory locking for corpus directories
//! - [`metadata`] - per-run metadata record
//! - [`migrate`] - pure-domain migration into category hostlists
//! - [`persist`] - atomic file persistence
//! - [`rules`] - line classification and domain grammars

pub mod audit;
pub mod checksum;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod fetcher;
pub mod lock;
pub mod metadata;
pub mod migrate;
pub mod persist;
pub mod rules;

pub use cli::{Cli, Commands};
pub use config::{ConfigState, Source, SourcesConfig};
pub use error::PipelineError;
