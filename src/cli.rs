//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::fetcher::DEFAULT_MAX_CONCURRENT;

#[derive(Parser)]
#[command(name = "admirror")]
#[command(author, version, about = "Adblock filter-list mirror and consolidation tool")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every enabled source and refresh the mirrored lists
    Update {
        /// Sources config file (a template is created if missing)
        #[arg(short, long, default_value = "sources.json")]
        config: PathBuf,

        /// Directory the mirrored lists are written to
        #[arg(short, long, default_value = "lists/mirror")]
        output_dir: PathBuf,

        /// Maximum number of concurrent downloads
        #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT)]
        max_concurrent: usize,

        /// Only fetch sources whose URL or filename contains this substring
        #[arg(long)]
        filter: Option<String>,

        /// External lint command to run over the output directory afterwards
        #[arg(long)]
        lint: Option<String>,
    },

    /// Deduplicate entries inside every list file under a directory
    Dedupe {
        /// Directory scanned recursively for .txt list files
        lists_dir: PathBuf,
    },

    /// Move pure-domain entries from adblock lists into category hostlists
    Migrate {
        /// Directory containing adblock/ and hostlist/ subdirectories
        lists_dir: PathBuf,
    },

    /// Report entries appearing in more than one list file (read-only)
    Audit {
        /// Directory scanned recursively for .txt list files
        lists_dir: PathBuf,
    },

    /// Show version information
    Version,
}
