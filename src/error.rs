//! Error types for the admirror pipeline.

use thiserror::Error;

/// Errors produced by the mirror and consolidation pipeline.
///
/// Only [`PipelineError::Config`] is fatal for a run. Every other variant
/// is scoped to a single source or file: it is logged, counted, and the
/// rest of the batch keeps going.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Transport-level failure (timeout, connection error, HTTP status).
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The declared checksum does not match the recomputed digest.
    #[error("Checksum mismatch in {name}: declared {declared}, computed {computed}")]
    Integrity {
        name: String,
        declared: String,
        computed: String,
    },

    /// The declared checksum cannot have been produced by the supported
    /// digest algorithm, so it can be neither confirmed nor refuted.
    #[error("Unverifiable checksum in {name}: {declared:?} is not an unpadded base64 MD5 digest")]
    UnverifiableChecksum { name: String, declared: String },

    /// Content failed a sanity check (e.g. suspiciously small download).
    #[error("Validation failed for {name}: {reason}")]
    Validation { name: String, reason: String },

    /// Writing or renaming the destination file failed.
    #[error("Persistence failed for {path}: {source}")]
    Persistence {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The sources configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),
}
