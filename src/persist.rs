//! Atomic file persistence.
//!
//! Destination files are replaced via a temporary file created in the
//! destination's own directory followed by a rename, so the rename never
//! crosses a filesystem boundary and readers never observe a partially
//! written file. On any error the destination is left untouched and the
//! temporary file is removed.

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::PipelineError;

/// Minimum plausible size for a downloaded list, in bytes. Anything
/// shorter is treated as a truncated or bogus download.
pub const MIN_DOWNLOAD_SIZE: usize = 64;

/// Atomically replace `dest` with `content`.
pub fn write_atomic(dest: &Path, content: &str) -> Result<(), PipelineError> {
    let dir = dest.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or_else(|| Path::new("."));

    let persist_err = |e: std::io::Error| PipelineError::Persistence {
        path: dest.display().to_string(),
        source: e,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(persist_err)?;
    tmp.write_all(content.as_bytes()).map_err(persist_err)?;
    tmp.as_file().sync_all().map_err(persist_err)?;
    // On rename failure the temp file travels back inside the error and is
    // removed when it drops.
    tmp.persist(dest).map_err(|e| persist_err(e.error))?;

    debug!("Wrote {} bytes to {}", content.len(), dest.display());
    Ok(())
}

/// Reject suspiciously small downloads before they reach persistence,
/// even if their checksum passed.
pub fn check_min_size(content: &str, name: &str) -> Result<(), PipelineError> {
    if content.len() < MIN_DOWNLOAD_SIZE {
        return Err(PipelineError::Validation {
            name: name.to_string(),
            reason: format!(
                "downloaded content is only {} bytes (minimum {MIN_DOWNLOAD_SIZE})",
                content.len()
            ),
        });
    }
    Ok(())
}
