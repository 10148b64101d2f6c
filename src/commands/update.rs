//! Update command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::config::{ConfigState, Source, SourcesConfig};
use crate::fetcher::Fetcher;
use crate::lock::LockGuard;
use crate::metadata::RunMetadata;

/// Run the update command: fetch every selected enabled source, write the
/// run metadata, and fail the process when any source failed.
pub async fn run(
    config_path: &Path,
    output_dir: &Path,
    max_concurrent: usize,
    filter: Option<String>,
    lint: Option<String>,
) -> Result<()> {
    let config = match SourcesConfig::load_or_init(config_path)? {
        ConfigState::CreatedTemplate => {
            info!(
                "No config found; wrote a template to {}. Edit it and re-run.",
                config_path.display()
            );
            return Ok(());
        }
        ConfigState::Loaded(config) => config,
    };

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output dir {}", output_dir.display()))?;
    let _lock = LockGuard::acquire(output_dir)?;

    let selected: Vec<Source> = config
        .sources
        .into_iter()
        .filter(|s| s.enabled)
        .filter(|s| matches_filter(s, filter.as_deref()))
        .collect();

    if selected.is_empty() {
        warn!("No sources selected. Check your configuration and filter.");
        return Ok(());
    }

    info!("Fetching {} lists...", selected.len());
    let fetcher = Fetcher::new(output_dir)?;
    let outcomes = fetcher.fetch_all(&selected, max_concurrent).await;

    let metadata = RunMetadata::new(outcomes);
    metadata.save(output_dir)?;

    let total = metadata.sources.len();
    let failed = metadata.failure_count();
    info!(
        "Fetched {}/{} lists successfully",
        metadata.success_count(),
        total
    );

    if let Some(lint_cmd) = lint {
        run_lint(&lint_cmd, output_dir).await;
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {total} sources failed");
    }
    Ok(())
}

/// Substring filter over the source URL and resolved filename.
fn matches_filter(source: &Source, filter: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(needle) => {
            source.url.contains(needle) || source.resolved_filename().contains(needle)
        }
    }
}

/// Run an external lint command with the output directory as its argument.
/// Lint findings are advisory; they never change the exit code.
async fn run_lint(lint_cmd: &str, output_dir: &Path) {
    info!("Running lint step: {lint_cmd} {}", output_dir.display());
    match tokio::process::Command::new(lint_cmd)
        .arg(output_dir)
        .status()
        .await
    {
        Ok(status) if status.success() => info!("Lint step passed"),
        Ok(status) => warn!("Lint step exited with {status}"),
        Err(e) => warn!("Failed to run lint command {lint_cmd:?}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(url: &str, filename: Option<&str>) -> Source {
        Source {
            url: url.to_string(),
            filename: filename.map(str::to_string),
            skip_checksum: false,
            enabled: true,
        }
    }

    #[test]
    fn test_matches_filter() {
        let s = source("https://easylist.to/easylist/easylist.txt", Some("EasyList"));
        assert!(matches_filter(&s, None));
        assert!(matches_filter(&s, Some("easylist.to")));
        assert!(matches_filter(&s, Some("EasyList")));
        assert!(!matches_filter(&s, Some("adguard")));
    }
}
