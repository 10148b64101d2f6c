//! Sources configuration: loading, validation and template bootstrap.

use anyhow::{Context, Result};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::PipelineError;

/// A single remote list source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Remote URL of the list.
    pub url: String,

    /// Target filename; derived from the URL when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Skip checksum validation for this source.
    #[serde(default)]
    pub skip_checksum: bool,

    /// Whether the source participates in fetch runs.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// The on-disk sources configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub sources: Vec<Source>,
}

/// Outcome of [`SourcesConfig::load_or_init`], distinguishing a loaded
/// config from a freshly created template.
#[derive(Debug)]
pub enum ConfigState {
    /// Existing config parsed and validated.
    Loaded(SourcesConfig),
    /// No config existed; a template was written for the operator to edit.
    CreatedTemplate,
}

impl SourcesConfig {
    /// Load and validate the configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: SourcesConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration, creating a template on first run.
    ///
    /// When `path` does not exist, a template with two example entries is
    /// written and [`ConfigState::CreatedTemplate`] is returned; the caller
    /// is expected to stop the run so the operator can edit the template.
    pub fn load_or_init<P: AsRef<Path>>(path: P) -> Result<ConfigState> {
        let path = path.as_ref();
        if path.exists() {
            return Ok(ConfigState::Loaded(Self::load(path)?));
        }

        let template = serde_json::to_string_pretty(&Self::template())
            .context("Failed to serialize template config")?;
        crate::persist::write_atomic(path, &format!("{template}\n"))?;
        info!("Created template config at {}", path.display());
        Ok(ConfigState::CreatedTemplate)
    }

    /// Template written on first run: two example entries the operator can
    /// keep or replace.
    pub fn template() -> Self {
        Self {
            sources: vec![
                Source {
                    url: "https://easylist.to/easylist/easylist.txt".to_string(),
                    filename: Some("EasyList.txt".to_string()),
                    skip_checksum: false,
                    enabled: true,
                },
                Source {
                    url: "https://filters.adtidy.org/extension/ublock/filters/2.txt".to_string(),
                    filename: Some("AdGuard-Base.txt".to_string()),
                    skip_checksum: false,
                    enabled: true,
                },
            ],
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        for source in &self.sources {
            if !source.url.starts_with("https://") && !source.url.starts_with("http://") {
                return Err(PipelineError::Config(format!(
                    "source URL must be http(s): {:?}",
                    source.url
                ))
                .into());
            }
        }
        Ok(())
    }
}

impl Source {
    /// Resolve the on-disk filename for this source.
    ///
    /// A configured name is sanitized to `[A-Za-z0-9_.-]` with `.txt`
    /// appended when absent. Without a name, a stable one is derived from
    /// the URL: the host (non-alphanumerics dashed) plus a 12-char URL
    /// hash. MD5 here is for stable naming only, not a security boundary.
    pub fn resolved_filename(&self) -> String {
        if let Some(name) = &self.filename {
            let safe: String = name
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
                        c
                    } else {
                        '-'
                    }
                })
                .collect();
            return if safe.ends_with(".txt") {
                safe
            } else {
                format!("{safe}.txt")
            };
        }

        let digest = Md5::digest(self.url.as_bytes());
        let mut hash = String::with_capacity(12);
        for byte in digest.iter().take(6) {
            hash.push_str(&format!("{byte:02x}"));
        }

        let host = self
            .url
            .split_once("://")
            .map(|(_, rest)| rest.split('/').next().unwrap_or(""))
            .unwrap_or("");
        if host.is_empty() {
            format!("list-{hash}.txt")
        } else {
            let host: String = host
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
                .collect();
            format!("{host}-{hash}.txt")
        }
    }
}
