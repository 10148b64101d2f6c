//! End-to-end tests for the consolidation commands over real directories.

use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn read(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).unwrap()
}

#[test]
fn test_dedupe_command_rewrites_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "one.txt",
        "! Title: One\n\nzeta.example.com\n! keep me\nalpha.example.com\nzeta.example.com\n",
    );
    write(dir.path(), "two.txt", "beta.example.com\nbeta.example.com\n");

    admirror::commands::dedupe::run(dir.path()).unwrap();

    let one = read(dir.path(), "one.txt");
    assert_eq!(
        one,
        "! Title: One\n\n! keep me\nalpha.example.com\nzeta.example.com\n"
    );
    assert_eq!(read(dir.path(), "two.txt"), "beta.example.com\n");

    // A second run must be a no-op.
    admirror::commands::dedupe::run(dir.path()).unwrap();
    assert_eq!(read(dir.path(), "one.txt"), one);
}

#[test]
fn test_dedupe_command_requires_list_files() {
    let dir = TempDir::new().unwrap();
    assert!(admirror::commands::dedupe::run(dir.path()).is_err());
    assert!(admirror::commands::dedupe::run(&dir.path().join("missing")).is_err());
}

#[test]
fn test_migrate_command_end_to_end() {
    let dir = TempDir::new().unwrap();
    let adblock = dir.path().join("adblock");
    let hostlist = dir.path().join("hostlist");
    std::fs::create_dir_all(&adblock).unwrap();
    std::fs::create_dir_all(&hostlist).unwrap();

    write(
        &adblock,
        "generic.txt",
        "! Header\n||ads.example.com^\ntracker-domain.example.org\nsub.example.com\n",
    );
    write(&adblock, "Spotify-sources.txt", "cdn.audio.example.com\n");
    write(&hostlist, "Other.txt", "already.known.example.net\n");

    admirror::commands::migrate::run(dir.path()).unwrap();

    // Filter syntax stays in the source; pure domains moved out.
    assert_eq!(read(&adblock, "generic.txt"), "! Header\n||ads.example.com^\n");
    assert_eq!(read(&adblock, "Spotify-sources.txt"), "");

    assert_eq!(read(&hostlist, "Ads.txt"), "tracker-domain.example.org\n");
    assert_eq!(
        read(&hostlist, "Other.txt"),
        "already.known.example.net\nsub.example.com\n"
    );
    assert_eq!(read(&hostlist, "Spotify.txt"), "cdn.audio.example.com\n");
}

#[test]
fn test_migrate_then_dedupe_leaves_a_stable_corpus() {
    let dir = TempDir::new().unwrap();
    let adblock = dir.path().join("adblock");
    let hostlist = dir.path().join("hostlist");
    std::fs::create_dir_all(&adblock).unwrap();
    std::fs::create_dir_all(&hostlist).unwrap();

    write(
        &adblock,
        "mixed.txt",
        "||keep.example.com^\nb.tracker.example.com\na.tracker.example.com\n||keep.example.com^\n",
    );

    admirror::commands::migrate::run(dir.path()).unwrap();
    admirror::commands::dedupe::run(dir.path()).unwrap();

    assert_eq!(read(&adblock, "mixed.txt"), "||keep.example.com^\n");
    assert_eq!(
        read(&hostlist, "Ads.txt"),
        "a.tracker.example.com\nb.tracker.example.com\n"
    );

    // Re-running either pass changes nothing further.
    admirror::commands::migrate::run(dir.path()).unwrap();
    admirror::commands::dedupe::run(dir.path()).unwrap();
    assert_eq!(read(&adblock, "mixed.txt"), "||keep.example.com^\n");
    assert_eq!(
        read(&hostlist, "Ads.txt"),
        "a.tracker.example.com\nb.tracker.example.com\n"
    );
}

#[test]
fn test_audit_command_is_read_only() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", "x.example.com\ny.example.com\n");
    write(dir.path(), "b.txt", "x.example.com\n");
    write(dir.path(), "c.txt", "y.example.com\nz.example.com\n");

    admirror::commands::audit::run(dir.path()).unwrap();

    assert_eq!(read(dir.path(), "a.txt"), "x.example.com\ny.example.com\n");
    assert_eq!(read(dir.path(), "b.txt"), "x.example.com\n");
    assert_eq!(read(dir.path(), "c.txt"), "y.example.com\nz.example.com\n");
}

#[tokio::test]
async fn test_update_command_bootstraps_template_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("sources.json");
    let output_dir = dir.path().join("mirror");

    // First run writes a template and stops without fetching anything.
    admirror::commands::update::run(&config_path, &output_dir, 2, None, None)
        .await
        .unwrap();

    assert!(config_path.exists());
    let config = admirror::SourcesConfig::load(&config_path).unwrap();
    assert_eq!(config.sources.len(), 2);
    assert!(config.sources.iter().all(|s| s.enabled));
    assert!(config.sources.iter().all(|s| !s.skip_checksum));
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_update_command_fails_when_a_source_fails() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("sources.json");
    let output_dir = dir.path().join("mirror");

    // A port that refuses connections: the single source fails, so the
    // command must fail while still writing the metadata record.
    let config = r#"{"sources": [{"url": "http://127.0.0.1:1/list.txt", "filename": "list.txt"}]}"#;
    std::fs::write(&config_path, config).unwrap();

    let result = admirror::commands::update::run(&config_path, &output_dir, 2, None, None).await;
    assert!(result.is_err());

    let metadata = read(&output_dir, admirror::metadata::METADATA_FILE);
    let parsed: admirror::metadata::RunMetadata = serde_json::from_str(&metadata).unwrap();
    assert_eq!(parsed.sources.len(), 1);
    assert!(!parsed.sources[0].success);
}

#[tokio::test]
async fn test_update_command_with_only_disabled_sources_is_ok() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("sources.json");
    let output_dir = dir.path().join("mirror");

    let config = r#"{"sources": [{"url": "http://127.0.0.1:1/list.txt", "enabled": false}]}"#;
    std::fs::write(&config_path, config).unwrap();

    // Disabled sources are never fetched; an empty selection is not an error.
    admirror::commands::update::run(&config_path, &output_dir, 2, None, None)
        .await
        .unwrap();
}
