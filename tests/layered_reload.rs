//! Integration tests for layered configuration reloaded by a file watch.

#![allow(unsafe_code)] // For env var manipulation in tests

use hotswap_watch::prelude::*;
use serde::Deserialize;
use std::env;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::{sleep, timeout};

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct AppConfig {
    server: ServerConfig,
    log_level: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct ServerConfig {
    port: u16,
    host: String,
}

const SETTLE: Duration = Duration::from_millis(150);
const WAIT: Duration = Duration::from_secs(3);

async fn wait_for_reloads(config: &LayeredConfig<AppConfig>, count: u64) {
    timeout(WAIT, async {
        while config.reload_count() < count {
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("timed out waiting for reload");
}

#[tokio::test]
async fn test_file_change_reloads_whole_stack() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(
        &config_path,
        r#"
server:
  port: 8080
  host: localhost
log_level: info
"#,
    )
    .unwrap();

    unsafe {
        env::set_var("TEST_HSW_LAYERED_SERVER__HOST", "env.local");
    }

    let config = LayeredConfig::builder()
        .with_file(&config_path)
        .with_env_overrides("TEST_HSW_LAYERED", "__")
        .with_override("log_level", "debug")
        .build::<AppConfig>()
        .await
        .unwrap();

    assert_eq!(config.get().server.port, 8080);
    assert_eq!(config.get().server.host, "env.local");
    assert_eq!(config.get().log_level, "debug");

    let cancel = CancellationToken::new();
    let task = tokio::spawn({
        let config = config.clone();
        let cancel = cancel.clone();
        async move { config.watch(cancel).await }
    });

    sleep(SETTLE).await;
    // Stage and rename so the reload never observes a half-written file.
    let staged = temp_dir.path().join(".config.yaml.tmp");
    fs::write(
        &staged,
        r#"
server:
  port: 9090
  host: file.local
log_level: warn
"#,
    )
    .unwrap();
    fs::rename(&staged, &config_path).unwrap();

    wait_for_reloads(&config, 1).await;

    let cfg = config.get();
    assert_eq!(cfg.server.port, 9090); // From the new file
    assert_eq!(cfg.server.host, "env.local"); // Env still wins
    assert_eq!(cfg.log_level, "debug"); // Override still wins

    cancel.cancel();
    assert!(timeout(WAIT, task).await.unwrap().unwrap().is_ok());

    unsafe {
        env::remove_var("TEST_HSW_LAYERED_SERVER__HOST");
    }
}

#[tokio::test]
async fn test_invalid_file_stops_watch_and_keeps_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(
        &config_path,
        "server:\n  port: 8080\n  host: localhost\nlog_level: info\n",
    )
    .unwrap();

    let config = LayeredConfig::builder()
        .with_file(&config_path)
        .build::<AppConfig>()
        .await
        .unwrap();

    let task = tokio::spawn({
        let config = config.clone();
        async move { config.watch(CancellationToken::new()).await }
    });

    sleep(SETTLE).await;
    fs::write(&config_path, "server:\n  port: not-a-port\n").unwrap();

    let err = timeout(WAIT, task).await.unwrap().unwrap().unwrap_err();
    assert!(matches!(err, WatchError::Reload(_)));
    assert_eq!(config.get().server.port, 8080);
}
