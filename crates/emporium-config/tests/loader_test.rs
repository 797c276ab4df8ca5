//! Layered loading against real files on disk.

use emporium_config::{CacheBackendKind, CacheFallback, ConfigLoader};
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, body: &str) {
    fs::write(dir.path().join(name), body).unwrap();
}

fn dir_str(dir: &TempDir) -> String {
    dir.path().to_string_lossy().into_owned()
}

#[tokio::test]
async fn loads_default_layer() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "default.toml",
        r#"
[database]
url = "memory:"

[cache]
backend = "memory"
fallback = "disabled"
operation_timeout_ms = 100
"#,
    );

    let loader = ConfigLoader::for_environment(dir_str(&dir), "test").unwrap();
    let config = loader.get().await;

    assert!(config.database.is_in_memory());
    assert_eq!(config.cache.backend, CacheBackendKind::Memory);
    assert_eq!(config.cache.fallback, CacheFallback::Disabled);
    assert_eq!(config.cache.operation_timeout_ms, 100);
    assert_eq!(config.app.environment, "test");
    // untouched fields keep their defaults
    assert_eq!(config.cache.pool_size, 10);
}

#[tokio::test]
async fn environment_layer_overrides_default() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "default.toml",
        r#"
[cache]
backend = "redis"
redis_url = "redis://cache:6379"
"#,
    );
    write(
        &dir,
        "staging.toml",
        r#"
[cache]
backend = "disabled"

[observability]
log_format = "json"
"#,
    );

    let loader = ConfigLoader::for_environment(dir_str(&dir), "staging").unwrap();
    let config = loader.get().await;

    assert_eq!(config.cache.backend, CacheBackendKind::Disabled);
    assert_eq!(config.cache.redis_url, "redis://cache:6379");
    assert!(config.observability.is_json());
}

#[tokio::test]
async fn invalid_layer_is_rejected() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "default.toml",
        r#"
[cache]
operation_timeout_ms = 0
"#,
    );

    assert!(ConfigLoader::for_environment(dir_str(&dir), "test").is_err());
}

#[tokio::test]
async fn reload_picks_up_changes() {
    let dir = TempDir::new().unwrap();
    write(&dir, "default.toml", "[cache]\nbackend = \"memory\"\n");
    let loader = ConfigLoader::for_environment(dir_str(&dir), "test").unwrap();
    assert_eq!(loader.get().await.cache.backend, CacheBackendKind::Memory);

    write(&dir, "default.toml", "[cache]\nbackend = \"disabled\"\n");
    loader.reload().await.unwrap();

    assert_eq!(loader.get().await.cache.backend, CacheBackendKind::Disabled);
    let backend: Option<String> = loader.get_value("cache.backend").await;
    assert_eq!(backend.as_deref(), Some("disabled"));
}
