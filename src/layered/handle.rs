//! The layered configuration handle.

use super::Layers;
use crate::error::{Result, WatchError};
use crate::watcher::FileWatcher;
use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Type alias for validator functions.
pub(crate) type Validator<T> = Arc<dyn Fn(&T) -> std::result::Result<(), String> + Send + Sync>;

/// Configuration rebuilt from every layer on each reload.
///
/// Reads are lock-free (`arc-swap`). A reload re-reads the file, the
/// environment and the explicit overrides together, so a value set by an
/// override or an environment variable keeps winning over the file no matter
/// how often the file changes.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_watch::prelude::*;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// # async fn example() -> Result<()> {
/// let config = LayeredConfig::builder()
///     .with_file("config.yaml")
///     .with_env_overrides("APP", "__")
///     .with_override("port", 9090i64)
///     .build::<AppConfig>()
///     .await?;
///
/// let cancel = CancellationToken::new();
/// tokio::spawn({
///     let config = config.clone();
///     let cancel = cancel.clone();
///     async move { config.watch(cancel).await }
/// });
///
/// println!("port: {}", config.get().port);
/// # Ok(())
/// # }
/// ```
pub struct LayeredConfig<T> {
    current: Arc<ArcSwap<T>>,
    layers: Arc<Layers>,
    validator: Option<Validator<T>>,
    reloads: Arc<AtomicU64>,
}

impl<T> LayeredConfig<T> {
    pub(crate) fn new(initial: T, layers: Layers, validator: Option<Validator<T>>) -> Self {
        Self {
            current: Arc::new(ArcSwap::new(Arc::new(initial))),
            layers: Arc::new(layers),
            validator,
            reloads: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get a reference-counted handle to the current configuration.
    pub fn get(&self) -> Arc<T> {
        self.current.load_full()
    }

    /// Number of successful reloads since the handle was built.
    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::Relaxed)
    }

    /// Rebuild the configuration from all layers.
    ///
    /// If loading or validation fails, the current value is kept and the
    /// error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Load`], [`WatchError::Deserialize`] or
    /// [`WatchError::Validation`].
    pub async fn reload(&self) -> Result<()>
    where
        T: DeserializeOwned,
    {
        let candidate: T = self.layers.load()?;

        if let Some(validator) = &self.validator {
            if let Err(reason) = validator(&candidate) {
                warn!(reason = %reason, "Rejected reloaded configuration");
                return Err(WatchError::Validation(reason));
            }
        }

        self.current.store(Arc::new(candidate));
        self.reloads.fetch_add(1, Ordering::Relaxed);
        debug!("Configuration reloaded");
        Ok(())
    }

    /// Reload whenever the configuration file changes, until cancelled.
    ///
    /// A failed reload ends the watch with [`WatchError::Reload`]; the last
    /// good configuration stays in place.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Load`] if no file layer was configured, and
    /// otherwise any error from [`FileWatcher::watch`].
    pub async fn watch(&self, cancel: CancellationToken) -> Result<()>
    where
        T: DeserializeOwned,
    {
        let path = self
            .layers
            .file
            .as_ref()
            .ok_or_else(|| WatchError::Load("No configuration file to watch".to_string()))?;

        FileWatcher::new(path)
            .with_debounce(self.layers.debounce)
            .watch(cancel, move || self.reload())
            .await
    }
}

impl<T> Clone for LayeredConfig<T> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
            layers: Arc::clone(&self.layers),
            validator: self.validator.clone(),
            reloads: Arc::clone(&self.reloads),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestConfig {
        port: u16,
        host: String,
    }

    async fn build(path: &std::path::Path) -> LayeredConfig<TestConfig> {
        LayeredConfig::builder()
            .with_file(path)
            .with_override("host", "override.local")
            .build::<TestConfig>()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reload_keeps_override_precedence() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "port: 8080\nhost: file.local\n").unwrap();

        let config = build(&config_path).await;
        assert_eq!(config.get().port, 8080);
        assert_eq!(config.get().host, "override.local");

        fs::write(&config_path, "port: 9090\nhost: changed.local\n").unwrap();
        config.reload().await.unwrap();

        assert_eq!(config.get().port, 9090);
        assert_eq!(config.get().host, "override.local");
        assert_eq!(config.reload_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_old_value() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "port: 8080\nhost: file.local\n").unwrap();

        let config = build(&config_path).await;

        fs::write(&config_path, "port: not-a-number\n").unwrap();
        assert!(config.reload().await.is_err());
        assert_eq!(config.get().port, 8080);
        assert_eq!(config.reload_count(), 0);
    }

    #[tokio::test]
    async fn test_validator_rejects_reload() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "port: 8080\nhost: a\n").unwrap();

        let config = LayeredConfig::builder()
            .with_file(&config_path)
            .with_validation(|c: &TestConfig| {
                if c.port < 1024 {
                    return Err("port must be >= 1024".to_string());
                }
                Ok(())
            })
            .build::<TestConfig>()
            .await
            .unwrap();

        fs::write(&config_path, "port: 80\nhost: a\n").unwrap();
        let err = config.reload().await.unwrap_err();
        assert!(matches!(err, WatchError::Validation(_)));
        assert_eq!(config.get().port, 8080);
    }

    #[tokio::test]
    async fn test_watch_without_file() {
        let config = LayeredConfig::builder()
            .with_default("port", 8080i64)
            .with_default("host", "localhost")
            .build::<TestConfig>()
            .await
            .unwrap();

        let result = config.watch(CancellationToken::new()).await;
        assert!(matches!(result, Err(WatchError::Load(_))));
    }

    #[test]
    fn test_clone_shares_state() {
        let config = LayeredConfig::new(
            TestConfig {
                port: 1,
                host: "a".to_string(),
            },
            Layers::default(),
            None,
        );
        let config2 = config.clone();
        assert_eq!(config.get(), config2.get());
    }
}
