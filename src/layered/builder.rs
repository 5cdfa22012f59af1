//! Builder for constructing LayeredConfig instances.

use super::handle::Validator;
use super::{LayeredConfig, Layers};
use crate::error::{Result, WatchError};
use serde::de::DeserializeOwned;
use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Type alias for type-erased validators held until `build` knows `T`.
type AnyValidator = Arc<dyn Fn(&dyn Any) -> std::result::Result<(), String> + Send + Sync>;

/// Builder for a [`LayeredConfig`].
///
/// Layers are merged lowest precedence first: defaults, the file,
/// environment variables, then explicit overrides.
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
///     .with_default("port", 8080i64)
///     .with_file("config/app.yaml")
///     .with_env_overrides("APP", "__")
///     .build::<AppConfig>()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct LayeredConfigBuilder {
    layers: Layers,
    validator: Option<AnyValidator>,
}

impl LayeredConfigBuilder {
    /// Create a new builder with no layers.
    pub fn new() -> Self {
        Self {
            layers: Layers::default(),
            validator: None,
        }
    }

    /// Set the configuration file. Its format is detected from the extension
    /// (`.yaml`, `.yml`, `.toml`, `.json`).
    ///
    /// This is also the file [`LayeredConfig::watch`] watches.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.layers.file = Some(path.into());
        self
    }

    /// Add a default value, used when no other layer sets `key`.
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<config::Value>) -> Self {
        self.layers.defaults.push((key.into(), value.into()));
        self
    }

    /// Read environment variables with the given prefix.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix for environment variables (e.g., "APP")
    /// * `separator` - Separator for nested keys (e.g., "__" for APP_DB__HOST)
    pub fn with_env_overrides(mut self, prefix: &str, separator: &str) -> Self {
        self.layers.env = Some((prefix.to_string(), separator.to_string()));
        self
    }

    /// Add an override that beats every other layer, such as a value given on
    /// the command line.
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<config::Value>) -> Self {
        self.layers.overrides.push((key.into(), value.into()));
        self
    }

    /// Set the debounce window used by [`LayeredConfig::watch`].
    pub fn with_watch_debounce(mut self, debounce: Duration) -> Self {
        self.layers.debounce = debounce;
        self
    }

    /// Add a validation function that every loaded configuration must pass,
    /// both at build time and on each reload.
    pub fn with_validation<F, T>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<(), String> + Send + Sync + 'static,
        T: 'static,
    {
        self.validator = Some(Arc::new(move |config: &dyn Any| {
            let typed = config
                .downcast_ref::<T>()
                .ok_or_else(|| "Type mismatch in validator".to_string())?;
            validator(typed)
        }));
        self
    }

    /// Perform the initial load and build the handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial load, deserialization or validation
    /// fails.
    pub async fn build<T>(self) -> Result<LayeredConfig<T>>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let initial: T = self.layers.load()?;

        let validator: Option<Validator<T>> = self.validator.map(|v| {
            Arc::new(move |config: &T| v(config as &dyn Any)) as Validator<T>
        });

        if let Some(validator) = &validator {
            validator(&initial).map_err(WatchError::Validation)?;
        }

        Ok(LayeredConfig::new(initial, self.layers, validator))
    }
}

impl Default for LayeredConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LayeredConfig<()> {
    /// Create a new builder for a layered configuration.
    pub fn builder() -> LayeredConfigBuilder {
        LayeredConfigBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TestConfig {
        port: u16,
    }

    #[test]
    fn test_builder_accumulates_layers() {
        let builder = LayeredConfigBuilder::new()
            .with_file("config.yaml")
            .with_default("port", 8080i64)
            .with_override("port", 9090i64)
            .with_env_overrides("APP", "__")
            .with_watch_debounce(Duration::from_millis(20));

        assert_eq!(builder.layers.file, Some(PathBuf::from("config.yaml")));
        assert_eq!(builder.layers.defaults.len(), 1);
        assert_eq!(builder.layers.overrides.len(), 1);
        assert_eq!(
            builder.layers.env,
            Some(("APP".to_string(), "__".to_string()))
        );
        assert_eq!(builder.layers.debounce, Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_build_from_defaults() {
        let config = LayeredConfigBuilder::new()
            .with_default("port", 8080i64)
            .build::<TestConfig>()
            .await
            .unwrap();
        assert_eq!(config.get().port, 8080);
    }

    #[tokio::test]
    async fn test_build_rejected_by_validator() {
        let result = LayeredConfigBuilder::new()
            .with_default("port", 80i64)
            .with_validation(|c: &TestConfig| {
                if c.port < 1024 {
                    return Err("port must be >= 1024".to_string());
                }
                Ok(())
            })
            .build::<TestConfig>()
            .await;

        assert!(matches!(result, Err(WatchError::Validation(_))));
    }
}
