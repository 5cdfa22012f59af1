//! Layered configuration that is fully rebuilt on every reload.
//!
//! This is the typical reload target for a [`FileWatcher`](crate::watcher::FileWatcher):
//! instead of applying the changed file on its own, each reload re-evaluates
//! defaults, the file, environment variables and explicit overrides in
//! precedence order.

mod builder;
mod handle;

pub use builder::LayeredConfigBuilder;
pub use handle::LayeredConfig;

use crate::error::{Result, WatchError};
use crate::watcher::DEFAULT_DEBOUNCE;
use config::{Environment, File};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;

/// The configuration layers, lowest precedence first.
#[derive(Debug)]
pub(crate) struct Layers {
    pub(crate) defaults: Vec<(String, config::Value)>,
    pub(crate) file: Option<PathBuf>,
    pub(crate) env: Option<(String, String)>,
    pub(crate) overrides: Vec<(String, config::Value)>,
    pub(crate) debounce: Duration,
}

impl Default for Layers {
    fn default() -> Self {
        Self {
            defaults: Vec::new(),
            file: None,
            env: None,
            overrides: Vec::new(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl Layers {
    /// Merge all layers and deserialize the result.
    pub(crate) fn load<T: DeserializeOwned>(&self) -> Result<T> {
        let mut builder = config::Config::builder();

        for (key, value) in &self.defaults {
            builder = builder
                .set_default(key.as_str(), value.clone())
                .map_err(|e| WatchError::Load(format!("Invalid default '{}': {}", key, e)))?;
        }

        if let Some(path) = &self.file {
            builder = builder.add_source(File::from(path.clone()).required(true));
        }

        if let Some((prefix, separator)) = &self.env {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator(separator)
                    .try_parsing(true),
            );
        }

        for (key, value) in &self.overrides {
            builder = builder
                .set_override(key.as_str(), value.clone())
                .map_err(|e| WatchError::Load(format!("Invalid override '{}': {}", key, e)))?;
        }

        let merged = builder
            .build()
            .map_err(|e| WatchError::Load(format!("Failed to build configuration: {}", e)))?;

        merged
            .try_deserialize::<T>()
            .map_err(|e| WatchError::Deserialize(e.to_string()))
    }
}
