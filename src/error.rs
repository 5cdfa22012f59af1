//! Error types for hotswap-watch.

use std::path::PathBuf;

/// Result type alias for hotswap-watch operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Boxed error returned by a reload callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that terminate a watch or a configuration load.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The watched path could not be resolved through its symlinks.
    #[error("Failed to resolve {}: {source}", path.display())]
    Resolve {
        /// The literal path that was being resolved
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The directory notifier could not be created.
    #[error("Failed to create directory notifier: {0}")]
    Notifier(#[source] notify::Error),

    /// The parent directory could not be registered with the notifier.
    #[error("unable to add watch dir {}: {source}", dir.display())]
    AddDirectory {
        /// The directory that was being registered
        dir: PathBuf,
        /// The underlying notifier error
        #[source]
        source: notify::Error,
    },

    /// The notifier reported an internal fault while watching.
    #[error(transparent)]
    Notify(#[from] notify::Error),

    /// The notifier's event stream closed unexpectedly.
    #[error("notifier event channel closed")]
    EventsClosed,

    /// The notifier's error stream closed unexpectedly.
    #[error("notifier error channel closed")]
    ErrorsClosed,

    /// The watched file was removed.
    #[error("file {} was removed", path.display())]
    Removed {
        /// Path reported by the removal event
        path: PathBuf,
    },

    /// The reload callback failed. The callback's error is kept as the source.
    #[error("Reload callback failed: {0}")]
    Reload(#[source] BoxError),

    /// Failed to load configuration layers.
    #[error("Failed to load configuration: {0}")]
    Load(String),

    /// Failed to deserialize the merged configuration.
    #[error("Failed to deserialize configuration: {0}")]
    Deserialize(String),

    /// A reloaded configuration was rejected by its validator.
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

impl WatchError {
    /// Returns true if the watch ended because the file was removed.
    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed { .. })
    }

    /// Returns true if the error happened before the watch loop started.
    ///
    /// Re-resolution failures inside the loop also report `Resolve`, so this
    /// is only exact for errors returned before the first event.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            Self::Resolve { .. } | Self::Notifier(_) | Self::AddDirectory { .. }
        )
    }
}
