//! # hotswap-watch
//!
//! Reliable change detection for a single configuration file, driving a
//! configuration reload.
//!
//! ## Overview
//!
//! Filesystem notification APIs watch directories, not files, and know
//! nothing about symlinks, atomic rename-based replacement or duplicate event
//! delivery. `hotswap-watch` turns a directory subscription into a watch on
//! one path:
//! - Symlinks are resolved, and re-resolved whenever the path changes
//! - Directory events are filtered down to the watched path
//! - Immediate duplicate deliveries are dropped
//! - Removal ends the watch with an error
//! - Creation and writes call a reload callback, one call at a time
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hotswap_watch::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let cancel = CancellationToken::new();
//!
//! // Returns Ok(()) once `cancel` fires.
//! hotswap_watch::watch(cancel.clone(), "config/app.yaml", || async {
//!     println!("configuration changed");
//!     Ok::<(), std::io::Error>(())
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `metrics`: OpenTelemetry counters and histograms for watch activity

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod error;
pub mod event;
pub mod layered;
pub mod notifier;
pub mod watcher;

#[cfg(feature = "metrics")]
pub mod metrics;

pub use watcher::watch;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::error::{Result, WatchError};
    pub use crate::event::{Op, RawEvent};
    pub use crate::layered::{LayeredConfig, LayeredConfigBuilder};
    pub use crate::notifier::{Backend, DirectoryNotifier, FsNotifier};
    pub use crate::watcher::FileWatcher;
    pub use tokio_util::sync::CancellationToken;
}
