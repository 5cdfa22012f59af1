//! Built-in metrics for watch operations.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Raw events received, suppressed as duplicates, or ignored as irrelevant
//! - Reload attempts/failures
//! - Reload duration
//!
//! # Examples
//!
//! ```rust,no_run
//! use hotswap_watch::prelude::*;
//! use hotswap_watch::metrics::WatchMetrics;
//! use opentelemetry::global;
//!
//! # async fn example(cancel: CancellationToken) -> Result<()> {
//! let meter = global::meter("my-app");
//!
//! FileWatcher::new("config.yaml")
//!     .with_metrics(WatchMetrics::new(meter))
//!     .watch(cancel, || async { Ok::<(), std::io::Error>(()) })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod watch_metrics;

pub use watch_metrics::WatchMetrics;
