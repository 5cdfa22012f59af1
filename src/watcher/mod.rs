//! Single-file watching on top of a directory notifier.
//!
//! A [`FileWatcher`] subscribes to the directory containing the watched path,
//! maps every directory event back to that one path, follows symlink swaps,
//! drops duplicate deliveries, and calls a reload callback on creation or
//! write. The watch ends on cancellation (`Ok(())`), removal of the file,
//! notifier failure, or a failed reload.

mod debounce;
mod target;

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use target::WatchTarget;

use crate::error::{BoxError, Result, WatchError};
use crate::event::{Op, RawEvent};
use crate::notifier::{DirectoryNotifier, FsNotifier, Subscription};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[cfg(feature = "metrics")]
use crate::metrics::WatchMetrics;

/// Watches one configuration file and invokes a reload callback when it
/// changes.
///
/// The reload callback should rebuild the whole configuration stack rather
/// than apply the file's delta: when flags or environment variables take
/// precedence over the file, they must keep doing so after the file changes.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_watch::prelude::*;
/// use std::time::Duration;
///
/// # async fn example() -> Result<()> {
/// let cancel = CancellationToken::new();
///
/// FileWatcher::new("/etc/app/config.yaml")
///     .with_debounce(Duration::from_millis(10))
///     .watch(cancel, || async {
///         println!("config changed, reloading");
///         Ok::<(), std::io::Error>(())
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct FileWatcher {
    path: PathBuf,
    debounce: Duration,
    notifier: Arc<dyn DirectoryNotifier>,
    #[cfg(feature = "metrics")]
    metrics: Option<WatchMetrics>,
}

impl FileWatcher {
    /// Create a watcher for `path` with the default debounce window and the
    /// platform's recommended notifier.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            debounce: DEFAULT_DEBOUNCE,
            notifier: Arc::new(FsNotifier::default()),
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Set the window within which an identical event is dropped as a
    /// duplicate delivery.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Use a different directory notifier.
    pub fn with_notifier(mut self, notifier: impl DirectoryNotifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Record watch metrics.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, metrics: WatchMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Get the path as given.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the debounce window.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Watch the file until cancelled or until the watch fails.
    ///
    /// `reload` is awaited inside the loop, so reloads never overlap and a
    /// cancellation is only noticed between events.
    ///
    /// Sources are checked in a fixed order: cancellation, then queued events,
    /// then notifier faults. A fault is therefore reported once the events
    /// delivered before it have been handled; a directory that keeps producing
    /// events can delay it for as long as the events keep coming.
    ///
    /// # Errors
    ///
    /// - [`WatchError::Resolve`], [`WatchError::Notifier`] or
    ///   [`WatchError::AddDirectory`] if setup fails
    /// - [`WatchError::Removed`] if the watched file is removed
    /// - [`WatchError::Notify`], [`WatchError::EventsClosed`] or
    ///   [`WatchError::ErrorsClosed`] if the notifier fails
    /// - [`WatchError::Reload`] carrying the callback's error if a reload fails
    /// - [`WatchError::Resolve`] if the path stops resolving after a change
    pub async fn watch<F, Fut, E>(&self, cancel: CancellationToken, mut reload: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: Into<BoxError>,
    {
        let mut target = WatchTarget::resolve(&self.path)?;
        let mut subscription = self.notifier.subscribe(target.directory())?;

        info!(
            path = %target.path().display(),
            real_path = %target.real_path().display(),
            dir = %subscription.dir().display(),
            "Watching configuration file"
        );

        let result = self
            .run(&cancel, &mut target, &mut subscription, &mut reload)
            .await;

        match &result {
            Ok(()) => info!(path = %target.path().display(), "Watch cancelled"),
            Err(e) => warn!(path = %target.path().display(), error = %e, "Watch terminated"),
        }
        result
    }

    async fn run<F, Fut, E>(
        &self,
        cancel: &CancellationToken,
        target: &mut WatchTarget,
        subscription: &mut Subscription,
        reload: &mut F,
    ) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: Into<BoxError>,
    {
        let mut debouncer = Debouncer::new(self.debounce);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => return Ok(()),

                event = subscription.events.recv() => {
                    let event = event.ok_or(WatchError::EventsClosed)?;
                    if self.accept(event, target, &mut debouncer)? {
                        self.reload(reload).await?;
                    }
                }

                err = subscription.errors.recv() => {
                    return Err(err.map_or(WatchError::ErrorsClosed, WatchError::Notify));
                }
            }
        }
    }

    /// Classify one raw event. Returns true if it should trigger a reload.
    fn accept(
        &self,
        event: RawEvent,
        target: &mut WatchTarget,
        debouncer: &mut Debouncer,
    ) -> Result<bool> {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_event();
        }

        if debouncer.is_duplicate(event.signature(), Instant::now()) {
            debug!(event = %event, "Dropping duplicate event");
            #[cfg(feature = "metrics")]
            if let Some(metrics) = &self.metrics {
                metrics.record_suppressed();
            }
            return Ok(false);
        }

        if !target.matches(&event.path) {
            #[cfg(feature = "metrics")]
            if let Some(metrics) = &self.metrics {
                metrics.record_ignored();
            }
            return Ok(false);
        }

        if event.op == Op::Remove {
            return Err(WatchError::Removed { path: event.path });
        }

        if target.refresh()? {
            info!(
                path = %target.path().display(),
                real_path = %target.real_path().display(),
                "Watched path now resolves elsewhere"
            );
        }

        if !event.op.triggers_reload() {
            debug!(event = %event, "Event does not trigger a reload");
            return Ok(false);
        }

        debug!(event = %event, "Reloading configuration");
        Ok(true)
    }

    async fn reload<F, Fut, E>(&self, reload: &mut F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: Into<BoxError>,
    {
        #[cfg(feature = "metrics")]
        let timer = self.metrics.as_ref().map(WatchMetrics::start_reload);

        let result = reload().await.map_err(|e| WatchError::Reload(e.into()));

        #[cfg(feature = "metrics")]
        if let (Some(metrics), Some(timer)) = (&self.metrics, timer) {
            match &result {
                Ok(()) => metrics.record_reload_success(timer),
                Err(_) => metrics.record_reload_failure(timer),
            }
        }

        result
    }
}

/// Watch `path` with default settings, calling `reload` whenever it is
/// created or written.
///
/// Returns `Ok(())` once `cancel` fires. See [`FileWatcher::watch`] for the
/// error cases.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_watch::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let cancel = CancellationToken::new();
/// hotswap_watch::watch(cancel.clone(), "config.yaml", || async {
///     Ok::<(), std::io::Error>(())
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn watch<F, Fut, E>(
    cancel: CancellationToken,
    path: impl Into<PathBuf>,
    reload: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<(), E>>,
    E: Into<BoxError>,
{
    FileWatcher::new(path).watch(cancel, reload).await
}
