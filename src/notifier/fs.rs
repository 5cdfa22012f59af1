//! Directory notifier backed by the `notify` crate.

use super::{DirectoryNotifier, Subscription};
use crate::error::{Result, WatchError};
use crate::event::RawEvent;
use notify::{Config, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

/// Which `notify` backend to open subscriptions with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// The platform's native notification API (inotify, kqueue, ...).
    #[default]
    Recommended,
    /// Periodic directory scans, for filesystems without native notifications.
    Poll(Duration),
}

/// Filesystem notifier using the `notify` crate.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_watch::notifier::{Backend, FsNotifier};
/// use std::time::Duration;
///
/// // Network mounts rarely deliver native events; scan every two seconds.
/// let notifier = FsNotifier::new(Backend::Poll(Duration::from_secs(2)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FsNotifier {
    backend: Backend,
}

impl FsNotifier {
    /// Create a notifier for the given backend.
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Get the backend this notifier opens.
    pub fn backend(&self) -> Backend {
        self.backend
    }
}

impl DirectoryNotifier for FsNotifier {
    fn subscribe(&self, dir: &Path) -> Result<Subscription> {
        match self.backend {
            Backend::Recommended => open::<RecommendedWatcher>(dir, Config::default()),
            Backend::Poll(interval) => {
                open::<PollWatcher>(dir, Config::default().with_poll_interval(interval))
            }
        }
    }
}

fn open<W>(dir: &Path, config: Config) -> Result<Subscription>
where
    W: NotifyWatcher + Send + 'static,
{
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (error_tx, error_rx) = mpsc::unbounded_channel();

    // Runs on the backend's own thread; forwards into the async side.
    let handler = move |res: notify::Result<notify::Event>| match res {
        Ok(event) => {
            for raw in RawEvent::from_notify(event) {
                let _ = event_tx.send(raw);
            }
        }
        Err(e) => {
            let _ = error_tx.send(e);
        }
    };

    let mut watcher = W::new(handler, config).map_err(WatchError::Notifier)?;
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|source| WatchError::AddDirectory {
            dir: dir.to_path_buf(),
            source,
        })?;

    Ok(Subscription::new(dir, event_rx, error_rx, watcher))
}
