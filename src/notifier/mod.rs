//! Directory notifiers: the event source behind a single-file watch.
//!
//! Filesystem notification APIs reliably observe directories, not single
//! files. A [`DirectoryNotifier`] opens a non-recursive subscription on one
//! directory and hands back a [`Subscription`] carrying two streams: raw
//! events for entries of that directory, and notifier-internal errors.

mod fs;

pub use fs::{Backend, FsNotifier};

use crate::error::Result;
use crate::event::RawEvent;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::debug;

/// Opens directory subscriptions.
///
/// Each call to [`subscribe`](DirectoryNotifier::subscribe) creates an
/// independent notifier instance; nothing is shared between subscriptions.
pub trait DirectoryNotifier: Send + Sync {
    /// Open a notifier and register `dir` with it.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Notifier`](crate::error::WatchError::Notifier) if
    /// the notifier cannot be created and
    /// [`WatchError::AddDirectory`](crate::error::WatchError::AddDirectory) if
    /// the directory cannot be registered.
    fn subscribe(&self, dir: &Path) -> Result<Subscription>;
}

/// An open directory subscription.
///
/// Dropping the subscription releases the underlying notifier. The watcher
/// owns exactly one subscription per watch, so release happens exactly once on
/// every exit path.
pub struct Subscription {
    pub(crate) events: mpsc::UnboundedReceiver<RawEvent>,
    pub(crate) errors: mpsc::UnboundedReceiver<notify::Error>,
    dir: Box<Path>,
    _guard: Box<dyn Send>,
}

impl Subscription {
    /// Assemble a subscription from its streams and the backend guard.
    ///
    /// `guard` is whatever keeps the backend alive; it is dropped when the
    /// subscription is.
    pub fn new(
        dir: &Path,
        events: mpsc::UnboundedReceiver<RawEvent>,
        errors: mpsc::UnboundedReceiver<notify::Error>,
        guard: impl Send + 'static,
    ) -> Self {
        Self {
            events,
            errors,
            dir: dir.into(),
            _guard: Box::new(guard),
        }
    }

    /// The directory this subscription observes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!(dir = %self.dir.display(), "Directory subscription released");
    }
}
