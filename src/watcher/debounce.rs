//! Suppression of duplicate event deliveries.

use std::time::Duration;
use tokio::time::Instant;

/// Default window within which an identical event counts as a duplicate.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(5);

/// Remembers the last processed event so immediate re-deliveries of the same
/// event can be dropped.
///
/// Only the signature and timestamp of the single most recent event are kept;
/// no timers are involved.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last: Option<(String, Instant)>,
}

impl Debouncer {
    /// Create a debouncer with the given window.
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Check `signature` received at `now` against the previous event.
    ///
    /// Returns true if it repeats the previous signature within the window.
    /// Otherwise the event becomes the new "last processed" and false is
    /// returned.
    pub fn is_duplicate(&mut self, signature: String, now: Instant) -> bool {
        if let Some((last, at)) = &self.last {
            if *last == signature && now.saturating_duration_since(*at) < self.window {
                return true;
            }
        }
        self.last = Some((signature, now));
        false
    }

    /// Get the debounce window.
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
