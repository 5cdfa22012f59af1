//! Watch metrics tracking using OpenTelemetry.

use opentelemetry::metrics::{Counter, Histogram, Meter};
use std::time::Instant;

/// Metrics collector for a single-file watch.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_watch::metrics::WatchMetrics;
/// use opentelemetry::global;
///
/// let meter = global::meter("hotswap-watch");
/// let metrics = WatchMetrics::new(meter);
///
/// let timer = metrics.start_reload();
/// // ... run the reload callback ...
/// metrics.record_reload_success(timer);
/// ```
#[derive(Clone)]
pub struct WatchMetrics {
    events_received: Counter<u64>,
    events_suppressed: Counter<u64>,
    events_ignored: Counter<u64>,
    reload_attempts: Counter<u64>,
    reload_failures: Counter<u64>,
    reload_duration: Histogram<f64>,
}

impl WatchMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let events_received = meter
            .u64_counter("hotswap_watch.events.received")
            .with_description("Raw directory events received")
            .build();

        let events_suppressed = meter
            .u64_counter("hotswap_watch.events.suppressed")
            .with_description("Duplicate events dropped by the debouncer")
            .build();

        let events_ignored = meter
            .u64_counter("hotswap_watch.events.ignored")
            .with_description("Events for other entries of the watched directory")
            .build();

        let reload_attempts = meter
            .u64_counter("hotswap_watch.reload.attempts")
            .with_description("Total number of reload callback invocations")
            .build();

        let reload_failures = meter
            .u64_counter("hotswap_watch.reload.failures")
            .with_description("Number of failed reload callbacks")
            .build();

        let reload_duration = meter
            .f64_histogram("hotswap_watch.reload.duration")
            .with_description("Duration of reload callbacks in seconds")
            .with_unit("s")
            .build();

        Self {
            events_received,
            events_suppressed,
            events_ignored,
            reload_attempts,
            reload_failures,
            reload_duration,
        }
    }

    /// Record a raw event arriving from the notifier.
    pub fn record_event(&self) {
        self.events_received.add(1, &[]);
    }

    /// Record an event dropped as a duplicate delivery.
    pub fn record_suppressed(&self) {
        self.events_suppressed.add(1, &[]);
    }

    /// Record an event for a path other than the watched file.
    pub fn record_ignored(&self) {
        self.events_ignored.add(1, &[]);
    }

    /// Start a reload timer.
    ///
    /// Pass the returned `Instant` to `record_reload_success` or
    /// `record_reload_failure` once the callback returns.
    pub fn start_reload(&self) -> Instant {
        self.reload_attempts.add(1, &[]);
        Instant::now()
    }

    /// Record a successful reload.
    pub fn record_reload_success(&self, start: Instant) {
        self.reload_duration.record(start.elapsed().as_secs_f64(), &[]);
    }

    /// Record a failed reload.
    pub fn record_reload_failure(&self, start: Instant) {
        self.reload_failures.add(1, &[]);
        self.reload_duration.record(start.elapsed().as_secs_f64(), &[]);
    }
}
