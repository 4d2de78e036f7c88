use super::tracker::MeasurementTracker;
use crate::error::Result;
use crate::output::{Format, Reporter};
use std::sync::Arc;
use std::time::Duration;

/// Open block measurement returned by [`MeasurementTracker::enter`].
///
/// Dropping the guard stops the measurement. Call [`finish`](Self::finish) to
/// observe the recorded duration or a stop failure instead.
#[must_use = "the measurement stops as soon as the guard is dropped"]
pub struct BlockGuard<'a> {
    tracker: &'a MeasurementTracker,
    identifier: Option<String>,
}

impl<'a> BlockGuard<'a> {
    pub(crate) fn new(tracker: &'a MeasurementTracker, identifier: Option<String>) -> Self {
        Self {
            tracker,
            identifier,
        }
    }

    /// `None` for ignored identifiers and disabled trackers.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Stops the measurement now. Returns `Duration::ZERO` when nothing was
    /// being recorded.
    pub fn finish(mut self) -> Result<Duration> {
        match self.identifier.take() {
            Some(identifier) => Ok(self
                .tracker
                .stop_measurement(&identifier)?
                .unwrap_or(Duration::ZERO)),
            None => Ok(Duration::ZERO),
        }
    }
}

impl Drop for BlockGuard<'_> {
    fn drop(&mut self) {
        if let Some(identifier) = self.identifier.take() {
            stop_quietly(self.tracker, &identifier);
        }
    }
}

fn stop_quietly(tracker: &MeasurementTracker, identifier: &str) {
    if let Err(err) = tracker.stop_measurement(identifier) {
        tracing::error!(identifier, %err, "failed to stop block measurement");
    }
}

/// Guard used by `#[perfmark::measure]` and `measure_block!` against the
/// global tracker. Misuse panics.
#[doc(hidden)]
pub struct MeasureGuard {
    tracker: Arc<MeasurementTracker>,
    identifier: Option<String>,
}

impl MeasureGuard {
    #[inline]
    pub fn new(identifier: &str) -> Self {
        let tracker = crate::global();
        let armed = match tracker.enter(identifier) {
            Ok(mut guard) => guard.identifier.take(),
            Err(err) => panic!("perfmark: {err}"),
        };

        Self {
            tracker,
            identifier: armed,
        }
    }
}

impl Drop for MeasureGuard {
    #[inline]
    fn drop(&mut self) {
        if let Some(identifier) = self.identifier.take() {
            stop_quietly(&self.tracker, &identifier);
        }
    }
}

/// Reports the global tracker's measurements when dropped. Created by
/// `#[perfmark::main]`.
pub struct ReportGuard {
    reporter: Box<dyn Reporter>,
}

impl ReportGuard {
    pub fn new(format: Format) -> Self {
        Self {
            reporter: format.reporter(),
        }
    }

    pub fn with_reporter(reporter: Box<dyn Reporter>) -> Self {
        Self { reporter }
    }
}

impl Drop for ReportGuard {
    fn drop(&mut self) {
        if let Err(err) = crate::global().report(self.reporter.as_ref()) {
            tracing::error!(%err, "failed to write measurement report");
        }
    }
}
