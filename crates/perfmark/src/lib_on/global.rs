use super::tracker::MeasurementTracker;
use crate::TrackerConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, OnceLock};

static PERFMARK_TRACKER: OnceLock<ArcSwap<MeasurementTracker>> = OnceLock::new();

fn shared() -> &'static ArcSwap<MeasurementTracker> {
    PERFMARK_TRACKER.get_or_init(|| {
        let config = TrackerConfig::from_env();
        tracing::debug!(?config, "initializing global measurement tracker");
        ArcSwap::from_pointee(MeasurementTracker::with_config(config))
    })
}

/// The process-wide tracker, created from [`TrackerConfig::from_env`] on first use.
pub fn global() -> Arc<MeasurementTracker> {
    shared().load_full()
}

/// Replaces the process-wide tracker and returns the previous one.
///
/// Guards created before the swap keep stopping against the tracker they
/// started on.
pub fn install(tracker: MeasurementTracker) -> Arc<MeasurementTracker> {
    shared().swap(Arc::new(tracker))
}
