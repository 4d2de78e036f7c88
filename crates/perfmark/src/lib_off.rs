use crate::{Format, MeasurementState, Reporter, Result, Snapshot, TrackerConfig};
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

#[macro_export]
macro_rules! measure_block {
    ($label:expr, $expr:expr) => {{
        $expr
    }};
}

#[derive(Debug, Default)]
pub struct MeasurementTracker {
    config: TrackerConfig,
}

impl MeasurementTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_config(config: TrackerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    #[inline]
    pub fn prepare_to_measure(&self, _identifier: &str) -> Result<()> {
        Ok(())
    }

    #[inline]
    pub fn start(&self, _identifier: &str) -> Result<()> {
        Ok(())
    }

    #[inline]
    pub fn stop(&self, _identifier: &str) -> Result<()> {
        Ok(())
    }

    #[inline]
    pub fn enter(&self, _identifier: &str) -> Result<BlockGuard<'_>> {
        Ok(BlockGuard {
            _tracker: PhantomData,
        })
    }

    #[inline]
    pub fn measure_block<R>(&self, _identifier: &str, body: impl FnOnce() -> R) -> Result<R> {
        Ok(body())
    }

    #[inline]
    pub fn record_untimed_measurement(&self, _value: f64, _identifier: &str) {}

    #[inline]
    pub fn discard_previous_results(&self, _identifier: &str) {}

    #[inline]
    pub fn newest_timed_measurement(&self, _identifier: &str) -> Duration {
        Duration::ZERO
    }

    #[inline]
    pub fn newest_untimed_measurement(&self, _identifier: &str) -> f64 {
        0.0
    }

    pub fn state_of(&self, _identifier: &str) -> MeasurementState {
        MeasurementState::Unprepared
    }

    pub fn active_identifier(&self) -> Option<String> {
        None
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::default()
    }

    pub fn report(
        &self,
        _reporter: &dyn Reporter,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

pub struct BlockGuard<'a> {
    _tracker: PhantomData<&'a MeasurementTracker>,
}

impl BlockGuard<'_> {
    pub fn identifier(&self) -> Option<&str> {
        None
    }

    pub fn finish(self) -> Result<Duration> {
        Ok(Duration::ZERO)
    }
}

#[doc(hidden)]
pub struct MeasureGuard;

impl MeasureGuard {
    #[inline]
    pub fn new(_identifier: &str) -> Self {
        MeasureGuard
    }
}

pub struct ReportGuard;

impl ReportGuard {
    pub fn new(_format: Format) -> Self {
        ReportGuard
    }

    pub fn with_reporter(_reporter: Box<dyn Reporter>) -> Self {
        ReportGuard
    }
}

static PERFMARK_TRACKER: OnceLock<Arc<MeasurementTracker>> = OnceLock::new();

pub fn global() -> Arc<MeasurementTracker> {
    Arc::clone(PERFMARK_TRACKER.get_or_init(|| Arc::new(MeasurementTracker::default())))
}

pub fn install(_tracker: MeasurementTracker) -> Arc<MeasurementTracker> {
    global()
}
