use super::clock::Instant;
use super::guard::BlockGuard;
use super::registry::Registry;
use crate::error::Result;
use crate::output::{Reporter, Snapshot};
use crate::{MeasurementState, TrackerConfig, IGNORED_IDENTIFIER};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

enum Backend {
    Active(Mutex<Registry>),
    Disabled,
}

/// Registry of named measurements.
///
/// Identifiers move through `prepare_to_measure → start → stop`; only one
/// identifier may be between `start` and `stop` at any moment across the whole
/// tracker. Calls made with [`IGNORED_IDENTIFIER`] are no-ops, and a disabled
/// tracker accepts every call without recording anything.
///
/// Most applications use the shared instance from [`global`](crate::global);
/// tests usually build their own:
///
/// ```rust
/// let tracker = perfmark::MeasurementTracker::new();
/// tracker.prepare_to_measure("Migrate250Records")?;
/// tracker.start("Migrate250Records")?;
/// tracker.stop("Migrate250Records")?;
/// let _elapsed = tracker.newest_timed_measurement("Migrate250Records");
/// # Ok::<(), perfmark::MeasureError>(())
/// ```
pub struct MeasurementTracker {
    backend: Backend,
    config: TrackerConfig,
}

impl Default for MeasurementTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MeasurementTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasurementTracker")
            .field("config", &self.config)
            .field("active", &self.active_identifier())
            .finish()
    }
}

impl MeasurementTracker {
    /// An enabled tracker regardless of build profile or environment.
    pub fn new() -> Self {
        Self::with_config(TrackerConfig {
            enabled: true,
            ..TrackerConfig::default()
        })
    }

    pub fn disabled() -> Self {
        Self::with_config(TrackerConfig {
            enabled: false,
            ..TrackerConfig::default()
        })
    }

    pub fn with_config(config: TrackerConfig) -> Self {
        let backend = if config.enabled {
            Backend::Active(Mutex::new(Registry::new()))
        } else {
            Backend::Disabled
        };
        Self { backend, config }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.backend, Backend::Active(_))
    }

    fn registry(&self) -> Option<MutexGuard<'_, Registry>> {
        match &self.backend {
            // Every registry mutation completes before it can panic, so a
            // poisoned lock still guards consistent records.
            Backend::Active(registry) => {
                Some(registry.lock().unwrap_or_else(PoisonError::into_inner))
            }
            Backend::Disabled => None,
        }
    }

    fn checked<T>(
        &self,
        identifier: &str,
        op: impl FnOnce(&mut Registry) -> Result<T>,
    ) -> Result<Option<T>> {
        if identifier == IGNORED_IDENTIFIER {
            return Ok(None);
        }
        let Some(mut registry) = self.registry() else {
            return Ok(None);
        };

        let result = op(&mut *registry);
        drop(registry);

        result.map(Some).inspect_err(|err| {
            debug!(identifier, %err, "rejected measurement call");
        })
    }

    /// Registers `identifier` so it can be started.
    ///
    /// Re-preparing a prepared or started identifier resets it to prepared;
    /// an identifier that already completed a measurement must be discarded
    /// first. Fails while a different identifier is being measured.
    pub fn prepare_to_measure(&self, identifier: &str) -> Result<()> {
        self.checked(identifier, |registry| registry.prepare(identifier))
            .map(|_| ())
    }

    /// Starts the clock for a prepared identifier.
    pub fn start(&self, identifier: &str) -> Result<()> {
        let now = Instant::now();
        self.checked(identifier, |registry| registry.start(identifier, now))
            .map(|_| ())
    }

    /// Stops the open measurement for `identifier` and stores its duration.
    pub fn stop(&self, identifier: &str) -> Result<()> {
        self.stop_measurement(identifier).map(|_| ())
    }

    pub(crate) fn stop_measurement(&self, identifier: &str) -> Result<Option<Duration>> {
        let elapsed = self.checked(identifier, |registry| {
            registry.stop(identifier, Instant::now())
        })?;

        if let Some(elapsed) = elapsed {
            if self.config.log_measurements {
                info!(identifier, ?elapsed, "measurement completed");
            }
        }
        Ok(elapsed)
    }

    /// Prepares and starts `identifier`, returning a guard that stops the
    /// measurement when dropped (including during unwinding).
    ///
    /// Fails if another measurement is open, or if `identifier` was prepared
    /// or measured before.
    pub fn enter(&self, identifier: &str) -> Result<BlockGuard<'_>> {
        let now = Instant::now();
        let armed = self.checked(identifier, |registry| {
            registry.begin_block(identifier, now)
        })?;

        Ok(BlockGuard::new(self, armed.map(|()| identifier.to_string())))
    }

    /// Measures `body` under `identifier` and returns its output.
    ///
    /// Do not call [`prepare_to_measure`](Self::prepare_to_measure) for the
    /// identifier first. If `body` panics the elapsed time is still recorded
    /// and the slot released before the panic reaches the caller.
    pub fn measure_block<R>(&self, identifier: &str, body: impl FnOnce() -> R) -> Result<R> {
        let guard = self.enter(identifier)?;
        let output = body();
        guard.finish()?;
        Ok(output)
    }

    /// Stores a plain numeric value for `identifier`. Never fails.
    pub fn record_untimed_measurement(&self, value: f64, identifier: &str) {
        if identifier == IGNORED_IDENTIFIER {
            return;
        }
        let conflicting = match self.registry() {
            Some(mut registry) => registry.record_untimed(identifier, value),
            None => return,
        };

        if let Some(active) = conflicting {
            warn!(
                identifier,
                active = %active,
                "untimed measurement recorded while another measurement is open"
            );
        }
    }

    /// Forgets everything recorded for `identifier`. Never fails.
    pub fn discard_previous_results(&self, identifier: &str) {
        if identifier == IGNORED_IDENTIFIER {
            return;
        }
        if let Some(mut registry) = self.registry() {
            registry.discard(identifier);
        }
    }

    /// Latest completed duration, or [`Duration::ZERO`] if there is none.
    pub fn newest_timed_measurement(&self, identifier: &str) -> Duration {
        self.registry()
            .and_then(|registry| registry.record(identifier).and_then(|r| r.latest_timed))
            .unwrap_or(Duration::ZERO)
    }

    /// Latest untimed value, or `0.0` if there is none.
    pub fn newest_untimed_measurement(&self, identifier: &str) -> f64 {
        self.registry()
            .and_then(|registry| registry.record(identifier).and_then(|r| r.latest_untimed))
            .unwrap_or(0.0)
    }

    pub fn state_of(&self, identifier: &str) -> MeasurementState {
        self.registry()
            .map(|registry| registry.state_of(identifier))
            .unwrap_or_default()
    }

    /// Identifier currently holding the measurement slot.
    pub fn active_identifier(&self) -> Option<String> {
        self.registry()
            .and_then(|registry| registry.active().map(str::to_string))
    }

    pub fn snapshot(&self) -> Snapshot {
        self.registry()
            .map(|registry| registry.snapshot())
            .unwrap_or_default()
    }

    pub fn report(
        &self,
        reporter: &dyn Reporter,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        reporter.report(&self.snapshot())
    }
}
