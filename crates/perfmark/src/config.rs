use serde::{Deserialize, Serialize};

pub const ENV_ENABLED: &str = "PERFMARK_ENABLED";
pub const ENV_LOG: &str = "PERFMARK_LOG";

/// Settings a [`MeasurementTracker`](crate::MeasurementTracker) is built from.
///
/// Can be deserialized from host configuration, read from the environment with
/// [`TrackerConfig::from_env`], or assembled with a [`TrackerBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Disabled trackers accept every call and record nothing.
    pub enabled: bool,
    /// Emit a `tracing` event for each completed measurement.
    pub log_measurements: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            enabled: cfg!(debug_assertions),
            log_measurements: true,
        }
    }
}

impl TrackerConfig {
    /// Defaults overridden by `PERFMARK_ENABLED` and `PERFMARK_LOG`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(enabled) = lookup(ENV_ENABLED).as_deref().and_then(parse_flag) {
            config.enabled = enabled;
        }
        if let Some(log) = lookup(ENV_LOG).as_deref().and_then(parse_flag) {
            config.log_measurements = log;
        }

        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        other => {
            tracing::warn!(value = other, "ignoring unrecognized boolean flag");
            None
        }
    }
}

/// Fluent construction of a tracker.
///
/// ```rust
/// let tracker = perfmark::TrackerBuilder::new()
///     .enabled(true)
///     .log_measurements(false)
///     .build();
/// tracker.record_untimed_measurement(0.35, "CacheHitRatio");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TrackerBuilder {
    config: TrackerConfig,
}

impl TrackerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: TrackerConfig) -> Self {
        Self { config }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn log_measurements(mut self, log: bool) -> Self {
        self.config.log_measurements = log;
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn build(self) -> crate::MeasurementTracker {
        crate::MeasurementTracker::with_config(self.config)
    }
}
