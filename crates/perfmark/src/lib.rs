//! Named start/stop measurements embedded in application code.
//!
//! Register an identifier, bracket a region with `start`/`stop` (or measure a
//! closure in one call) and read back the newest duration later:
//!
//! ```rust
//! use perfmark::MeasurementTracker;
//!
//! let tracker = MeasurementTracker::new();
//! let rows = tracker.measure_block("Migrate250Records", || 250)?;
//! assert_eq!(rows, 250);
//! let _elapsed = tracker.newest_timed_measurement("Migrate250Records");
//! # Ok::<(), perfmark::MeasureError>(())
//! ```
//!
//! Only one measurement may be open at a time across a tracker. Pass
//! [`IGNORED_IDENTIFIER`] instead of a real identifier to switch a measurement
//! site off without removing the call.
//!
//! # Feature Flags
//!
//! - `perfmark-off`: compiles every call down to a no-op. Trackers can also be
//!   disabled at runtime through [`TrackerConfig::enabled`] or the
//!   `PERFMARK_ENABLED` environment variable.

pub use perfmark_macros::{main, measure};

mod config;
mod error;
mod output;
mod state;

pub use config::{TrackerBuilder, TrackerConfig, ENV_ENABLED, ENV_LOG};
pub use error::{MeasureError, Result};
pub use output::{
    Format, JsonPrettyReporter, JsonReporter, Reporter, Snapshot, SnapshotEntry, TableReporter,
};
pub use state::MeasurementState;

/// Identifier that turns any call into a no-op.
///
/// Keep measurement sites in code and point the ones you want disabled at this
/// value; this also allows "nesting" calls where only one pair is live.
pub const IGNORED_IDENTIFIER: &str = "ignoredIdentifier";

cfg_if::cfg_if! {
    if #[cfg(feature = "perfmark-off")] {
        mod lib_off;
        pub use lib_off::*;
    } else {
        mod lib_on;
        pub use lib_on::*;
    }
}
