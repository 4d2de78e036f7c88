use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle position of a single identifier.
///
/// `Unprepared → Prepared → Started → Stopped`. `Stopped` is terminal until the
/// identifier's results are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasurementState {
    #[default]
    Unprepared,
    Prepared,
    Started,
    Stopped,
}

impl fmt::Display for MeasurementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MeasurementState::Unprepared => "unprepared",
            MeasurementState::Prepared => "prepared",
            MeasurementState::Started => "started",
            MeasurementState::Stopped => "stopped",
        };
        f.write_str(label)
    }
}
