use crate::MeasurementState;
use colored::*;
use prettytable::{color, Attr, Cell, Row, Table};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Point-in-time copy of every record held by a tracker.
///
/// Entries are sorted by identifier. Durations are stored in nanoseconds so the
/// JSON form stays integer-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub enabled: bool,
    pub active: Option<String>,
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub identifier: String,
    pub state: MeasurementState,
    pub latest_timed_ns: Option<u64>,
    pub latest_untimed: Option<f64>,
}

impl Snapshot {
    pub fn get(&self, identifier: &str) -> Option<&SnapshotEntry> {
        self.entries
            .iter()
            .find(|entry| entry.identifier == identifier)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SnapshotEntry {
    pub fn latest_timed(&self) -> Option<Duration> {
        self.latest_timed_ns.map(Duration::from_nanos)
    }
}

/// Trait for implementing custom measurement report output.
///
/// Implement this to forward results into a logging system, a CI artifact or
/// any other sink.
///
/// # Examples
///
/// ```rust
/// use perfmark::{Reporter, Snapshot};
/// use std::error::Error;
///
/// struct CountReporter;
///
/// impl Reporter for CountReporter {
///     fn report(&self, snapshot: &Snapshot) -> Result<(), Box<dyn Error>> {
///         println!("{} identifiers measured", snapshot.entries.len());
///         Ok(())
///     }
/// }
/// ```
pub trait Reporter {
    fn report(&self, snapshot: &Snapshot) -> Result<(), Box<dyn std::error::Error>>;
}

/// Built-in report formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    #[default]
    Table,
    Json,
    JsonPretty,
}

impl Format {
    pub fn reporter(self) -> Box<dyn Reporter> {
        match self {
            Format::Table => Box::new(TableReporter),
            Format::Json => Box::new(JsonReporter),
            Format::JsonPretty => Box::new(JsonPrettyReporter),
        }
    }
}

pub struct TableReporter;

impl Reporter for TableReporter {
    fn report(&self, snapshot: &Snapshot) -> Result<(), Box<dyn std::error::Error>> {
        if !snapshot.enabled {
            println!("{}", "perfmark: measurements disabled".dimmed());
            return Ok(());
        }

        let use_colors = std::env::var("NO_COLOR").is_err();
        println!("{}", "Newest measurement per identifier.".bold());
        build_table(snapshot, use_colors).printstd();

        if let Some(active) = &snapshot.active {
            println!("* {} is still being measured", active.yellow().bold());
        }
        Ok(())
    }
}

pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&self, snapshot: &Snapshot) -> Result<(), Box<dyn std::error::Error>> {
        println!("{}", serde_json::to_string(snapshot)?);
        Ok(())
    }
}

pub struct JsonPrettyReporter;

impl Reporter for JsonPrettyReporter {
    fn report(&self, snapshot: &Snapshot) -> Result<(), Box<dyn std::error::Error>> {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        Ok(())
    }
}

const HEADERS: [&str; 4] = ["Identifier", "State", "Newest", "Untimed"];

pub(crate) fn build_table(snapshot: &Snapshot, use_colors: bool) -> Table {
    let mut table = Table::new();

    let header_cells: Vec<Cell> = HEADERS
        .iter()
        .map(|header| {
            if use_colors {
                Cell::new(header)
                    .with_style(Attr::Bold)
                    .with_style(Attr::ForegroundColor(color::CYAN))
            } else {
                Cell::new(header).with_style(Attr::Bold)
            }
        })
        .collect();
    table.add_row(Row::new(header_cells));

    for entry in &snapshot.entries {
        let newest = entry
            .latest_timed()
            .map(format_duration)
            .unwrap_or_else(|| "-".to_string());
        let untimed = entry
            .latest_untimed
            .map(|value| value.to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(Row::new(vec![
            Cell::new(&entry.identifier),
            Cell::new(&entry.state.to_string()),
            Cell::new(&newest),
            Cell::new(&untimed),
        ]));
    }

    table
}

pub(crate) fn format_duration(duration: Duration) -> String {
    format!("{:.2?}", duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        Snapshot {
            enabled: true,
            active: None,
            entries: vec![
                SnapshotEntry {
                    identifier: "AppLaunch".to_string(),
                    state: MeasurementState::Stopped,
                    latest_timed_ns: Some(1_500_000),
                    latest_untimed: None,
                },
                SnapshotEntry {
                    identifier: "CacheHitRatio".to_string(),
                    state: MeasurementState::Unprepared,
                    latest_timed_ns: None,
                    latest_untimed: Some(0.35),
                },
            ],
        }
    }

    #[test]
    fn test_table_contains_rows() {
        let rendered = build_table(&sample(), false).to_string();
        for expected in ["Identifier", "AppLaunch", "stopped", "1.50ms", "CacheHitRatio", "0.35"] {
            assert!(
                rendered.contains(expected),
                "Table did not contain {expected}:\n{rendered}"
            );
        }
    }

    #[test]
    fn test_snapshot_json_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["entries"][0]["identifier"], "AppLaunch");
        assert_eq!(value["entries"][0]["state"], "stopped");
        assert_eq!(value["entries"][0]["latest_timed_ns"], 1_500_000);
        assert!(value["entries"][1]["latest_timed_ns"].is_null());
    }

    #[test]
    fn test_snapshot_lookup() {
        let snapshot = sample();
        assert_eq!(
            snapshot.get("AppLaunch").and_then(SnapshotEntry::latest_timed),
            Some(Duration::from_micros(1500))
        );
        assert!(snapshot.get("Missing").is_none());
    }

    #[test]
    fn test_lookup_in_unsorted_snapshot() {
        let mut snapshot = sample();
        snapshot.entries.reverse();
        assert_eq!(
            snapshot.get("AppLaunch").map(|entry| entry.state),
            Some(MeasurementState::Stopped)
        );

        let loaded: Snapshot =
            serde_json::from_value(serde_json::to_value(&snapshot).unwrap()).unwrap();
        assert_eq!(
            loaded.get("CacheHitRatio").and_then(|entry| entry.latest_untimed),
            Some(0.35)
        );
    }

    #[test]
    fn test_format_selects_reporter() {
        assert_eq!(Format::default(), Format::Table);
        let json: Format = serde_json::from_str("\"json-pretty\"").unwrap();
        assert_eq!(json, Format::JsonPretty);
    }
}
