use super::clock::Instant;
use super::slot::ActiveSlot;
use crate::error::{MeasureError, Result};
use crate::output::{Snapshot, SnapshotEntry};
use crate::MeasurementState;
use std::collections::HashMap;
use std::time::Duration;

const ALREADY_MEASURED: &str = "already measured this session; discard previous results first";
const PREPARED_BEFORE_BLOCK: &str =
    "block measurements prepare themselves; do not call prepare_to_measure first";

#[derive(Debug, Default)]
pub(crate) struct MeasurementRecord {
    pub state: MeasurementState,
    started_at: Option<Instant>,
    pub latest_timed: Option<Duration>,
    pub latest_untimed: Option<f64>,
}

impl MeasurementRecord {
    fn prepared() -> Self {
        Self {
            state: MeasurementState::Prepared,
            ..Self::default()
        }
    }

    fn to_entry(&self, identifier: &str) -> SnapshotEntry {
        SnapshotEntry {
            identifier: identifier.to_string(),
            state: self.state,
            latest_timed_ns: self
                .latest_timed
                .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)),
            latest_untimed: self.latest_untimed,
        }
    }
}

/// Identifier records plus the active slot. Every transition is validated
/// here; callers hold the tracker lock around each call.
#[derive(Debug)]
pub(crate) struct Registry {
    records: HashMap<String, MeasurementRecord>,
    slot: ActiveSlot,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            slot: ActiveSlot::default(),
        }
    }

    pub fn prepare(&mut self, identifier: &str) -> Result<()> {
        if let Some(active) = self.slot.holder() {
            if active != identifier {
                return Err(MeasureError::MeasurementAlreadyActive {
                    active: active.to_string(),
                    requested: identifier.to_string(),
                });
            }
        }

        let Some(record) = self.records.get_mut(identifier) else {
            self.records
                .insert(identifier.to_string(), MeasurementRecord::prepared());
            return Ok(());
        };

        match record.state {
            MeasurementState::Stopped => Err(MeasureError::Misuse {
                identifier: identifier.to_string(),
                reason: ALREADY_MEASURED,
            }),
            MeasurementState::Started => {
                self.slot.release(identifier);
                record.started_at = None;
                record.state = MeasurementState::Prepared;
                Ok(())
            }
            MeasurementState::Unprepared | MeasurementState::Prepared => {
                record.state = MeasurementState::Prepared;
                Ok(())
            }
        }
    }

    pub fn start(&mut self, identifier: &str, now: Instant) -> Result<()> {
        let record = self
            .records
            .get_mut(identifier)
            .ok_or_else(|| MeasureError::UnrecognizedIdentifier(identifier.to_string()))?;

        if record.state != MeasurementState::Prepared {
            return Err(MeasureError::NotPrepared(identifier.to_string()));
        }

        self.slot.acquire(identifier)?;
        record.state = MeasurementState::Started;
        record.started_at = Some(now);
        Ok(())
    }

    pub fn stop(&mut self, identifier: &str, now: Instant) -> Result<Duration> {
        if let Some(active) = self.slot.holder() {
            if active != identifier {
                return Err(MeasureError::IdentifierMismatch {
                    expected: active.to_string(),
                    found: identifier.to_string(),
                });
            }
        }

        let record = self
            .records
            .get_mut(identifier)
            .ok_or_else(|| MeasureError::UnrecognizedIdentifier(identifier.to_string()))?;

        let started_at = match (record.state, record.started_at.take()) {
            (MeasurementState::Started, Some(started_at)) => started_at,
            _ => return Err(MeasureError::NotStarted(identifier.to_string())),
        };

        let elapsed = now.saturating_duration_since(started_at);
        record.state = MeasurementState::Stopped;
        record.latest_timed = Some(elapsed);
        self.slot.release(identifier);
        Ok(elapsed)
    }

    /// Prepare and start in one step for block measurements.
    pub fn begin_block(&mut self, identifier: &str, now: Instant) -> Result<()> {
        if let Some(active) = self.slot.holder() {
            return Err(MeasureError::MeasurementAlreadyActive {
                active: active.to_string(),
                requested: identifier.to_string(),
            });
        }

        match self.records.get(identifier).map(|record| record.state) {
            Some(MeasurementState::Prepared) => {
                return Err(MeasureError::Misuse {
                    identifier: identifier.to_string(),
                    reason: PREPARED_BEFORE_BLOCK,
                });
            }
            Some(MeasurementState::Stopped) => {
                return Err(MeasureError::Misuse {
                    identifier: identifier.to_string(),
                    reason: ALREADY_MEASURED,
                });
            }
            _ => {}
        }

        self.prepare(identifier)?;
        self.start(identifier, now)
    }

    /// Stores an untimed value. Returns the identifier of a conflicting open
    /// measurement, if any; the value is stored regardless.
    pub fn record_untimed(&mut self, identifier: &str, value: f64) -> Option<String> {
        let conflicting = self
            .slot
            .holder()
            .filter(|active| *active != identifier)
            .map(str::to_string);

        self.records
            .entry(identifier.to_string())
            .or_default()
            .latest_untimed = Some(value);

        conflicting
    }

    pub fn discard(&mut self, identifier: &str) {
        if self.records.remove(identifier).is_some() {
            self.slot.release(identifier);
        }
    }

    pub fn state_of(&self, identifier: &str) -> MeasurementState {
        self.records
            .get(identifier)
            .map(|record| record.state)
            .unwrap_or_default()
    }

    pub fn record(&self, identifier: &str) -> Option<&MeasurementRecord> {
        self.records.get(identifier)
    }

    pub fn active(&self) -> Option<&str> {
        self.slot.holder()
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut entries: Vec<SnapshotEntry> = self
            .records
            .iter()
            .map(|(identifier, record)| record.to_entry(identifier))
            .collect();
        entries.sort_by(|a, b| a.identifier.cmp(&b.identifier));

        Snapshot {
            enabled: true,
            active: self.active().map(str::to_string),
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn later(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    #[test]
    fn test_full_cycle() {
        let mut registry = Registry::new();
        let t0 = Instant::now();

        registry.prepare("A").unwrap();
        assert_eq!(registry.state_of("A"), MeasurementState::Prepared);
        registry.start("A", t0).unwrap();
        assert_eq!(registry.active(), Some("A"));

        let elapsed = registry.stop("A", later(t0, 5)).unwrap();
        assert_eq!(elapsed, Duration::from_millis(5));
        assert_eq!(registry.state_of("A"), MeasurementState::Stopped);
        assert_eq!(registry.active(), None);
        assert_eq!(
            registry.record("A").unwrap().latest_timed,
            Some(Duration::from_millis(5))
        );
    }

    #[test]
    fn test_start_errors() {
        let mut registry = Registry::new();
        let now = Instant::now();

        assert_eq!(
            registry.start("A", now),
            Err(MeasureError::UnrecognizedIdentifier("A".to_string()))
        );

        registry.record_untimed("A", 1.0);
        assert_eq!(
            registry.start("A", now),
            Err(MeasureError::NotPrepared("A".to_string()))
        );
    }

    #[test]
    fn test_stop_errors() {
        let mut registry = Registry::new();
        let now = Instant::now();

        assert_eq!(
            registry.stop("A", now),
            Err(MeasureError::UnrecognizedIdentifier("A".to_string()))
        );

        registry.prepare("A").unwrap();
        assert_eq!(
            registry.stop("A", now),
            Err(MeasureError::NotStarted("A".to_string()))
        );

        registry.start("A", now).unwrap();
        assert_eq!(
            registry.stop("B", now),
            Err(MeasureError::IdentifierMismatch {
                expected: "A".to_string(),
                found: "B".to_string(),
            })
        );
        registry.stop("A", now).unwrap();
        assert_eq!(
            registry.stop("A", now),
            Err(MeasureError::NotStarted("A".to_string()))
        );
    }

    #[test]
    fn test_prepare_other_while_open_is_rejected() {
        let mut registry = Registry::new();
        let now = Instant::now();

        registry.prepare("A").unwrap();
        registry.start("A", now).unwrap();
        assert_eq!(
            registry.prepare("B"),
            Err(MeasureError::MeasurementAlreadyActive {
                active: "A".to_string(),
                requested: "B".to_string(),
            })
        );
        assert!(registry.record("B").is_none());
        assert_eq!(registry.active(), Some("A"));

        registry.stop("A", now).unwrap();
        registry.prepare("B").unwrap();
    }

    #[test]
    fn test_start_unknown_while_open_is_unrecognized() {
        let mut registry = Registry::new();
        let now = Instant::now();

        registry.prepare("A").unwrap();
        registry.start("A", now).unwrap();
        assert_eq!(
            registry.start("B", now),
            Err(MeasureError::UnrecognizedIdentifier("B".to_string()))
        );
        assert_eq!(registry.active(), Some("A"));
    }

    #[test]
    fn test_stopped_is_terminal_until_discard() {
        let mut registry = Registry::new();
        let now = Instant::now();

        registry.prepare("A").unwrap();
        registry.start("A", now).unwrap();
        registry.stop("A", now).unwrap();

        assert!(matches!(
            registry.prepare("A"),
            Err(MeasureError::Misuse { .. })
        ));
        assert_eq!(
            registry.start("A", now),
            Err(MeasureError::NotPrepared("A".to_string()))
        );

        registry.discard("A");
        assert_eq!(registry.state_of("A"), MeasurementState::Unprepared);
        registry.prepare("A").unwrap();
        registry.start("A", now).unwrap();
        registry.stop("A", now).unwrap();
    }

    #[test]
    fn test_reprepare_started_releases_slot() {
        let mut registry = Registry::new();
        let now = Instant::now();

        registry.prepare("A").unwrap();
        registry.start("A", now).unwrap();
        registry.prepare("A").unwrap();

        assert_eq!(registry.state_of("A"), MeasurementState::Prepared);
        assert_eq!(registry.active(), None);
        registry.prepare("B").unwrap();
        registry.start("B", now).unwrap();
    }

    #[test]
    fn test_discard_open_measurement_releases_slot() {
        let mut registry = Registry::new();
        let now = Instant::now();

        registry.prepare("A").unwrap();
        registry.start("A", now).unwrap();
        registry.discard("A");
        registry.discard("never-seen");

        assert_eq!(registry.active(), None);
        assert!(registry.record("A").is_none());
    }

    #[test]
    fn test_begin_block_rules() {
        let mut registry = Registry::new();
        let now = Instant::now();

        registry.prepare("prepared").unwrap();
        assert!(matches!(
            registry.begin_block("prepared", now),
            Err(MeasureError::Misuse { .. })
        ));

        registry.begin_block("block", now).unwrap();
        assert_eq!(registry.state_of("block"), MeasurementState::Started);
        assert!(matches!(
            registry.begin_block("other", now),
            Err(MeasureError::MeasurementAlreadyActive { .. })
        ));
        registry.stop("block", now).unwrap();

        assert!(matches!(
            registry.begin_block("block", now),
            Err(MeasureError::Misuse { .. })
        ));
    }

    #[test]
    fn test_untimed_reports_conflict() {
        let mut registry = Registry::new();
        let now = Instant::now();

        assert_eq!(registry.record_untimed("X", 42.0), None);
        registry.prepare("A").unwrap();
        registry.start("A", now).unwrap();
        assert_eq!(registry.record_untimed("X", 7.0), Some("A".to_string()));
        assert_eq!(registry.record("X").unwrap().latest_untimed, Some(7.0));
        assert_eq!(registry.record_untimed("A", 1.0), None);
    }

    #[test]
    fn test_discard_then_remeasure_overwrites() {
        let mut registry = Registry::new();
        let t0 = Instant::now();

        for millis in 1..=3 {
            registry.discard("A");
            registry.prepare("A").unwrap();
            registry.start("A", t0).unwrap();
            registry.stop("A", later(t0, millis)).unwrap();
        }

        let entry = registry.snapshot().entries.remove(0);
        assert_eq!(entry.latest_timed_ns, Some(3_000_000));
        assert_eq!(entry.state, MeasurementState::Stopped);
    }

    #[test]
    fn test_oversized_duration_saturates() {
        let record = MeasurementRecord {
            state: MeasurementState::Stopped,
            latest_timed: Some(Duration::MAX),
            ..MeasurementRecord::default()
        };
        assert_eq!(record.to_entry("huge").latest_timed_ns, Some(u64::MAX));
    }

    #[test]
    fn test_snapshot_sorted() {
        let mut registry = Registry::new();
        registry.record_untimed("b", 2.0);
        registry.record_untimed("a", 1.0);

        let snapshot = registry.snapshot();
        let ids: Vec<&str> = snapshot
            .entries
            .iter()
            .map(|e| e.identifier.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(snapshot.enabled);
    }
}
