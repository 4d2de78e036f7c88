use perfmark::{MeasurementTracker, Reporter, Snapshot};
use std::time::Duration;
use tracing::info;

struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, snapshot: &Snapshot) -> Result<(), Box<dyn std::error::Error>> {
        info!("Identifiers measured: {}", snapshot.entries.len());

        for entry in &snapshot.entries {
            info!(
                "  {}: {} newest {:?}, untimed {:?}",
                entry.identifier,
                entry.state,
                entry.latest_timed(),
                entry.latest_untimed
            );
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let tracker = MeasurementTracker::new();

    for i in 0..5u64 {
        let identifier = format!("Batch{i}");
        tracker.measure_block(&identifier, || {
            std::thread::sleep(Duration::from_millis(i))
        })?;
    }
    tracker.record_untimed_measurement(0.35, "CacheHitRatio");

    tracker.report(&TracingReporter)?;
    tracker.report(perfmark::Format::JsonPretty.reporter().as_ref())?;
    Ok(())
}
