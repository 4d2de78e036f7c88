use perfmark::IGNORED_IDENTIFIER;
use std::time::Duration;

const APP_LAUNCH: &str = "AppLaunch";
const LOAD_CONFIG: &str = IGNORED_IDENTIFIER;

#[perfmark::measure("Migrate250Records")]
fn migrate_records(count: u64) {
    for _ in 0..count {
        std::hint::black_box(vec![0u8; 64]);
    }
    std::thread::sleep(Duration::from_millis(3));
}

fn load_config() {
    let tracker = perfmark::global();
    tracker
        .measure_block(LOAD_CONFIG, || std::thread::sleep(Duration::from_millis(1)))
        .expect("load config measurement");
}

#[perfmark::main]
fn main() -> Result<(), perfmark::MeasureError> {
    let tracker = perfmark::global();

    tracker.prepare_to_measure(APP_LAUNCH)?;
    tracker.start(APP_LAUNCH)?;
    std::thread::sleep(Duration::from_millis(5));
    tracker.stop(APP_LAUNCH)?;

    load_config();
    migrate_records(250);

    let ratio = perfmark::measure_block!("CacheWarmup", 0.82);
    tracker.record_untimed_measurement(ratio, "CacheHitRatio");

    println!(
        "{APP_LAUNCH} took {:?}",
        tracker.newest_timed_measurement(APP_LAUNCH)
    );
    Ok(())
}
