mod clock;
mod global;
mod guard;
mod registry;
mod slot;
mod tracker;

pub use global::{global, install};
pub use guard::{BlockGuard, MeasureGuard, ReportGuard};
pub use tracker::MeasurementTracker;

/// Measures an expression against the global tracker and evaluates to its value.
///
/// ```rust
/// let total = perfmark::measure_block!("SumRange", (0..100).sum::<u32>());
/// assert_eq!(total, 4950);
/// ```
///
/// Panics if another measurement is open or the identifier was used before.
#[macro_export]
macro_rules! measure_block {
    ($label:expr, $expr:expr) => {{
        let _perfmark_guard = $crate::MeasureGuard::new($label);
        $expr
    }};
}
