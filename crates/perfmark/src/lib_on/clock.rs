#[cfg(target_os = "linux")]
pub(crate) use quanta::Instant;

#[cfg(not(target_os = "linux"))]
pub(crate) use std::time::Instant;
