use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time in unix seconds
pub trait UnixClock {
    fn unix_timestamp(&self) -> i64;
}

/// Host system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl UnixClock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as i64)
            .unwrap_or_default()
    }
}
