//! System Clock - Wall-Clock Implementation of the Clock Port

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// Wall-clock time source for production wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
