use crate::domain::ports::Clock;
use chrono::{NaiveDate, Utc};

/// Wall clock in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    fn epoch_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock frozen at a given instant, for deterministic runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
    epoch_millis: i64,
}

impl FixedClock {
    pub fn new(today: NaiveDate, epoch_millis: i64) -> Self {
        Self {
            today,
            epoch_millis,
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn epoch_millis(&self) -> i64 {
        self.epoch_millis
    }
}
