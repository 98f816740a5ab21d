//! Reference clock abstraction.
//!
//! Core evaluation takes "today" as input; callers obtain it from a `Clock`
//! so the daily trigger and tests share one code path.

use chrono::{Local, NaiveDate};

/// Source of the current local date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock};
    use chrono::NaiveDate;

    #[test]
    fn fixed_clock_returns_given_date() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 25).expect("valid date");
        let clock: Box<dyn Clock> = Box::new(FixedClock::new(date));
        assert_eq!(clock.today(), date);
    }
}
