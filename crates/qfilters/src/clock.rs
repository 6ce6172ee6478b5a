//! Time source for date-relative filters.
//!
//! Filters that depend on "today" read it from a [`Clock`] so evaluation can
//! be pinned to a known date.

use std::fmt;

use chrono::{Local, NaiveDate};

/// Supplies the current date.
pub trait Clock: Send + Sync + fmt::Debug {
    fn today(&self) -> NaiveDate;
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stopped at one date.
///
/// ```
/// use qfilters::{Clock, FixedClock};
/// use qfilters::chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// assert_eq!(FixedClock(day).today(), day);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
