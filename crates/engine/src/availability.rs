//! Date-range overlap checks for bookings.
//!
//! Stays are half-open intervals of calendar dates, `[check_in, check_out)`:
//! the check-out day of one stay can be the check-in day of the next.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// A non-empty `[start, end)` range of calendar dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting `end <= start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> ResultEngine<Self> {
        if end <= start {
            return Err(EngineError::InvalidArgument(
                "check_out_date must be after check_in_date".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of nights covered by the range.
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Returns `true` when both ranges share at least one night.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Returns `true` if `candidate` overlaps any of `existing`.
///
/// Callers only pass the ranges of confirmed bookings: pending and cancelled
/// bookings never block a request.
pub fn has_conflict<I>(candidate: &DateRange, existing: I) -> bool
where
    I: IntoIterator<Item = DateRange>,
{
    existing.into_iter().any(|range| candidate.overlaps(&range))
}
