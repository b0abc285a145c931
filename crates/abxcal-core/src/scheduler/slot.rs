//! Free-slot search within a working day.
//!
//! Candidates start on each whole hour of the working window. The first
//! candidate that overlaps no busy interval wins; when every candidate collides
//! the slot is placed right after the last busy interval. Probing is hourly,
//! so a free gap that does not start on the hour is not found.
//!
//! No slot exists when its end would fall outside the representable
//! calendar.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::storage::SchedulingConfig;

/// Half-open interval `[start, end)` that blocks scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl BusyInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Check if this interval overlaps `[start, end)`.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start < self.end && end > self.start
    }
}

/// A proposed appointment time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Slot {
    fn starting_at(start: NaiveDateTime, duration: Duration) -> Option<Self> {
        Some(Self {
            start,
            end: start.checked_add_signed(duration)?,
        })
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Convert a fractional number of hours into a duration, rounded to the
/// millisecond. Returns `None` for non-positive or non-finite input.
pub fn hours_to_duration(hours: f64) -> Option<Duration> {
    if !hours.is_finite() || hours <= 0.0 {
        return None;
    }
    let millis = (hours * 3_600_000.0).round();
    if millis < 1.0 || millis > i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}

/// Finds the first free hourly slot on a day.
#[derive(Debug, Clone)]
pub struct SlotFinder {
    day_start_hour: u32,
    day_end_hour: u32,
    default_duration: Duration,
}

impl SlotFinder {
    /// Create a finder probing 08:00 to 18:00 with a one hour default.
    pub fn new() -> Self {
        Self::with_config(&SchedulingConfig::default())
    }

    /// Create with custom config
    pub fn with_config(config: &SchedulingConfig) -> Self {
        Self {
            day_start_hour: config.day_start_hour,
            day_end_hour: config.day_end_hour.min(24),
            default_duration: hours_to_duration(config.default_duration_hours)
                .unwrap_or_else(|| Duration::hours(1)),
        }
    }

    /// Duration used when the caller has none.
    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    /// Resolve an optional duration in hours, falling back to the default.
    pub fn duration_for(&self, hours: Option<f64>) -> Duration {
        hours
            .and_then(hours_to_duration)
            .unwrap_or(self.default_duration)
    }

    /// Find a slot of `duration_hours` on `day`.
    ///
    /// `busy` should be ordered by start time; its last element anchors the
    /// fallback when no hourly candidate is free. A non-positive duration is
    /// replaced by the default duration.
    pub fn find_slot(&self, day: NaiveDate, duration_hours: f64, busy: &[BusyInterval]) -> Option<Slot> {
        self.find_slot_for(day, self.duration_for(Some(duration_hours)), busy)
    }

    /// [`find_slot`](Self::find_slot) with an exact duration.
    pub fn find_slot_for(&self, day: NaiveDate, duration: Duration, busy: &[BusyInterval]) -> Option<Slot> {
        let midnight = day.and_time(NaiveTime::MIN);
        let at_hour = |hour: u32| midnight.checked_add_signed(Duration::hours(hour.into()));

        for hour in self.day_start_hour..self.day_end_hour {
            // an end past the calendar's range means no slot at all
            let candidate = Slot::starting_at(at_hour(hour)?, duration)?;
            if !busy.iter().any(|b| b.overlaps(candidate.start, candidate.end)) {
                return Some(candidate);
            }
        }

        match busy.last() {
            Some(last) => Slot::starting_at(last.end, duration),
            None => Slot::starting_at(at_hour(self.day_end_hour)?, duration),
        }
    }
}

impl Default for SlotFinder {
    fn default() -> Self {
        Self::new()
    }
}
