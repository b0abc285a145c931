//! Summed appointment time, formatted for day and week headers.

use serde::{Deserialize, Serialize};

use super::Event;

/// Output shape of [`format_minutes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationStyle {
    /// `"3h05 (3.08h)"`
    Wide,
    /// `"3.08h"`
    Compact,
}

/// Sum of `end - start` over `events`, in whole minutes.
pub fn total_minutes<'a>(events: impl IntoIterator<Item = &'a Event>) -> i64 {
    let seconds: i64 = events
        .into_iter()
        .map(|e| (e.end - e.start).num_seconds())
        .sum();
    seconds / 60
}

pub fn format_minutes(total_minutes: i64, style: DurationStyle) -> String {
    let decimal_hours = total_minutes as f64 / 60.0;
    match style {
        DurationStyle::Wide => {
            let hours = total_minutes.div_euclid(60);
            let minutes = total_minutes.rem_euclid(60);
            format!("{hours}h{minutes:02} ({decimal_hours:.2}h)")
        }
        DurationStyle::Compact => format!("{decimal_hours:.2}h"),
    }
}

pub fn total_duration<'a>(events: impl IntoIterator<Item = &'a Event>, style: DurationStyle) -> String {
    format_minutes(total_minutes(events), style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventDraft;
    use chrono::{Duration, NaiveDate};

    fn event(minutes: i64) -> Event {
        let start = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        EventDraft::new(start, start + Duration::minutes(minutes))
            .confirmed()
            .into_event()
            .unwrap()
    }

    #[test]
    fn wide_format_pads_minutes() {
        assert_eq!(format_minutes(185, DurationStyle::Wide), "3h05 (3.08h)");
        assert_eq!(format_minutes(0, DurationStyle::Wide), "0h00 (0.00h)");
        assert_eq!(format_minutes(90, DurationStyle::Wide), "1h30 (1.50h)");
    }

    #[test]
    fn compact_format_is_decimal_hours() {
        assert_eq!(format_minutes(45, DurationStyle::Compact), "0.75h");
        assert_eq!(format_minutes(600, DurationStyle::Compact), "10.00h");
    }

    #[test]
    fn totals_sum_event_lengths() {
        let events = vec![event(60), event(30), event(45)];
        assert_eq!(total_minutes(&events), 135);
        assert_eq!(total_duration(&events, DurationStyle::Wide), "2h15 (2.25h)");
        assert_eq!(total_duration(&[], DurationStyle::Compact), "0.00h");
    }
}
