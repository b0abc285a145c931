//! Next-occurrence arithmetic for recurrence rules.

use chrono::{Datelike, Duration, NaiveDateTime, Weekday};

use crate::contacts::{RecurrenceRule, RecurrenceUnit};

/// Next business-day occurrence `value` units after `last_start`.
///
/// The time of day is kept. A result on Saturday moves forward two days and
/// one on Sunday moves forward one day, so both land on the following Monday.
/// Returns `None` when the result falls outside the representable calendar.
pub fn next_occurrence(last_start: NaiveDateTime, value: u32, unit: RecurrenceUnit) -> Option<NaiveDateTime> {
    let step = i64::from(value).checked_mul(unit.days())?;
    let next = last_start.checked_add_signed(Duration::try_days(step)?)?;

    let shift = match next.weekday() {
        Weekday::Sat => 2,
        Weekday::Sun => 1,
        _ => return Some(next),
    };
    next.checked_add_signed(Duration::days(shift))
}

/// [`next_occurrence`] for a whole rule.
pub fn next_for_rule(last_start: NaiveDateTime, rule: RecurrenceRule) -> Option<NaiveDateTime> {
    next_occurrence(last_start, rule.value, rule.unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn one_week_from_friday_is_next_friday() {
        // 2024-05-03 is a Friday
        let next = next_occurrence(at(2024, 5, 3, 9), 1, RecurrenceUnit::Week).unwrap();
        assert_eq!(next, at(2024, 5, 10, 9));
        assert_eq!(next.weekday(), Weekday::Fri);
    }

    #[test]
    fn two_days_from_friday_lands_on_monday() {
        let next = next_occurrence(at(2024, 5, 3, 9), 2, RecurrenceUnit::Day).unwrap();
        assert_eq!(next, at(2024, 5, 6, 9));
    }

    #[test]
    fn saturday_moves_two_days() {
        let next = next_occurrence(at(2024, 5, 3, 14), 1, RecurrenceUnit::Day).unwrap();
        assert_eq!(next, at(2024, 5, 6, 14));
    }

    #[test]
    fn weekday_result_is_unchanged() {
        // Monday + 3 days = Thursday
        let next = next_occurrence(at(2024, 5, 6, 10), 3, RecurrenceUnit::Day).unwrap();
        assert_eq!(next, at(2024, 5, 9, 10));
    }

    #[test]
    fn crosses_month_and_year_boundaries() {
        // 2024-12-30 is a Monday
        let next = next_occurrence(at(2024, 12, 30, 8), 1, RecurrenceUnit::Week).unwrap();
        assert_eq!(next, at(2025, 1, 6, 8));
    }

    #[test]
    fn rule_helper_matches_free_function() {
        let start = at(2024, 5, 1, 8);
        let rule = RecurrenceRule::new(2, RecurrenceUnit::Week);
        assert_eq!(next_for_rule(start, rule), next_occurrence(start, 2, RecurrenceUnit::Week));
    }

    #[test]
    fn out_of_range_rule_yields_none() {
        let start = at(2024, 5, 3, 9);
        assert_eq!(next_occurrence(start, u32::MAX, RecurrenceUnit::Week), None);
        assert_eq!(next_occurrence(start, u32::MAX, RecurrenceUnit::Day), None);
        assert_eq!(next_for_rule(NaiveDateTime::MAX, RecurrenceRule::new(1, RecurrenceUnit::Day)), None);
    }

    fn any_start() -> impl Strategy<Value = NaiveDateTime> {
        (0i64..3650, 0u32..24, 0u32..60).prop_map(|(days, h, m)| {
            at(2020, 1, 1, 0) + Duration::days(days) + Duration::hours(h.into()) + Duration::minutes(m.into())
        })
    }

    fn any_unit() -> impl Strategy<Value = RecurrenceUnit> {
        prop_oneof![Just(RecurrenceUnit::Day), Just(RecurrenceUnit::Week)]
    }

    proptest! {
        #[test]
        fn result_is_later_and_on_a_weekday(start in any_start(), value in 1u32..60, unit in any_unit()) {
            let next = next_occurrence(start, value, unit).unwrap();
            prop_assert!(next > start);
            prop_assert!(!matches!(next.weekday(), Weekday::Sat | Weekday::Sun));
            prop_assert_eq!(next.time(), start.time());
        }

        #[test]
        fn weeks_behave_like_seven_days(start in any_start(), weeks in 1u32..20) {
            prop_assert_eq!(
                next_occurrence(start, weeks, RecurrenceUnit::Week),
                next_occurrence(start, weeks * 7, RecurrenceUnit::Day)
            );
        }

        #[test]
        fn weekday_starts_keep_their_weekday_for_whole_weeks(start in any_start(), weeks in 1u32..20) {
            prop_assume!(!matches!(start.weekday(), Weekday::Sat | Weekday::Sun));
            let next = next_occurrence(start, weeks, RecurrenceUnit::Week).unwrap();
            prop_assert_eq!(next.weekday(), start.weekday());
            prop_assert_eq!((next - start).num_days(), i64::from(weeks) * 7);
        }
    }
}
