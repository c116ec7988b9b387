//! Consecutive-day counting over session dates.
//!
//! Two different questions are asked of the same data: the longest run ever
//! (achievements) and the run ending at the most recent session (display).

use std::collections::BTreeSet;

use chrono::NaiveDate;

fn distinct(dates: impl IntoIterator<Item = NaiveDate>) -> Vec<NaiveDate> {
    dates
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn is_next_day(earlier: NaiveDate, later: NaiveDate) -> bool {
    (later - earlier).num_days() == 1
}

/// Longest run of consecutive calendar days. Zero when there are no dates.
#[must_use]
pub fn longest_streak(dates: impl IntoIterator<Item = NaiveDate>) -> u32 {
    let days = distinct(dates);
    if days.is_empty() {
        return 0;
    }

    let mut best = 1;
    let mut current = 1;
    for pair in days.windows(2) {
        if is_next_day(pair[0], pair[1]) {
            current += 1;
            best = best.max(current);
        } else {
            current = 1;
        }
    }
    best
}

/// Run of consecutive days ending at the most recent date. Zero when there are no dates.
#[must_use]
pub fn current_streak(dates: impl IntoIterator<Item = NaiveDate>) -> u32 {
    let days = distinct(dates);
    if days.is_empty() {
        return 0;
    }

    let mut streak = 1;
    for pair in days.windows(2).rev() {
        if is_next_day(pair[0], pair[1]) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn five_consecutive_days() {
        let dates = (1..=5).map(day);
        assert_eq!(longest_streak(dates.clone()), 5);
        assert_eq!(current_streak(dates), 5);
    }

    #[test]
    fn gap_breaks_the_run() {
        let dates = [day(1), day(2), day(4), day(5)];
        assert_eq!(longest_streak(dates), 2);
        assert_eq!(current_streak(dates), 2);
    }

    #[test]
    fn repeated_days_count_once() {
        let dates = [day(3), day(1), day(2), day(2), day(3)];
        assert_eq!(longest_streak(dates), 3);
    }

    #[test]
    fn longest_and_current_can_differ() {
        let dates = [day(1), day(2), day(3), day(4), day(9)];
        assert_eq!(longest_streak(dates), 4);
        assert_eq!(current_streak(dates), 1);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(longest_streak(Vec::<NaiveDate>::new()), 0);
        assert_eq!(current_streak(Vec::<NaiveDate>::new()), 0);
    }

    #[test]
    fn crosses_month_boundary() {
        let dates = [
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        ];
        assert_eq!(longest_streak(dates), 2);
    }
}
