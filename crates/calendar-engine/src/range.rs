//! Inclusive date ranges.

use serde::Serialize;

use crate::calendar::YearMonth;
use crate::date::CalendarDate;

/// An inclusive span of days with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CalendarRange {
    start: CalendarDate,
    end: CalendarDate,
}

impl CalendarRange {
    /// Build a range from two dates in either order; they are swapped when
    /// `b` comes before `a`.
    ///
    /// # Examples
    ///
    /// ```
    /// use calendar_engine::{CalendarDate, CalendarRange};
    ///
    /// let a: CalendarDate = "2024-02-02".parse().unwrap();
    /// let b: CalendarDate = "2024-01-30".parse().unwrap();
    /// let range = CalendarRange::new(a, b);
    /// assert_eq!(range.start(), b);
    /// assert_eq!(range.num_days(), 4);
    /// ```
    pub fn new(a: CalendarDate, b: CalendarDate) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    /// A one-day range.
    pub fn single(date: CalendarDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Build a range whose end defaults to its start.
    pub fn from_start(start: CalendarDate, end: Option<CalendarDate>) -> Self {
        Self::new(start, end.unwrap_or(start))
    }

    pub fn start(&self) -> CalendarDate {
        self.start
    }

    pub fn end(&self) -> CalendarDate {
        self.end
    }

    /// Inclusive number of days, always at least 1.
    pub fn num_days(&self) -> i64 {
        self.start.days_until(&self.end) + 1
    }

    pub fn contains(&self, date: &CalendarDate) -> bool {
        self.start <= *date && *date <= self.end
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    /// Every date from start to end inclusive.
    pub fn iter(&self) -> RangeIter {
        RangeIter {
            next: Some(self.start),
            end: self.end,
        }
    }

    /// Call `callback(date, index, is_last)` for every date in the range.
    ///
    /// The callback receives a copy; the range's own endpoints never move.
    pub fn each<F>(&self, mut callback: F)
    where
        F: FnMut(CalendarDate, usize, bool),
    {
        for (index, date) in self.iter().enumerate() {
            callback(date, index, date == self.end);
        }
    }

    /// Every month touched by the range, in order.
    pub fn months(&self) -> impl Iterator<Item = YearMonth> {
        let last = self.end.year_month();
        std::iter::successors(Some(self.start.year_month()), move |ym| {
            (*ym < last).then(|| ym.succ())
        })
    }
}

impl From<CalendarDate> for CalendarRange {
    fn from(date: CalendarDate) -> Self {
        Self::single(date)
    }
}

impl<'a> IntoIterator for &'a CalendarRange {
    type Item = CalendarDate;
    type IntoIter = RangeIter;

    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

/// Iterator over the days of a [`CalendarRange`].
#[derive(Debug, Clone)]
pub struct RangeIter {
    next: Option<CalendarDate>,
    end: CalendarDate,
}

impl Iterator for RangeIter {
    type Item = CalendarDate;

    fn next(&mut self) -> Option<CalendarDate> {
        let current = self.next?;
        self.next = if current < self.end {
            Some(current.offset_by(1))
        } else {
            None
        };
        Some(current)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_reversed_inputs_are_swapped() {
        let range = CalendarRange::new(date("2024-03-10"), date("2024-03-01"));
        assert_eq!(range.start(), date("2024-03-01"));
        assert_eq!(range.end(), date("2024-03-10"));
    }

    #[test]
    fn test_end_defaults_to_start() {
        let range = CalendarRange::from_start(date("2024-03-10"), None);
        assert!(range.is_single_day());
        assert_eq!(range.num_days(), 1);
    }

    #[test]
    fn test_num_days_full_year() {
        let common = CalendarRange::new(date("2023-01-01"), date("2023-12-31"));
        assert_eq!(common.num_days(), 365);
        let leap = CalendarRange::new(date("2024-01-01"), date("2024-12-31"));
        assert_eq!(leap.num_days(), 366);
    }

    #[test]
    fn test_num_days_across_dst_dates() {
        // US and EU daylight-saving switches fall inside these ranges
        let spring = CalendarRange::new(date("2026-03-07"), date("2026-03-09"));
        assert_eq!(spring.num_days(), 3);
        let autumn = CalendarRange::new(date("2026-10-24"), date("2026-10-26"));
        assert_eq!(autumn.num_days(), 3);
    }

    #[test]
    fn test_each_reports_index_and_last() {
        let range = CalendarRange::new(date("2024-01-30"), date("2024-02-02"));
        let mut seen = Vec::new();
        range.each(|d, i, last| seen.push((d.to_string(), i, last)));
        assert_eq!(
            seen,
            vec![
                ("2024-01-30".to_string(), 0, false),
                ("2024-01-31".to_string(), 1, false),
                ("2024-02-01".to_string(), 2, false),
                ("2024-02-02".to_string(), 3, true),
            ]
        );
        assert_eq!(range.start(), date("2024-01-30"));
    }

    #[test]
    fn test_each_single_day() {
        let range = CalendarRange::single(date("2024-02-29"));
        let mut calls = 0;
        range.each(|d, i, last| {
            assert_eq!(d, date("2024-02-29"));
            assert_eq!(i, 0);
            assert!(last);
            calls += 1;
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_months_across_year_boundary() {
        let range = CalendarRange::new(date("2023-11-15"), date("2024-02-01"));
        let months: Vec<String> = range.months().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_contains() {
        let range = CalendarRange::new(date("2024-01-30"), date("2024-02-02"));
        assert!(range.contains(&date("2024-01-31")));
        assert!(range.contains(&date("2024-02-02")));
        assert!(!range.contains(&date("2024-02-03")));
    }

    fn arb_date() -> impl Strategy<Value = CalendarDate> {
        (1950i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| CalendarDate::new(y, m, d).unwrap())
    }

    proptest! {
        #[test]
        fn prop_range_is_normalized(a in arb_date(), b in arb_date()) {
            let range = CalendarRange::new(a, b);
            prop_assert!(range.start().key() <= range.end().key());
            prop_assert!(range.num_days() >= 1);
            prop_assert_eq!(range, CalendarRange::new(b, a));
        }

        #[test]
        fn prop_iter_length_matches_num_days(a in arb_date(), n in 0i64..400) {
            let range = CalendarRange::new(a, a.offset_by(n));
            prop_assert_eq!(range.iter().count() as i64, range.num_days());
        }
    }
}
