//! Calendar dates without a time of day.
//!
//! [`CalendarDate`] is a validated `(year, month, day)` triple. It is `Copy`,
//! so advancing a date in a loop always works on an independent value and
//! never aliases the date it was copied from.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::calendar::{self, YearMonth};
use crate::error::{CalendarError, Result};

/// A day in the proleptic Gregorian calendar.
///
/// Always satisfies `1 <= month <= 12` and `1 <= day <= num_days()`.
/// Equality and ordering follow [`CalendarDate::key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarDate {
    year: i32,
    month: u32,
    day: u32,
}

impl CalendarDate {
    /// Create a date, rejecting out-of-range months and days.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDate`] for e.g. April 31 or February 29
    /// in a common year.
    ///
    /// # Examples
    ///
    /// ```
    /// use calendar_engine::CalendarDate;
    ///
    /// let date = CalendarDate::new(2024, 2, 29).unwrap();
    /// assert_eq!(date.to_string(), "2024-02-29");
    /// assert!(CalendarDate::new(2023, 2, 29).is_err());
    /// assert!(CalendarDate::new(2024, 4, 31).is_err());
    /// ```
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidDate(format!(
                "{year:04}-{month:02}-{day:02}: month out of range 1-12"
            )));
        }
        let num_days = calendar::days_in_month(year, month);
        if day < 1 || day > num_days {
            return Err(CalendarError::InvalidDate(format!(
                "{year:04}-{month:02}-{day:02}: day out of range 1-{num_days}"
            )));
        }
        Ok(Self { year, month, day })
    }

    /// Parse from the user-facing components captured by a pattern, which
    /// arrive as strings (e.g. `"03"` for March).
    pub fn from_parts(year: &str, month: &str, day: &str) -> Result<Self> {
        let parse = |part: &str, what: &str| {
            part.trim().parse::<i64>().map_err(|_| {
                CalendarError::InvalidDate(format!("{what} '{part}' is not a number"))
            })
        };
        let year = i32::try_from(parse(year, "year")?)
            .map_err(|_| CalendarError::InvalidDate(format!("year '{year}' out of range")))?;
        let month = u32::try_from(parse(month, "month")?)
            .map_err(|_| CalendarError::InvalidDate(format!("month '{month}' out of range")))?;
        let day = u32::try_from(parse(day, "day")?)
            .map_err(|_| CalendarError::InvalidDate(format!("day '{day}' out of range")))?;
        Self::new(year, month, day)
    }

    /// The current date on the local wall clock.
    pub fn today() -> Self {
        Local::now().date_naive().into()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }

    /// Sortable key: `year * 10000 + month * 100 + day`.
    pub fn key(&self) -> i64 {
        i64::from(self.year) * 10_000 + i64::from(self.month) * 100 + i64::from(self.day)
    }

    /// Number of days in this date's month.
    pub fn num_days(&self) -> u32 {
        calendar::days_in_month(self.year, self.month)
    }

    /// Weekday, 0 = Sunday ... 6 = Saturday.
    pub fn weekday(&self) -> u32 {
        calendar::day_of_week(self.year, self.month, self.day)
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday(), 0 | 6)
    }

    pub fn week_number(&self) -> u32 {
        calendar::week_number(self.year, self.month, self.day)
    }

    /// Days since 1970-01-01.
    pub fn day_number(&self) -> i64 {
        calendar::day_number(self.year, self.month, self.day)
    }

    /// Advance by `days` calendar days, one day at a time, rolling the day
    /// into the next month and the month into the next year as they overflow.
    ///
    /// A negative count moves backwards (see [`decrease_with`](Self::decrease_with)).
    pub fn increase_with(&mut self, days: i64) -> &mut Self {
        if days < 0 {
            return self.decrease_with(days.saturating_neg());
        }
        for _ in 0..days {
            self.day += 1;
            if self.day > self.num_days() {
                if self.month >= 12 {
                    self.year += 1;
                    self.month = 1;
                } else {
                    self.month += 1;
                }
                self.day = 1;
            }
        }
        self
    }

    /// Move back by `days` calendar days, rolling into the previous month
    /// and year as they underflow. A negative count moves forwards.
    pub fn decrease_with(&mut self, days: i64) -> &mut Self {
        if days < 0 {
            return self.increase_with(days.saturating_neg());
        }
        for _ in 0..days {
            if self.day > 1 {
                self.day -= 1;
            } else {
                if self.month <= 1 {
                    self.year -= 1;
                    self.month = 12;
                } else {
                    self.month -= 1;
                }
                self.day = self.num_days();
            }
        }
        self
    }

    /// A copy of this date moved by `days` (negative moves back).
    pub fn offset_by(&self, days: i64) -> Self {
        let mut date = *self;
        date.increase_with(days);
        date
    }

    /// Whole days from `self` to `other` (negative if `other` is earlier).
    pub fn days_until(&self, other: &CalendarDate) -> i64 {
        other.day_number() - self.day_number()
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl PartialOrd for CalendarDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CalendarDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for CalendarDate {
    /// Canonical `YYYY-MM-DD`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for CalendarDate {
    type Err = CalendarError;

    /// Parse the canonical `YYYY-MM-DD` form.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut parts = s.splitn(3, '-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(y), Some(m), Some(d)) if y.len() == 4 && m.len() == 2 && d.len() == 2 => {
                Self::from_parts(y, m, d)
            }
            _ => Err(CalendarError::InvalidDate(format!(
                "'{s}': expected YYYY-MM-DD"
            ))),
        }
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
