//! Pure Gregorian calendar arithmetic.
//!
//! Everything here works on plain `(year, month, day)` integers and never
//! touches the system clock, so the results are identical on every host.
//!
//! # Functions
//!
//! - [`is_leap_year`] — Gregorian leap-year rule
//! - [`days_in_month`] — Number of days in a month
//! - [`day_of_week`] — Weekday of a date (0 = Sunday)
//! - [`day_number`] — Days since 1970-01-01, for date-only differences
//! - [`week_number`] — Week label used to line up adjacent month grids

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{CalendarError, Result};

/// Cumulative day offsets at the start of each month in a non-leap year,
/// indexed by 1-based month (index 0 is unused).
const MONTH_OFFSETS: [u32; 13] = [0, 0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Whether `year` is a leap year in the proleptic Gregorian calendar.
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` (1-12) of `year`.
///
/// Months before August alternate 31/30 starting with January; from August
/// on the alternation flips, so both July and August have 31 days.
///
/// # Examples
///
/// ```
/// use calendar_engine::calendar::days_in_month;
///
/// assert_eq!(days_in_month(2024, 2), 29);
/// assert_eq!(days_in_month(2023, 2), 28);
/// assert_eq!(days_in_month(2024, 7), 31);
/// assert_eq!(days_in_month(2024, 8), 31);
/// assert_eq!(days_in_month(2024, 9), 30);
/// ```
pub fn days_in_month(year: i32, month: u32) -> u32 {
    if month == 2 {
        if is_leap_year(year) {
            29
        } else {
            28
        }
    } else if month < 8 {
        30 + month % 2
    } else {
        31 - month % 2
    }
}

/// Days elapsed since 1970-01-01 (negative before it).
///
/// Date-only arithmetic: differences between two day numbers are exact
/// whole days with no clock or daylight-saving noise.
pub fn day_number(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = y.div_euclid(400);
    let year_of_era = y - era * 400;
    let march_based_month = (i64::from(month) + 9) % 12;
    let day_of_year = (153 * march_based_month + 2) / 5 + i64::from(day) - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

/// Weekday of a date: 0 = Sunday, 1 = Monday, ..., 6 = Saturday.
pub fn day_of_week(year: i32, month: u32, day: u32) -> u32 {
    // 1970-01-01 was a Thursday.
    (day_number(year, month, day) + 4).rem_euclid(7) as u32
}

/// 1-based day of the year.
pub fn day_of_year(year: i32, month: u32, day: u32) -> u32 {
    let offset = MONTH_OFFSETS.get(month as usize).copied().unwrap_or(0);
    let leap_shift = u32::from(month > 2 && is_leap_year(year));
    offset + day + leap_shift
}

/// Week number of a date, counted from Monday-start weeks.
///
/// When January 1 falls on a Friday, Saturday or Sunday, the first partial
/// week belongs to the previous year and the count shifts down by one; the
/// days of that partial week get week 52.
///
/// This is a consistent label for lining up month grids, not a strict
/// ISO-8601 week number (late-December days can report 53 where ISO says 1).
pub fn week_number(year: i32, month: u32, day: u32) -> u32 {
    let ordinal = day_of_year(year, month, day);
    let jan1 = day_of_week(year, 1, 1);
    let jan1_from_monday = (jan1 + 6) % 7;

    let mut week = (ordinal - 1 + jan1_from_monday) / 7 + 1;
    if jan1 == 0 || jan1 >= 5 {
        week -= 1;
        if week < 1 {
            week = 52;
        }
    }
    week
}

// ── YearMonth ───────────────────────────────────────────────────────────────

/// A calendar month: the cache key for month views.
///
/// Ordering is chronological (year first, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Create a month key, rejecting months outside 1-12.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidDate(format!(
                "month {month} out of range 1-12"
            )));
        }
        Ok(Self { year, month })
    }

    /// The following month, rolling December into January of the next year.
    pub fn succ(self) -> Self {
        if self.month >= 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The preceding month, rolling January into December of the previous year.
    pub fn pred(self) -> Self {
        if self.month <= 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// `year * 100 + month`, the sortable composite used to bound month walks.
    pub fn composite(self) -> i64 {
        i64::from(self.year) * 100 + i64::from(self.month)
    }

    pub fn num_days(self) -> u32 {
        days_in_month(self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = CalendarError;

    /// Parse `"YYYY-MM"`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CalendarError::InvalidDate(format!("'{s}': expected YYYY-MM"));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
