//! Marked dates: per-day classes supplied by the embedding page
//! (holidays, booked days, ...).
//!
//! Input is a flat list of `{ "date": "YYYY-MM-DD", "className": "..." }`
//! records; it is regrouped by year and month so a month view can pick up
//! its marks with one lookup when it is built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::date::CalendarDate;
use crate::error::{CalendarError, Result};
use crate::month_view::MonthView;

/// One marked date record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkedDate {
    pub date: CalendarDate,
    pub class_name: String,
}

/// A day-of-month and the class it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayMark {
    pub day: u32,
    pub class_name: String,
}

/// Marked dates grouped by year, then month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkedDates {
    by_year: BTreeMap<i32, BTreeMap<u32, Vec<DayMark>>>,
}

impl MarkedDates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of marked date records.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<MarkedDate> = serde_json::from_str(json)
            .map_err(|e| CalendarError::InvalidOption(format!("marked dates: {e}")))?;
        Ok(records.into_iter().collect())
    }

    pub fn insert(&mut self, mark: MarkedDate) {
        self.by_year
            .entry(mark.date.year())
            .or_default()
            .entry(mark.date.month())
            .or_default()
            .push(DayMark {
                day: mark.date.day(),
                class_name: mark.class_name,
            });
    }

    /// Marks falling in `month`, in input order.
    pub fn for_month(&self, month: YearMonth) -> &[DayMark] {
        self.by_year
            .get(&month.year)
            .and_then(|months| months.get(&month.month))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_year
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add this month's marks to `view`'s cells.
    pub fn apply(&self, view: &mut MonthView) {
        for mark in self.for_month(view.year_month()) {
            if let Some(cell) = view.cell_mut(mark.day) {
                cell.state.marked.insert(mark.class_name.clone());
            }
        }
    }
}

impl FromIterator<MarkedDate> for MarkedDates {
    fn from_iter<I: IntoIterator<Item = MarkedDate>>(iter: I) -> Self {
        let mut marked = Self::new();
        for mark in iter {
            marked.insert(mark);
        }
        marked
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
