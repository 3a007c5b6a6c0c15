//! Per-month grid facts and per-day cell state.
//!
//! A [`MonthView`] lays one month out on a 7-column grid: leading filler
//! days from the previous month, the month's own days, and trailing filler
//! days from the next month. Each real day has a [`DayCell`] carrying its
//! grid position and an explicit [`CellState`] that renderers project into
//! presentation classes.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::calendar::{self, YearMonth};
use crate::date::CalendarDate;

/// Base class of every day cell.
pub const DAY_CLASS: &str = "cal-day";
/// Class of weekend day cells.
pub const WEEKEND_CLASS: &str = "cal-day-weekend";
/// Class of the cell for the current date.
pub const TODAY_CLASS: &str = "today";
/// Class of cells that cannot be selected.
pub const DISABLED_CLASS: &str = "disabled";
/// Class shared by every highlighted cell; `cal-range-<name>` is added per highlight.
pub const RANGE_CLASS: &str = "cal-range";
/// Class of the first cell of a highlighted range.
pub const RANGE_START_CLASS: &str = "cal-day-rangestart";
/// Class of the last cell of a highlighted range.
pub const RANGE_END_CLASS: &str = "cal-day-rangeend";

/// Mutable presentation state of one day cell.
///
/// Highlights (set by range rendering), marked dates (supplied by the page)
/// and marks (set by pickers, e.g. the selection) are separate families so
/// each can be cleared without touching the others or the static
/// `today`/`disabled` facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CellState {
    pub highlights: BTreeSet<String>,
    pub range_start: bool,
    pub range_end: bool,
    /// Classes from [`MarkedDates`](crate::marked::MarkedDates).
    pub marked: BTreeSet<String>,
    pub marks: BTreeSet<String>,
    pub today: bool,
    pub disabled: bool,
}

impl CellState {
    pub fn is_highlighted(&self) -> bool {
        !self.highlights.is_empty() || self.range_start || self.range_end
    }

    fn clear_highlights(&mut self) {
        self.highlights.clear();
        self.range_start = false;
        self.range_end = false;
    }
}

/// A real (non-filler) day of a month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: CalendarDate,
    /// 0-based grid row.
    pub row: u32,
    /// 0-based grid column after start-of-week rotation.
    pub column: u32,
    pub weekend: bool,
    pub state: CellState,
}

impl DayCell {
    /// Presentation classes for this cell.
    pub fn classes(&self) -> Vec<String> {
        let mut classes = vec![DAY_CLASS.to_string()];
        if self.weekend {
            classes.push(WEEKEND_CLASS.to_string());
        }
        if self.state.today {
            classes.push(TODAY_CLASS.to_string());
        }
        if self.state.disabled {
            classes.push(DISABLED_CLASS.to_string());
        }
        if !self.state.highlights.is_empty() {
            classes.push(RANGE_CLASS.to_string());
            classes.extend(
                self.state
                    .highlights
                    .iter()
                    .map(|name| format!("{RANGE_CLASS}-{name}")),
            );
        }
        if self.state.range_start {
            classes.push(RANGE_START_CLASS.to_string());
        }
        if self.state.range_end {
            classes.push(RANGE_END_CLASS.to_string());
        }
        classes.extend(self.state.marked.iter().cloned());
        classes.extend(self.state.marks.iter().cloned());
        classes
    }
}

/// One slot of the full grid, filler days included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridDay {
    pub date: CalendarDate,
    pub in_month: bool,
}

/// Derived layout of one month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthView {
    year_month: YearMonth,
    start_of_week: u32,
    start_weekday: u32,
    num_days: u32,
    trailing_days: u32,
    start_week: u32,
    end_week: u32,
    cells: Vec<DayCell>,
}

impl MonthView {
    /// Lay out `month` with weeks starting on `start_of_week`
    /// (0 = Sunday ... 6 = Saturday; larger values wrap).
    pub fn build(month: YearMonth, start_of_week: u32) -> Self {
        let start_of_week = start_of_week % 7;
        let num_days = month.num_days();
        let first_weekday = calendar::day_of_week(month.year, month.month, 1);
        let start_weekday = (first_weekday + 7 - start_of_week) % 7;
        let trailing_days = (7 - (start_weekday + num_days) % 7) % 7;

        let cells = (1..=num_days)
            .filter_map(|day| CalendarDate::new(month.year, month.month, day).ok())
            .map(|date| {
                let slot = start_weekday + date.day() - 1;
                DayCell {
                    date,
                    row: slot / 7,
                    column: slot % 7,
                    weekend: date.is_weekend(),
                    state: CellState::default(),
                }
            })
            .collect::<Vec<_>>();

        let grid_start = cells
            .first()
            .map(|c| c.date.offset_by(-i64::from(start_weekday)));
        // First date of the last row
        let last_row_start = cells
            .last()
            .map(|c| c.date.offset_by(i64::from(trailing_days) - 6));
        let start_week = grid_start.map_or(1, |d| d.week_number());
        let end_week = last_row_start.map_or(1, |d| d.week_number());

        debug!(
            month = %month,
            start_of_week,
            start_weekday,
            num_days,
            "built month view"
        );

        Self {
            year_month: month,
            start_of_week,
            start_weekday,
            num_days,
            trailing_days,
            start_week,
            end_week,
            cells,
        }
    }

    pub fn year_month(&self) -> YearMonth {
        self.year_month
    }

    pub fn start_of_week(&self) -> u32 {
        self.start_of_week
    }

    /// Number of leading filler days before the 1st.
    pub fn start_weekday(&self) -> u32 {
        self.start_weekday
    }

    pub fn num_days(&self) -> u32 {
        self.num_days
    }

    /// Number of trailing filler days after the last day.
    pub fn trailing_days(&self) -> u32 {
        self.trailing_days
    }

    /// Week label of the first grid row.
    pub fn start_week(&self) -> u32 {
        self.start_week
    }

    /// Week label of the last grid row.
    pub fn end_week(&self) -> u32 {
        self.end_week
    }

    /// Week label of grid row `row`, taken from the row's first date.
    ///
    /// A row shared with an adjacent month holds the same dates in both
    /// grids, so both report the same label for it.
    pub fn week_of_row(&self, row: u32) -> u32 {
        if row == 0 {
            return self.start_week;
        }
        if row + 1 >= self.num_rows() {
            return self.end_week;
        }
        self.cells
            .first()
            .map(|c| c.date.offset_by(i64::from(row * 7) - i64::from(self.start_weekday)))
            .map_or(self.start_week, |d| d.week_number())
    }

    pub fn num_rows(&self) -> u32 {
        (self.start_weekday + self.num_days + self.trailing_days) / 7
    }

    /// Whether the first grid row also shows days of the previous month.
    pub fn shares_row_with_prev(&self) -> bool {
        self.start_weekday > 0
    }

    /// Whether the last grid row also shows days of the next month.
    pub fn shares_row_with_next(&self) -> bool {
        self.trailing_days > 0
    }

    /// Real day cells, ordered so that day `d` is at index `d - 1`.
    pub fn cells(&self) -> &[DayCell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [DayCell] {
        &mut self.cells
    }

    /// The cell for day-of-month `day`.
    pub fn cell(&self, day: u32) -> Option<&DayCell> {
        let index = usize::try_from(day.checked_sub(1)?).ok()?;
        self.cells.get(index)
    }

    pub fn cell_mut(&mut self, day: u32) -> Option<&mut DayCell> {
        let index = usize::try_from(day.checked_sub(1)?).ok()?;
        self.cells.get_mut(index)
    }

    /// The cell for `date`, if it belongs to this month.
    pub fn cell_for(&self, date: &CalendarDate) -> Option<&DayCell> {
        (date.year_month() == self.year_month)
            .then(|| self.cell(date.day()))
            .flatten()
    }

    pub fn cell_for_mut(&mut self, date: &CalendarDate) -> Option<&mut DayCell> {
        if date.year_month() != self.year_month {
            return None;
        }
        self.cell_mut(date.day())
    }

    /// Full grid rows, filler days from adjacent months included.
    pub fn grid(&self) -> Vec<Vec<GridDay>> {
        let Some(first) = self.cells.first() else {
            return Vec::new();
        };
        let start = first.date.offset_by(-i64::from(self.start_weekday));
        let total = self.num_rows() * 7;
        let mut rows = Vec::with_capacity(self.num_rows() as usize);
        let mut date = start;
        for slot in 0..total {
            if slot % 7 == 0 {
                rows.push(Vec::with_capacity(7));
            }
            if let Some(row) = rows.last_mut() {
                row.push(GridDay {
                    date,
                    in_month: date.year_month() == self.year_month,
                });
            }
            date.increase_with(1);
        }
        rows
    }

    /// Days carrying any highlight or range boundary.
    pub fn highlighted_days(&self) -> Vec<u32> {
        self.cells
            .iter()
            .filter(|c| c.state.is_highlighted())
            .map(|c| c.date.day())
            .collect()
    }

    /// Strip every highlight and range boundary. Idempotent.
    pub fn clear_highlights(&mut self) {
        for cell in &mut self.cells {
            cell.state.clear_highlights();
        }
    }

    /// Strip every marked-date class. Idempotent; picker marks stay.
    pub fn clear_marked_dates(&mut self) {
        for cell in &mut self.cells {
            cell.state.marked.clear();
        }
    }

    /// Strip one mark class from every cell.
    pub fn unmark(&mut self, class_name: &str) {
        for cell in &mut self.cells {
            cell.state.marks.remove(class_name);
        }
    }
}

// ── Providers ───────────────────────────────────────────────────────────────

/// Resolves month views by key, building and caching them on first use.
///
/// Resolution never fails: a month that has not been shown yet is built on
/// demand.
pub trait MonthViewProvider {
    fn month_view(&mut self, month: YearMonth) -> &mut MonthView;
}

/// A plain month view cache.
#[derive(Debug, Clone, Default)]
pub struct MonthCache {
    start_of_week: u32,
    views: BTreeMap<YearMonth, MonthView>,
}

impl MonthCache {
    pub fn new(start_of_week: u32) -> Self {
        Self {
            start_of_week,
            views: BTreeMap::new(),
        }
    }

    pub fn get(&self, month: YearMonth) -> Option<&MonthView> {
        self.views.get(&month)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonthView> {
        self.views.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MonthView> {
        self.views.values_mut()
    }
}

impl MonthViewProvider for MonthCache {
    fn month_view(&mut self, month: YearMonth) -> &mut MonthView {
        let start_of_week = self.start_of_week;
        self.views
            .entry(month)
            .or_insert_with(|| MonthView::build(month, start_of_week))
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
