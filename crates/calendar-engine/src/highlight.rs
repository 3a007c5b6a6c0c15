//! Multi-month range highlighting.
//!
//! [`render_range`] walks every month a range touches, resolving each month
//! through a [`MonthViewProvider`] (which builds views on demand), and marks
//! the covered day cells with a highlight class. The first covered cell is
//! flagged range-start and the last range-end; a one-day range gets both.
//!
//! Each month also reports its covered grid rows as [`RowSpan`]s. When the
//! range continues into an adjacent month on a shared row, the span counts
//! the filler slots it covers so the bar can run to the grid edge.
//!
//! [`unrender_range`] walks the same months and clears every highlight on
//! them, whichever render applied it.

use serde::Serialize;
use tracing::{debug, trace};

use crate::calendar::YearMonth;
use crate::month_view::{MonthView, MonthViewProvider};
use crate::range::CalendarRange;

/// A horizontal run of highlighted cells within one grid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowSpan {
    pub row: u32,
    /// Week label of the row; equal on both grids of a shared row.
    pub week: u32,
    /// Grid column of the first cell.
    pub column: u32,
    /// Real days of the month covered by the span.
    pub length: u32,
    /// Previous-month filler slots before `column` that the range covers.
    pub leading_filler: u32,
    /// Next-month filler slots after the span that the range covers.
    pub trailing_filler: u32,
    /// This span holds the first day of the range.
    pub first: bool,
    /// This span holds the last day of the range.
    pub last: bool,
}

/// What one render did to one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthHighlight {
    pub month: YearMonth,
    pub first_day: u32,
    pub last_day: u32,
    pub range_start: bool,
    pub range_end: bool,
    pub spans: Vec<RowSpan>,
}

impl MonthHighlight {
    pub fn num_days(&self) -> u32 {
        self.last_day + 1 - self.first_day
    }
}

/// A rendered range: the range, its class and the per-month result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeHighlight {
    range: CalendarRange,
    class_name: String,
    months: Vec<MonthHighlight>,
}

impl RangeHighlight {
    pub fn range(&self) -> CalendarRange {
        self.range
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn months(&self) -> &[MonthHighlight] {
        &self.months
    }

    /// Clear this highlight's months (see [`unrender_range`]).
    pub fn unrender<P>(&self, provider: &mut P)
    where
        P: MonthViewProvider + ?Sized,
    {
        unrender_range(&self.range, provider);
    }
}

/// Highlight `range` with `class_name` across every month it touches.
///
/// # Examples
///
/// ```
/// use calendar_engine::{render_range, CalendarRange, MonthCache, MonthViewProvider};
///
/// let range = CalendarRange::new("2024-01-30".parse().unwrap(), "2024-02-02".parse().unwrap());
/// let mut cache = MonthCache::new(0);
/// let highlight = render_range(&range, &mut cache, "selected");
///
/// assert_eq!(highlight.months().len(), 2);
/// let jan = cache.month_view("2024-01".parse().unwrap());
/// assert_eq!(jan.highlighted_days(), vec![30, 31]);
/// assert!(jan.cell(30).unwrap().state.range_start);
/// ```
pub fn render_range<P>(range: &CalendarRange, provider: &mut P, class_name: &str) -> RangeHighlight
where
    P: MonthViewProvider + ?Sized,
{
    let start = range.start();
    let end = range.end();
    let start_month = start.year_month();
    let end_month = end.year_month();

    let mut months = Vec::new();
    let mut month = start_month;
    let mut first_day = start.day();

    loop {
        let view = provider.month_view(month);
        let is_start = month == start_month;
        let is_end = month == end_month;
        let last_day = if is_end { end.day() } else { view.num_days() };

        for day in first_day..=last_day {
            if let Some(cell) = view.cell_mut(day) {
                cell.state.highlights.insert(class_name.to_string());
            }
        }
        if is_start {
            if let Some(cell) = view.cell_mut(first_day) {
                cell.state.range_start = true;
            }
        }
        if is_end {
            if let Some(cell) = view.cell_mut(last_day) {
                cell.state.range_end = true;
            }
        }

        let mut spans = row_spans(view, first_day, last_day);
        if !is_start && view.shares_row_with_prev() {
            let prev_covered = months.last().map_or(0, MonthHighlight::num_days);
            if let Some(span) = spans.first_mut().filter(|s| s.row == 0) {
                span.leading_filler = view.start_weekday().min(prev_covered);
            }
        }
        if !is_end && view.shares_row_with_next() {
            let next = month.succ();
            let next_covered = if next == end_month { end.day() } else { next.num_days() };
            let last_row = view.num_rows().saturating_sub(1);
            if let Some(span) = spans.last_mut().filter(|s| s.row == last_row) {
                span.trailing_filler = view.trailing_days().min(next_covered);
            }
        }
        trace!(
            month = %month,
            first_day,
            last_day,
            spans = spans.len(),
            "highlighted month"
        );
        months.push(MonthHighlight {
            month,
            first_day,
            last_day,
            range_start: is_start,
            range_end: is_end,
            spans,
        });

        if month.composite() >= end_month.composite() {
            break;
        }
        month = month.succ();
        first_day = 1;
    }

    if let Some(span) = months.first_mut().and_then(|m| m.spans.first_mut()) {
        span.first = true;
    }
    if let Some(span) = months.last_mut().and_then(|m| m.spans.last_mut()) {
        span.last = true;
    }

    debug!(
        start = %start,
        end = %end,
        class_name,
        months = months.len(),
        "rendered range"
    );

    RangeHighlight {
        range: *range,
        class_name: class_name.to_string(),
        months,
    }
}

/// Clear all highlights and range boundaries from every month `range`
/// touches. Idempotent; months not yet built are built (and stay clean).
pub fn unrender_range<P>(range: &CalendarRange, provider: &mut P)
where
    P: MonthViewProvider + ?Sized,
{
    for month in range.months() {
        provider.month_view(month).clear_highlights();
    }
    debug!(start = %range.start(), end = %range.end(), "unrendered range");
}

/// Group days `first..=last` of `view` into per-row runs.
fn row_spans(view: &MonthView, first: u32, last: u32) -> Vec<RowSpan> {
    let mut spans: Vec<RowSpan> = Vec::new();
    for day in first..=last {
        let Some(cell) = view.cell(day) else {
            continue;
        };
        match spans.last_mut() {
            Some(span) if span.row == cell.row => span.length += 1,
            _ => spans.push(RowSpan {
                row: cell.row,
                week: view.week_of_row(cell.row),
                column: cell.column,
                length: 1,
                leading_filler: 0,
                trailing_filler: 0,
                first: false,
                last: false,
            }),
        }
    }
    spans
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::CalendarDate;
    use crate::month_view::MonthCache;
    use proptest::prelude::*;

    fn date(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn range(a: &str, b: &str) -> CalendarRange {
        CalendarRange::new(date(a), date(b))
    }

    #[test]
    fn test_render_across_month_boundary() {
        let mut cache = MonthCache::new(0);
        let highlight = render_range(&range("2024-01-30", "2024-02-02"), &mut cache, "selected");

        let jan = cache.month_view(ym("2024-01"));
        assert_eq!(jan.highlighted_days(), vec![30, 31]);
        assert!(jan.cell(30).unwrap().state.range_start);
        assert!(!jan.cell(31).unwrap().state.range_end);
        assert!(jan.cell(31).unwrap().state.highlights.contains("selected"));

        let feb = cache.month_view(ym("2024-02"));
        assert_eq!(feb.highlighted_days(), vec![1, 2]);
        assert!(feb.cell(2).unwrap().state.range_end);
        assert!(!feb.cell(1).unwrap().state.range_start);

        assert_eq!(cache.len(), 2);
        assert_eq!(highlight.months().len(), 2);
        assert_eq!(highlight.months()[0].first_day, 30);
        assert_eq!(highlight.months()[0].last_day, 31);
        assert_eq!(highlight.months()[1].num_days(), 2);
    }

    #[test]
    fn test_unrender_clears_all_touched_months() {
        let mut cache = MonthCache::new(0);
        let r = range("2024-01-30", "2024-02-02");
        let highlight = render_range(&r, &mut cache, "selected");
        highlight.unrender(&mut cache);

        for month in ["2024-01", "2024-02"] {
            let view = cache.month_view(ym(month));
            assert!(view.highlighted_days().is_empty(), "{month} still highlighted");
        }
        // Idempotent
        unrender_range(&r, &mut cache);
        assert!(cache.month_view(ym("2024-01")).highlighted_days().is_empty());
    }

    #[test]
    fn test_unrender_clears_other_highlighters() {
        let mut cache = MonthCache::new(0);
        render_range(&range("2024-03-01", "2024-03-05"), &mut cache, "highlight");
        render_range(&range("2024-03-10", "2024-03-12"), &mut cache, "selected");
        unrender_range(&range("2024-03-20", "2024-03-21"), &mut cache);
        assert!(cache.month_view(ym("2024-03")).highlighted_days().is_empty());
    }

    #[test]
    fn test_unrender_keeps_marks() {
        let mut cache = MonthCache::new(0);
        cache
            .month_view(ym("2024-03"))
            .cell_mut(2)
            .unwrap()
            .state
            .marks
            .insert("holiday".into());
        let r = range("2024-03-01", "2024-03-05");
        render_range(&r, &mut cache, "selected");
        unrender_range(&r, &mut cache);
        assert!(cache
            .month_view(ym("2024-03"))
            .cell(2)
            .unwrap()
            .state
            .marks
            .contains("holiday"));
    }

    #[test]
    fn test_single_day_range_flags_both_ends() {
        let mut cache = MonthCache::new(0);
        let highlight = render_range(
            &CalendarRange::single(date("2024-02-29")),
            &mut cache,
            "selected",
        );
        let feb = cache.month_view(ym("2024-02"));
        assert_eq!(feb.highlighted_days(), vec![29]);
        let state = &feb.cell(29).unwrap().state;
        assert!(state.range_start && state.range_end);

        let span = highlight.months()[0].spans[0];
        assert!(span.first && span.last);
        assert_eq!(span.length, 1);
    }

    #[test]
    fn test_same_month_range_touches_one_month() {
        let mut cache = MonthCache::new(0);
        let highlight = render_range(&range("2024-05-03", "2024-05-20"), &mut cache, "x");
        assert_eq!(highlight.months().len(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.month_view(ym("2024-05")).highlighted_days().len(), 18);
    }

    #[test]
    fn test_range_across_year_boundary() {
        let mut cache = MonthCache::new(0);
        let highlight = render_range(&range("2023-12-30", "2024-01-02"), &mut cache, "x");
        let months: Vec<String> = highlight.months().iter().map(|m| m.month.to_string()).collect();
        assert_eq!(months, vec!["2023-12", "2024-01"]);
        assert_eq!(cache.month_view(ym("2023-12")).highlighted_days(), vec![30, 31]);
        assert_eq!(cache.month_view(ym("2024-01")).highlighted_days(), vec![1, 2]);
    }

    #[test]
    fn test_long_range_fills_interior_months() {
        let mut cache = MonthCache::new(1);
        render_range(&range("2024-01-15", "2024-04-10"), &mut cache, "x");
        assert_eq!(cache.month_view(ym("2024-02")).highlighted_days().len(), 29);
        assert_eq!(cache.month_view(ym("2024-03")).highlighted_days().len(), 31);
        assert_eq!(cache.month_view(ym("2024-04")).highlighted_days().len(), 10);
        assert!(!cache.month_view(ym("2024-02")).cell(1).unwrap().state.range_start);
        assert!(!cache.month_view(ym("2024-03")).cell(31).unwrap().state.range_end);
    }

    #[test]
    fn test_row_spans_per_week() {
        let mut cache = MonthCache::new(0);
        let highlight = render_range(&range("2024-01-30", "2024-02-02"), &mut cache, "x");
        // January 2024 starts on a Monday: day 30 is row 4, column 2,
        // and Feb 1-2 show as filler after it
        assert_eq!(
            highlight.months()[0].spans,
            vec![RowSpan {
                row: 4,
                week: 4,
                column: 2,
                length: 2,
                leading_filler: 0,
                trailing_filler: 2,
                first: true,
                last: false,
            }]
        );
        // February 2024 starts on a Thursday: days 1-2 are row 0, columns 4-5,
        // with Jan 30-31 as filler before them
        assert_eq!(
            highlight.months()[1].spans,
            vec![RowSpan {
                row: 0,
                week: 4,
                column: 4,
                length: 2,
                leading_filler: 2,
                trailing_filler: 0,
                first: false,
                last: true,
            }]
        );
    }

    #[test]
    fn test_filler_coverage_capped_by_grid() {
        let mut cache = MonthCache::new(0);
        let highlight = render_range(&range("2024-01-15", "2024-03-20"), &mut cache, "x");
        let months = highlight.months();
        // January has 3 trailing filler slots, all inside the range
        assert_eq!(months[0].spans.last().unwrap().trailing_filler, 3);
        // February shows 4 January days before the 1st
        assert_eq!(months[1].spans[0].leading_filler, 4);
        // February 2024 ends on a Thursday; March 1-2 fill its last row
        assert_eq!(months[1].spans.last().unwrap().trailing_filler, 2);
        assert_eq!(months[2].spans[0].leading_filler, 5);
        assert_eq!(months[2].spans.last().unwrap().trailing_filler, 0);
    }

    #[test]
    fn test_no_filler_at_range_ends() {
        let mut cache = MonthCache::new(0);
        let highlight = render_range(&range("2024-02-01", "2024-02-29"), &mut cache, "x");
        let spans = &highlight.months()[0].spans;
        assert_eq!(spans[0].leading_filler, 0);
        assert_eq!(spans.last().unwrap().trailing_filler, 0);
    }

    #[test]
    fn test_row_spans_split_at_week_end() {
        let mut cache = MonthCache::new(0);
        // 2024-03-01 is a Friday: days 1-2 fill row 0, 3-9 fill row 1, 10 starts row 2
        let highlight = render_range(&range("2024-03-01", "2024-03-10"), &mut cache, "x");
        let lengths: Vec<u32> = highlight.months()[0].spans.iter().map(|s| s.length).collect();
        assert_eq!(lengths, vec![2, 7, 1]);
    }

    #[test]
    fn test_reversed_input_renders_normalized() {
        let mut cache = MonthCache::new(0);
        let highlight = render_range(&range("2024-02-02", "2024-01-30"), &mut cache, "x");
        assert_eq!(highlight.range().start(), date("2024-01-30"));
        assert!(cache.month_view(ym("2024-01")).cell(30).unwrap().state.range_start);
    }

    fn arb_range() -> impl Strategy<Value = CalendarRange> {
        (2000i32..2040, 1u32..=12, 1u32..=28, 0i64..200).prop_map(|(y, m, d, n)| {
            let start = CalendarDate::new(y, m, d).unwrap();
            CalendarRange::new(start, start.offset_by(n))
        })
    }

    proptest! {
        #[test]
        fn prop_highlighted_cells_equal_range_days(r in arb_range(), sow in 0u32..7) {
            let mut cache = MonthCache::new(sow);
            let highlight = render_range(&r, &mut cache, "x");
            let total: u32 = highlight.months().iter().map(|m| m.num_days()).sum();
            prop_assert_eq!(i64::from(total), r.num_days());

            let marked: usize = cache.iter().map(|v| v.highlighted_days().len()).sum();
            prop_assert_eq!(marked as i64, r.num_days());

            let span_total: u32 = highlight
                .months()
                .iter()
                .flat_map(|m| m.spans.iter())
                .map(|s| s.length)
                .sum();
            prop_assert_eq!(span_total, total);
            for span in highlight.months().iter().flat_map(|m| m.spans.iter()) {
                prop_assert!(span.column + span.length + span.trailing_filler <= 7);
                prop_assert!(span.leading_filler <= span.column);
            }

            unrender_range(&r, &mut cache);
            prop_assert!(cache.iter().all(|v| v.highlighted_days().is_empty()));
        }
    }
}
