//! The calendar view shared by the pickers of one page.
//!
//! [`CalendarView`] is constructed explicitly and handed to pickers; it owns
//! the month view cache, the active range highlights, the selectable-date
//! bounds and the in-progress range selection. Rendering the cached state
//! (DOM, terminal, ...) is up to the embedder.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::calendar::YearMonth;
use crate::config::CalendarOptions;
use crate::date::CalendarDate;
use crate::error::Result;
use crate::highlight::{render_range, unrender_range, RangeHighlight};
use crate::marked::MarkedDates;
use crate::month_view::{MonthView, MonthViewProvider};
use crate::picker::{Picker, PickerChange};
use crate::range::CalendarRange;
use crate::translate::Translations;

/// Highlight class of the range previewed while selecting.
pub const HIGHLIGHT_CLASS: &str = "highlight";

/// Preview produced while hovering during a range selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverPreview {
    pub range: CalendarRange,
    pub num_days: i64,
    /// Localized day count, e.g. `"3 days"`.
    pub label: String,
}

#[derive(Debug, Clone)]
struct RangeSelection {
    start: CalendarDate,
    preview: CalendarRange,
    hovered: Option<CalendarDate>,
}

/// Month cache plus selection state for a set of pickers.
#[derive(Debug, Clone)]
pub struct CalendarView {
    options: CalendarOptions,
    translations: &'static Translations,
    today: CalendarDate,
    months: BTreeMap<YearMonth, MonthView>,
    marked: MarkedDates,
    current: YearMonth,
    start_date: Option<CalendarDate>,
    weekends_disabled: bool,
    ranges: Vec<RangeHighlight>,
    selection: Option<RangeSelection>,
    open: bool,
}

impl CalendarView {
    /// Create a view showing the month of `today`.
    ///
    /// `today` is passed in rather than read from the clock; callers
    /// normally use [`CalendarDate::today`].
    pub fn new(options: CalendarOptions, today: CalendarDate) -> Result<Self> {
        options.validate()?;
        let translations = Translations::for_locale(&options.language);
        Ok(Self {
            options,
            translations,
            today,
            months: BTreeMap::new(),
            marked: MarkedDates::new(),
            current: today.year_month(),
            start_date: None,
            weekends_disabled: false,
            ranges: Vec::new(),
            selection: None,
            open: false,
        })
    }

    pub fn options(&self) -> &CalendarOptions {
        &self.options
    }

    pub fn translations(&self) -> &'static Translations {
        self.translations
    }

    pub fn today(&self) -> CalendarDate {
        self.today
    }

    pub fn current_month(&self) -> YearMonth {
        self.current
    }

    pub fn start_date(&self) -> Option<CalendarDate> {
        self.start_date
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Replace the marked dates, updating months already built.
    pub fn set_marked_dates(&mut self, marked: MarkedDates) {
        self.marked = marked;
        for view in self.months.values_mut() {
            view.clear_marked_dates();
            self.marked.apply(view);
        }
    }

    /// A cached month view, if it has been built.
    pub fn cached(&self, month: YearMonth) -> Option<&MonthView> {
        self.months.get(&month)
    }

    // ── Navigation ──────────────────────────────────────────────────────

    /// Months currently on screen, starting with the current month.
    pub fn visible_months(&self) -> Vec<YearMonth> {
        std::iter::successors(Some(self.current), |m| Some(m.succ()))
            .take(self.options.month_span as usize)
            .collect()
    }

    /// Show `month` (and the months after it, per `month_span`).
    pub fn show_month(&mut self, month: YearMonth) {
        self.current = month;
        for month in self.visible_months() {
            self.month_view(month);
        }
        debug!(month = %month, "showing month");
    }

    pub fn show_prev_month(&mut self) {
        self.show_month(self.current.pred());
    }

    pub fn show_next_month(&mut self) {
        self.show_month(self.current.succ());
    }

    /// Whether navigating back is allowed (not at the start date's month).
    pub fn can_show_prev(&self) -> bool {
        self.start_date
            .is_none_or(|start| self.current > start.year_month())
    }

    // ── Selectable bounds ───────────────────────────────────────────────

    /// Set the earliest selectable date. Jumps forward if the current month
    /// lies before it.
    pub fn set_start_date(&mut self, start_date: Option<CalendarDate>) {
        self.start_date = start_date;
        if let Some(start) = start_date {
            if self.current < start.year_month() {
                self.show_month(start.year_month());
            }
        }
        self.respect_start_date();
    }

    pub fn disable_weekends(&mut self, disabled: bool) {
        self.weekends_disabled = disabled;
        self.respect_start_date();
    }

    pub fn is_selectable(&self, date: &CalendarDate) -> bool {
        is_selectable(date, self.start_date, self.weekends_disabled)
    }

    fn respect_start_date(&mut self) {
        for view in self.months.values_mut() {
            apply_disabled(view, self.start_date, self.weekends_disabled);
        }
    }

    // ── Marks and ranges ────────────────────────────────────────────────

    /// Add a mark class to `date`'s cell.
    pub fn mark_date(&mut self, date: &CalendarDate, class_name: &str) {
        if let Some(cell) = self.month_view(date.year_month()).cell_for_mut(date) {
            cell.state.marks.insert(class_name.to_string());
        }
    }

    /// Remove a mark class from `date`'s cell, or from every built month
    /// when `date` is `None`.
    pub fn unmark_date(&mut self, date: Option<&CalendarDate>, class_name: &str) {
        match date {
            Some(date) => {
                if let Some(cell) = self.month_view(date.year_month()).cell_for_mut(date) {
                    cell.state.marks.remove(class_name);
                }
            }
            None => {
                for view in self.months.values_mut() {
                    view.unmark(class_name);
                }
            }
        }
    }

    /// Highlight `range`; kept highlights are cleared by
    /// [`clear_all_ranges`](Self::clear_all_ranges).
    pub fn mark_range(&mut self, range: &CalendarRange, class_name: &str, keep: bool) -> RangeHighlight {
        let highlight = render_range(range, self, class_name);
        if keep {
            self.ranges.push(highlight.clone());
        }
        highlight
    }

    /// Kept highlights, oldest first.
    pub fn ranges(&self) -> &[RangeHighlight] {
        &self.ranges
    }

    pub fn clear_all_ranges(&mut self) {
        let ranges = std::mem::take(&mut self.ranges);
        for highlight in &ranges {
            highlight.unrender(self);
        }
    }

    // ── Range selection ─────────────────────────────────────────────────

    /// Begin selecting a range at `date`, previewing a one-day range.
    pub fn start_range_select(&mut self, date: CalendarDate) {
        let preview = CalendarRange::single(date);
        render_range(&preview, self, HIGHLIGHT_CLASS);
        self.selection = Some(RangeSelection {
            start: date,
            preview,
            hovered: None,
        });
    }

    pub fn is_selecting_range(&self) -> bool {
        self.selection.is_some()
    }

    /// Drop an in-progress range selection and its preview highlight.
    pub fn cancel_range_select(&mut self) {
        if let Some(selection) = self.selection.take() {
            unrender_range(&selection.preview, self);
            debug!(start = %selection.start, "range selection cancelled");
        }
    }

    /// Preview the range from the selection start to `date`.
    ///
    /// Returns `None` when no selection is in progress, `date` is not
    /// selectable, or `date` is the cell already hovered.
    pub fn hover(&mut self, date: CalendarDate) -> Option<HoverPreview> {
        if !self.is_selectable(&date) {
            return None;
        }
        let selection = self.selection.as_ref()?;
        if selection.hovered == Some(date) {
            return None;
        }
        let previous = selection.preview;
        let range = CalendarRange::new(selection.start, date);

        unrender_range(&previous, self);
        render_range(&range, self, HIGHLIGHT_CLASS);
        if let Some(selection) = self.selection.as_mut() {
            selection.preview = range;
            selection.hovered = Some(date);
        }

        let num_days = range.num_days();
        Some(HoverPreview {
            range,
            num_days,
            label: self.translations.num_days(num_days),
        })
    }

    /// Handle a click on `date` for `picker`.
    ///
    /// The picker sees the date first; if a range selection was in progress
    /// the click also completes it and the picker receives the range.
    pub fn click(&mut self, picker: &mut dyn Picker, date: CalendarDate) -> Option<PickerChange> {
        if !self.is_selectable(&date) {
            debug!(date = %date, "ignoring click on disabled date");
            return None;
        }
        let ends_range = self.selection.is_some();
        let change = picker.on_select_date(self, date, ends_range);

        if !ends_range {
            return change;
        }
        let selection = self.selection.take()?;
        unrender_range(&selection.preview, self);
        let range = CalendarRange::new(selection.start, date);
        picker.on_select_range(self, range).or(change)
    }
}

impl MonthViewProvider for CalendarView {
    fn month_view(&mut self, month: YearMonth) -> &mut MonthView {
        let Self {
            months,
            marked,
            options,
            today,
            start_date,
            weekends_disabled,
            ..
        } = self;
        months.entry(month).or_insert_with(|| {
            let mut view = MonthView::build(month, options.start_of_week);
            marked.apply(&mut view);
            if let Some(cell) = view.cell_for_mut(today) {
                cell.state.today = true;
            }
            apply_disabled(&mut view, *start_date, *weekends_disabled);
            view
        })
    }
}

fn is_selectable(date: &CalendarDate, start_date: Option<CalendarDate>, weekends_disabled: bool) -> bool {
    if start_date.is_some_and(|start| *date < start) {
        return false;
    }
    !(weekends_disabled && date.is_weekend())
}

fn apply_disabled(view: &mut MonthView, start_date: Option<CalendarDate>, weekends_disabled: bool) {
    for cell in view.cells_mut() {
        cell.state.disabled = !is_selectable(&cell.date, start_date, weekends_disabled);
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PickerOptions;
    use crate::picker::{DatePicker, DateRangePicker, PickerValue};

    fn date(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn view() -> CalendarView {
        CalendarView::new(CalendarOptions::default(), date("2024-01-15")).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_options() {
        let options = CalendarOptions {
            month_span: 0,
            ..CalendarOptions::default()
        };
        assert!(CalendarView::new(options, date("2024-01-15")).is_err());
    }

    #[test]
    fn test_today_is_flagged() {
        let mut v = view();
        assert!(v.month_view(ym("2024-01")).cell(15).unwrap().state.today);
        assert!(!v.month_view(ym("2024-01")).cell(16).unwrap().state.today);
    }

    #[test]
    fn test_navigation_and_visible_months() {
        let mut v = view();
        v.show_month(ym("2023-12"));
        assert_eq!(v.visible_months(), vec![ym("2023-12"), ym("2024-01")]);
        assert!(v.cached(ym("2024-01")).is_some());
        v.show_next_month();
        assert_eq!(v.current_month(), ym("2024-01"));
        v.show_prev_month();
        v.show_prev_month();
        assert_eq!(v.current_month(), ym("2023-11"));
    }

    #[test]
    fn test_single_month_span() {
        let options = CalendarOptions {
            month_span: 1,
            ..CalendarOptions::default()
        };
        let v = CalendarView::new(options, date("2024-01-15")).unwrap();
        assert_eq!(v.visible_months(), vec![ym("2024-01")]);
    }

    #[test]
    fn test_start_date_disables_earlier_days() {
        let mut v = view();
        v.show_month(ym("2024-01"));
        v.set_start_date(Some(date("2024-01-10")));
        let jan = v.cached(ym("2024-01")).unwrap();
        assert!(jan.cell(9).unwrap().state.disabled);
        assert!(!jan.cell(10).unwrap().state.disabled);
        assert!(!v.can_show_prev());
        v.show_next_month();
        assert!(v.can_show_prev());
    }

    #[test]
    fn test_start_date_jumps_forward() {
        let mut v = view();
        v.set_start_date(Some(date("2024-05-03")));
        assert_eq!(v.current_month(), ym("2024-05"));
    }

    #[test]
    fn test_disable_weekends() {
        let mut v = view();
        v.show_month(ym("2024-01"));
        v.disable_weekends(true);
        // 2024-01-06 is a Saturday
        assert!(v.cached(ym("2024-01")).unwrap().cell(6).unwrap().state.disabled);
        assert!(!v.cached(ym("2024-01")).unwrap().cell(5).unwrap().state.disabled);
        // Months built later pick the rule up too
        assert!(v.month_view(ym("2024-06")).cell(1).unwrap().state.disabled);
        v.disable_weekends(false);
        assert!(!v.cached(ym("2024-01")).unwrap().cell(6).unwrap().state.disabled);
    }

    #[test]
    fn test_mark_and_unmark() {
        let mut v = view();
        v.mark_date(&date("2024-01-20"), "selected");
        v.mark_date(&date("2024-03-02"), "selected");
        assert!(v.month_view(ym("2024-01")).cell(20).unwrap().state.marks.contains("selected"));
        v.unmark_date(Some(&date("2024-01-20")), "selected");
        assert!(v.month_view(ym("2024-01")).cell(20).unwrap().state.marks.is_empty());
        v.unmark_date(None, "selected");
        assert!(v.month_view(ym("2024-03")).cell(2).unwrap().state.marks.is_empty());
    }

    #[test]
    fn test_marked_dates_applied_on_build_and_replace() {
        let mut v = view();
        v.month_view(ym("2024-12"));
        let marked = MarkedDates::from_json(r#"[{"date": "2024-12-25", "className": "holiday"}]"#).unwrap();
        v.set_marked_dates(marked);
        assert!(v.cached(ym("2024-12")).unwrap().cell(25).unwrap().state.marked.contains("holiday"));
        v.set_marked_dates(MarkedDates::new());
        assert!(v.cached(ym("2024-12")).unwrap().cell(25).unwrap().state.marked.is_empty());
    }

    #[test]
    fn test_marked_dates_replace_keeps_selection_mark() {
        let mut v = view();
        let picker = DatePicker::new(&PickerOptions::default(), "2024-01-20", v.today()).unwrap();
        picker.open(&mut v);
        let marked = MarkedDates::from_json(r#"[{"date": "2024-01-25", "className": "holiday"}]"#).unwrap();
        v.set_marked_dates(marked);

        let jan = v.cached(ym("2024-01")).unwrap();
        assert!(jan.cell(20).unwrap().state.marks.contains("selected"));
        assert!(jan.cell(25).unwrap().state.marked.contains("holiday"));
        assert!(jan.cell(20).unwrap().classes().contains(&"selected".to_string()));
    }

    #[test]
    fn test_clear_all_ranges() {
        let mut v = view();
        let r = CalendarRange::new(date("2024-01-30"), date("2024-02-02"));
        v.mark_range(&r, "selected", true);
        assert_eq!(v.ranges().len(), 1);
        v.clear_all_ranges();
        assert!(v.ranges().is_empty());
        assert!(v.month_view(ym("2024-01")).highlighted_days().is_empty());
        assert!(v.month_view(ym("2024-02")).highlighted_days().is_empty());
    }

    #[test]
    fn test_hover_without_selection_is_none() {
        let mut v = view();
        assert!(v.hover(date("2024-01-20")).is_none());
    }

    #[test]
    fn test_range_selection_flow() {
        let mut v = view();
        let mut picker = DateRangePicker::new(&PickerOptions::default(), "", v.today()).unwrap();
        picker.open(&mut v);

        assert!(v.click(&mut picker, date("2024-01-30")).is_none());
        assert!(v.is_selecting_range());
        assert_eq!(v.month_view(ym("2024-01")).highlighted_days(), vec![30]);

        let preview = v.hover(date("2024-02-02")).unwrap();
        assert_eq!(preview.num_days, 4);
        assert_eq!(preview.label, "4 days");
        assert_eq!(v.month_view(ym("2024-02")).highlighted_days(), vec![1, 2]);
        // Same cell again does nothing
        assert!(v.hover(date("2024-02-02")).is_none());

        // Moving back shrinks the preview
        v.hover(date("2024-01-31")).unwrap();
        assert!(v.month_view(ym("2024-02")).highlighted_days().is_empty());

        let change = v.click(&mut picker, date("2024-02-02")).unwrap();
        assert!(!v.is_selecting_range());
        assert_eq!(change.text, "2024-01-30 t/m 2024-02-02");
        assert!(matches!(change.value, PickerValue::Range(_)));
        assert!(!v.is_open());

        let feb = v.month_view(ym("2024-02"));
        assert!(feb.cell(2).unwrap().state.highlights.contains("selected"));
        assert!(!feb.cell(2).unwrap().state.highlights.contains(HIGHLIGHT_CLASS));
    }

    #[test]
    fn test_opening_date_picker_cancels_range_selection() {
        let mut v = view();
        let mut range_picker = DateRangePicker::new(&PickerOptions::default(), "", v.today()).unwrap();
        range_picker.open(&mut v);
        v.click(&mut range_picker, date("2024-01-10"));
        v.hover(date("2024-01-12")).unwrap();
        assert_eq!(v.month_view(ym("2024-01")).highlighted_days(), vec![10, 11, 12]);

        let picker = DatePicker::new(&PickerOptions::default(), "", v.today()).unwrap();
        picker.open(&mut v);
        assert!(!v.is_selecting_range());
        assert!(v.month_view(ym("2024-01")).highlighted_days().is_empty());
        assert!(v.hover(date("2024-01-15")).is_none());
    }

    #[test]
    fn test_cancel_without_selection_is_noop() {
        let mut v = view();
        v.cancel_range_select();
        assert!(!v.is_selecting_range());
    }

    #[test]
    fn test_click_on_disabled_date_is_ignored() {
        let mut v = view();
        let options = PickerOptions {
            disable_weekends: true,
            ..PickerOptions::default()
        };
        let mut picker = DatePicker::new(&options, "", v.today()).unwrap();
        picker.open(&mut v);
        // 2024-01-13 is a Saturday
        assert!(v.click(&mut picker, date("2024-01-13")).is_none());
        assert!(picker.value().is_none());
        assert!(v.click(&mut picker, date("2024-01-12")).is_some());
    }
}
