//! Single-date and date-range pickers.
//!
//! A picker holds the value of one input field. It parses the field's text
//! with its date format, prepares the shared [`CalendarView`] when opened and
//! turns clicks relayed by the view into a [`PickerChange`] carrying the new
//! value and the text to write back.

use serde::Serialize;
use tracing::debug;

use crate::config::PickerOptions;
use crate::date::CalendarDate;
use crate::error::{CalendarError, Result};
use crate::pattern::Pattern;
use crate::range::CalendarRange;
use crate::view::CalendarView;

/// Mark class of the currently selected date or range.
pub const SELECTED_CLASS: &str = "selected";

/// Value of a picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum PickerValue {
    Date(CalendarDate),
    Range(CalendarRange),
}

/// A committed selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickerChange {
    pub value: PickerValue,
    /// Formatted text for the input field.
    pub text: String,
}

/// Options shared by both picker kinds, resolved against a date format.
#[derive(Debug, Clone)]
pub struct PickerCore {
    format: Pattern,
    start_date: Option<CalendarDate>,
    weekends_disabled: bool,
    separator: String,
}

impl PickerCore {
    /// Validate `options` and compile the date format.
    ///
    /// `startDate` may be `"today"` or a date in the picker's own format;
    /// text that does not match the format is an error.
    pub fn init_options(options: &PickerOptions, today: CalendarDate) -> Result<Self> {
        options.validate()?;
        let format = Pattern::from_date_format(&options.format)?;
        let start_date = match options.start_date.as_deref() {
            None => None,
            Some(text) if text.eq_ignore_ascii_case("today") => Some(today),
            Some(text) => Some(
                format
                    .matches(text)
                    .and_then(|m| m.to_date())
                    .ok_or_else(|| {
                        CalendarError::InvalidOption(format!(
                            "startDate {text:?} does not match format {:?}",
                            options.format
                        ))
                    })?,
            ),
        };
        Ok(Self {
            format,
            start_date,
            weekends_disabled: options.disable_weekends,
            separator: options.separator.clone(),
        })
    }

    pub fn format(&self) -> &Pattern {
        &self.format
    }

    pub fn start_date(&self) -> Option<CalendarDate> {
        self.start_date
    }

    pub fn weekends_disabled(&self) -> bool {
        self.weekends_disabled
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn parse_date(&self, text: &str) -> Option<CalendarDate> {
        self.format.matches(text.trim())?.to_date()
    }

    pub fn format_date(&self, date: &CalendarDate) -> String {
        self.format.fill_date(Some(date))
    }

    /// Parse `"<start><separator><end>"`. A missing or unparseable end
    /// yields a one-day range.
    pub fn parse_range(&self, text: &str) -> Option<CalendarRange> {
        let mut parts = text.split(self.separator.as_str());
        let start = self.parse_date(parts.next()?)?;
        let end = parts.next().and_then(|part| self.parse_date(part));
        Some(CalendarRange::from_start(start, end))
    }

    pub fn format_range(&self, range: &CalendarRange) -> String {
        format!(
            "{}{}{}",
            self.format_date(&range.start()),
            self.separator,
            self.format_date(&range.end())
        )
    }

    fn prepare_view(&self, view: &mut CalendarView, anchor: CalendarDate) {
        view.cancel_range_select();
        view.show_month(anchor.year_month());
        view.set_start_date(self.start_date);
        view.disable_weekends(self.weekends_disabled);
        view.clear_all_ranges();
        view.unmark_date(None, SELECTED_CLASS);
    }
}

/// An input field backed by the shared calendar view.
pub trait Picker {
    fn core(&self) -> &PickerCore;

    fn core_mut(&mut self) -> &mut PickerCore;

    /// Replace the picker's options. The current value is kept.
    fn init_options(&mut self, options: &PickerOptions, today: CalendarDate) -> Result<()> {
        *self.core_mut() = PickerCore::init_options(options, today)?;
        Ok(())
    }

    /// Replace the value from field text. Text that does not parse clears
    /// the value.
    fn set_value(&mut self, text: &str);

    fn value(&self) -> Option<PickerValue>;

    /// The value formatted for the input field, or `""` when unset.
    fn text(&self) -> String;

    /// Prepare `view` for this picker and open it.
    fn open(&self, view: &mut CalendarView);

    /// A selectable day was clicked. `ends_range` is set when the click
    /// completes a range selection started earlier.
    fn on_select_date(
        &mut self,
        view: &mut CalendarView,
        date: CalendarDate,
        ends_range: bool,
    ) -> Option<PickerChange>;

    /// A range selection completed.
    fn on_select_range(
        &mut self,
        _view: &mut CalendarView,
        _range: CalendarRange,
    ) -> Option<PickerChange> {
        None
    }
}

// ── Single date ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DatePicker {
    core: PickerCore,
    date: Option<CalendarDate>,
}

impl DatePicker {
    pub fn new(options: &PickerOptions, text: &str, today: CalendarDate) -> Result<Self> {
        let mut picker = Self {
            core: PickerCore::init_options(options, today)?,
            date: None,
        };
        picker.set_value(text);
        Ok(picker)
    }

    pub fn date(&self) -> Option<CalendarDate> {
        self.date
    }
}

impl Picker for DatePicker {
    fn core(&self) -> &PickerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PickerCore {
        &mut self.core
    }

    fn set_value(&mut self, text: &str) {
        self.date = self.core.parse_date(text);
    }

    fn value(&self) -> Option<PickerValue> {
        self.date.map(PickerValue::Date)
    }

    fn text(&self) -> String {
        self.core.format.fill_date(self.date.as_ref())
    }

    fn open(&self, view: &mut CalendarView) {
        let anchor = self.date.unwrap_or_else(|| view.today());
        self.core.prepare_view(view, anchor);
        if let Some(date) = self.date {
            view.mark_date(&date, SELECTED_CLASS);
        }
        view.open();
    }

    fn on_select_date(
        &mut self,
        view: &mut CalendarView,
        date: CalendarDate,
        _ends_range: bool,
    ) -> Option<PickerChange> {
        self.date = Some(date);
        view.close();
        let text = self.text();
        debug!(date = %date, text = %text, "date selected");
        Some(PickerChange {
            value: PickerValue::Date(date),
            text,
        })
    }
}

// ── Date range ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DateRangePicker {
    core: PickerCore,
    range: Option<CalendarRange>,
}

impl DateRangePicker {
    pub fn new(options: &PickerOptions, text: &str, today: CalendarDate) -> Result<Self> {
        let mut picker = Self {
            core: PickerCore::init_options(options, today)?,
            range: None,
        };
        picker.set_value(text);
        Ok(picker)
    }

    pub fn range(&self) -> Option<CalendarRange> {
        self.range
    }
}

impl Picker for DateRangePicker {
    fn core(&self) -> &PickerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PickerCore {
        &mut self.core
    }

    fn set_value(&mut self, text: &str) {
        self.range = self.core.parse_range(text);
    }

    fn value(&self) -> Option<PickerValue> {
        self.range.map(PickerValue::Range)
    }

    fn text(&self) -> String {
        self.range
            .map(|range| self.core.format_range(&range))
            .unwrap_or_default()
    }

    fn open(&self, view: &mut CalendarView) {
        let anchor = self.range.map_or_else(|| view.today(), |r| r.start());
        self.core.prepare_view(view, anchor);
        if let Some(range) = self.range {
            view.mark_range(&range, SELECTED_CLASS, true);
        }
        view.open();
    }

    fn on_select_date(
        &mut self,
        view: &mut CalendarView,
        date: CalendarDate,
        ends_range: bool,
    ) -> Option<PickerChange> {
        if !ends_range {
            self.range = None;
            view.clear_all_ranges();
            view.start_range_select(date);
        }
        None
    }

    fn on_select_range(
        &mut self,
        view: &mut CalendarView,
        range: CalendarRange,
    ) -> Option<PickerChange> {
        self.range = Some(range);
        view.mark_range(&range, SELECTED_CLASS, true);
        view.close();
        let text = self.text();
        debug!(start = %range.start(), end = %range.end(), "range selected");
        Some(PickerChange {
            value: PickerValue::Range(range),
            text,
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
