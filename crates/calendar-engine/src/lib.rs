//! # calendar-engine
//!
//! Date arithmetic and view state for calendar date pickers.
//!
//! The engine computes everything a date picker needs to draw and drive its
//! month grids: leap years, weekdays and week numbers, two-way date formats,
//! and range highlights that span any number of months. Rendering is left to
//! the embedder; the engine only produces the state to render.
//!
//! ## Modules
//!
//! - [`calendar`] — Leap years, month lengths, weekdays, week numbers
//! - [`date`] — `CalendarDate`, a validated year/month/day with day stepping
//! - [`range`] — Inclusive date ranges, day iteration and touched months
//! - [`pattern`] — Two-way `{name}` templates: parse text into fields, fill fields into text
//! - [`month_view`] — Per-month day grids with cell state and the month cache
//! - [`highlight`] — Render and clear range highlights across month views
//! - [`marked`] — Page-supplied marked dates grouped by year and month
//! - [`view`] — The shared calendar view: navigation, bounds, range selection
//! - [`picker`] — Single-date and date-range pickers
//! - [`config`] — Calendar and picker options loaded from JSON
//! - [`translate`] — UI strings per language
//! - [`error`] — Error types

pub mod calendar;
pub mod config;
pub mod date;
pub mod error;
pub mod highlight;
pub mod marked;
pub mod month_view;
pub mod pattern;
pub mod picker;
pub mod range;
pub mod translate;
pub mod view;

pub use calendar::{day_of_week, days_in_month, is_leap_year, week_number, YearMonth};
pub use config::{CalendarOptions, PickerOptions};
pub use date::CalendarDate;
pub use error::CalendarError;
pub use highlight::{render_range, unrender_range, MonthHighlight, RangeHighlight, RowSpan};
pub use marked::{MarkedDate, MarkedDates};
pub use month_view::{CellState, DayCell, GridDay, MonthCache, MonthView, MonthViewProvider};
pub use pattern::{DateFields, FillDate, Pattern, PatternMatch};
pub use picker::{
    DatePicker, DateRangePicker, Picker, PickerChange, PickerCore, PickerValue, SELECTED_CLASS,
};
pub use range::CalendarRange;
pub use translate::Translations;
pub use view::{CalendarView, HoverPreview, HIGHLIGHT_CLASS};
