//! Calendar and picker configuration.
//!
//! Both option sets deserialize from JSON with camelCase keys, fill in
//! defaults for anything missing and are validated before use.

use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};

/// Default user-facing date format.
pub const DEFAULT_FORMAT: &str = "yyyy-mm-dd";
/// Default text between the two dates of a range value.
pub const DEFAULT_SEPARATOR: &str = " t/m ";

/// Options for the shared calendar view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CalendarOptions {
    /// First column of the grid: 0 = Sunday ... 6 = Saturday.
    pub start_of_week: u32,
    /// Months shown side by side (1 or 2).
    pub month_span: u32,
    /// Locale tag used to pick translations, e.g. `"nl-NL"`.
    pub language: String,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            start_of_week: 0,
            month_span: 2,
            language: "en".to_string(),
        }
    }
}

impl CalendarOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| CalendarError::InvalidOption(format!("calendar options: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_of_week > 6 {
            return Err(CalendarError::InvalidOption(format!(
                "startOfWeek must be 0-6, got {}",
                self.start_of_week
            )));
        }
        if !(1..=2).contains(&self.month_span) {
            return Err(CalendarError::InvalidOption(format!(
                "monthSpan must be 1 or 2, got {}",
                self.month_span
            )));
        }
        Ok(())
    }
}

/// Options for a single picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PickerOptions {
    /// Date format with `yyyy`, `mm` and `dd` tokens.
    pub format: String,
    /// Earliest selectable date: `"today"` or a date in `format`.
    pub start_date: Option<String>,
    pub disable_weekends: bool,
    /// Text between start and end of a range value.
    pub separator: String,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            start_date: None,
            disable_weekends: false,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl PickerOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| CalendarError::InvalidOption(format!("picker options: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.format.trim().is_empty() {
            return Err(CalendarError::InvalidOption("format must not be empty".into()));
        }
        if self.separator.is_empty() {
            return Err(CalendarError::InvalidOption(
                "separator must not be empty".into(),
            ));
        }
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
