//! Two-way string patterns.
//!
//! A [`Pattern`] is a template such as `"{day}/{month}/{year}"` in which
//! every `{name}` or `{name:type}` token is a placeholder. The same pattern
//! both parses text (extracting the placeholder values) and renders text
//! (substituting values back in), so one date format configuration serves
//! the input field in both directions.
//!
//! # Placeholder types
//!
//! | type       | matches              |
//! |------------|----------------------|
//! | `any`      | `[a-zA-Z0-9_-]+`     |
//! | `int`      | `\d+`                |
//! | `float`    | `\d*\.?\d+`          |
//! | `url_part` | `[^/]+`              |
//!
//! Any other type name is used as a raw regex fragment, with backslashes
//! doubled. A placeholder without a type is `any`.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Offset, TimeZone, Timelike};
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::date::CalendarDate;
use crate::error::{CalendarError, Result};

/// Predefined placeholder types and their character classes.
const PLACEHOLDER_TYPES: [(&str, &str); 4] = [
    ("any", "[a-zA-Z0-9_-]+"),
    ("int", r"\d+"),
    ("float", r"\d*\.?\d+"),
    ("url_part", "[^/]+"),
];

const DEFAULT_TYPE: &str = "any";

/// A named slot and the regex group that captures it.
#[derive(Debug, Clone)]
struct Placeholder {
    name: String,
    group: String,
}

/// A compiled two-way template.
#[derive(Debug, Clone)]
pub struct Pattern {
    template: String,
    stripped: String,
    placeholders: Vec<Placeholder>,
    regex: Regex,
}

impl Pattern {
    /// Compile a template.
    ///
    /// If a name repeats, only its first placeholder is addressable; later
    /// ones still have to match but their captures are not reported.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidPattern`] when a custom placeholder
    /// type is not a valid regex fragment.
    ///
    /// # Examples
    ///
    /// ```
    /// use calendar_engine::Pattern;
    ///
    /// let pattern = Pattern::new("{year}-{month}-{day}").unwrap();
    /// let found = pattern.matches("2024-03-07").unwrap();
    /// assert_eq!(found.get("month"), Some("03"));
    /// assert_eq!(
    ///     pattern.fill([("year", "2024"), ("month", "03"), ("day", "07")]),
    ///     "2024-03-07"
    /// );
    /// ```
    pub fn new(template: &str) -> Result<Self> {
        let token_re = Regex::new(r"\{([^}]+)\}")
            .map_err(|e| CalendarError::InvalidPattern(format!("internal regex: {e}")))?;

        let mut source = String::from("^");
        let mut stripped = String::with_capacity(template.len());
        let mut placeholders: Vec<Placeholder> = Vec::new();
        let mut last = 0;

        for (index, caps) in token_re.captures_iter(template).enumerate() {
            let (Some(token), Some(identifier)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            let lead = &template[last..token.start()];
            source.push_str(&regex::escape(lead));
            stripped.push_str(lead);

            let (name, kind) = identifier
                .as_str()
                .split_once(':')
                .unwrap_or((identifier.as_str(), DEFAULT_TYPE));

            let fragment = PLACEHOLDER_TYPES
                .iter()
                .find(|(known, _)| *known == kind)
                .map(|(_, class)| (*class).to_string())
                .unwrap_or_else(|| kind.replace('\\', r"\\"));

            let group = format!("p{index}");
            source.push_str(&format!("(?P<{group}>{fragment})"));

            if !placeholders.iter().any(|p| p.name == name) {
                placeholders.push(Placeholder {
                    name: name.to_string(),
                    group,
                });
            }

            stripped.push('{');
            stripped.push_str(name);
            stripped.push('}');

            last = token.end();
        }

        let tail = &template[last..];
        source.push_str(&regex::escape(tail));
        stripped.push_str(tail);
        source.push('$');

        let regex = Regex::new(&source)
            .map_err(|e| CalendarError::InvalidPattern(format!("'{template}': {e}")))?;

        Ok(Self {
            template: template.to_string(),
            stripped,
            placeholders,
            regex,
        })
    }

    /// Compile a user-facing date format such as `"dd/mm/yyyy"`.
    ///
    /// The first `yyyy`, `mm` and `dd` (in any letter case) become the
    /// `{year}`, `{month}` and `{day}` placeholders; everything else is
    /// literal.
    pub fn from_date_format(format: &str) -> Result<Self> {
        let template = replace_token(format, "yyyy", "{year}");
        let template = replace_token(&template, "mm", "{month}");
        let template = replace_token(&template, "dd", "{day}");
        Self::new(&template)
    }

    /// The template this pattern was built from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholder names in declaration order.
    pub fn placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(|p| p.name.as_str())
    }

    /// Match `text` in full, returning one entry per placeholder, or `None`
    /// when the text does not fit the pattern.
    pub fn matches(&self, text: &str) -> Option<PatternMatch> {
        self.match_with(text, false)
    }

    /// Like [`matches`](Self::matches), but with keys written as `{name}`.
    pub fn matches_braced(&self, text: &str) -> Option<PatternMatch> {
        self.match_with(text, true)
    }

    fn match_with(&self, text: &str, brace_identifiers: bool) -> Option<PatternMatch> {
        let caps = self.regex.captures(text)?;
        let values = self
            .placeholders
            .iter()
            .map(|p| {
                let key = if brace_identifiers {
                    format!("{{{}}}", p.name)
                } else {
                    p.name.clone()
                };
                let value = caps.name(&p.group).map_or("", |m| m.as_str());
                (key, value.to_string())
            })
            .collect();
        Some(PatternMatch { values })
    }

    /// Render the template, replacing every `{name}` with its value.
    ///
    /// Values are inserted verbatim, one key at a time, so a value that
    /// itself contains `{other}` may be replaced again by a later key.
    pub fn fill<I, K, V>(&self, values: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        values
            .into_iter()
            .fold(self.stripped.clone(), |out, (key, value)| {
                out.replace(&format!("{{{}}}", key.as_ref()), value.as_ref())
            })
    }

    /// Render a date through the `year`, `month`, `day`, `hours`, `minutes`,
    /// `seconds` and `tz` keys. Everything but `tz` is zero-padded to two
    /// digits. An absent date renders as the empty string.
    pub fn fill_date<D>(&self, date: Option<&D>) -> String
    where
        D: FillDate + ?Sized,
    {
        let Some(date) = date else {
            return String::new();
        };
        let f = date.date_fields();
        self.fill([
            ("year", format!("{:02}", f.year)),
            ("month", format!("{:02}", f.month)),
            ("day", format!("{:02}", f.day)),
            ("hours", format!("{:02}", f.hours)),
            ("minutes", format!("{:02}", f.minutes)),
            ("seconds", format!("{:02}", f.seconds)),
            ("tz", f.tz_offset_minutes.to_string()),
        ])
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Replace the first case-insensitive occurrence of an ASCII `token`.
fn replace_token(format: &str, token: &str, placeholder: &str) -> String {
    match format.to_ascii_lowercase().find(token) {
        Some(pos) => format!(
            "{}{}{}",
            &format[..pos],
            placeholder,
            &format[pos + token.len()..]
        ),
        None => format.to_string(),
    }
}

// ── Match results ───────────────────────────────────────────────────────────

/// Placeholder values captured by [`Pattern::matches`], in declaration order.
///
/// Values are the raw matched substrings; callers parse them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternMatch {
    values: Vec<(String, String)>,
}

impl PatternMatch {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Interpret a date match (`year`, `month`, `day` keys) as a calendar date.
    ///
    /// Returns `None` when a key is missing or the values do not form a
    /// valid date.
    pub fn to_date(&self) -> Option<CalendarDate> {
        CalendarDate::from_parts(self.get("year")?, self.get("month")?, self.get("day")?).ok()
    }
}

impl Serialize for PatternMatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

// ── Date sources ────────────────────────────────────────────────────────────

/// The values [`Pattern::fill_date`] substitutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    /// Minutes to add to local time to reach UTC (positive west of Greenwich).
    pub tz_offset_minutes: i32,
}

/// Anything that can be rendered through [`Pattern::fill_date`].
pub trait FillDate {
    fn date_fields(&self) -> DateFields;
}

impl FillDate for CalendarDate {
    fn date_fields(&self) -> DateFields {
        DateFields {
            year: self.year(),
            month: self.month(),
            day: self.day(),
            ..DateFields::default()
        }
    }
}

impl FillDate for NaiveDate {
    fn date_fields(&self) -> DateFields {
        DateFields {
            year: self.year(),
            month: self.month(),
            day: self.day(),
            ..DateFields::default()
        }
    }
}

impl FillDate for NaiveDateTime {
    fn date_fields(&self) -> DateFields {
        DateFields {
            year: self.year(),
            month: self.month(),
            day: self.day(),
            hours: self.hour(),
            minutes: self.minute(),
            seconds: self.second(),
            tz_offset_minutes: 0,
        }
    }
}

impl<Tz: TimeZone> FillDate for DateTime<Tz> {
    fn date_fields(&self) -> DateFields {
        let local = self.naive_local();
        DateFields {
            tz_offset_minutes: -self.offset().fix().local_minus_utc() / 60,
            ..local.date_fields()
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
