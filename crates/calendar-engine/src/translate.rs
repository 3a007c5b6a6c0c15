//! UI strings for the supported languages.

/// Strings shown by the calendar view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translations {
    pub language: &'static str,
    pub cancel: &'static str,
    day: &'static str,
    days: &'static str,
}

pub const EN: Translations = Translations {
    language: "en",
    cancel: "Cancel",
    day: "day",
    days: "days",
};

pub const NL: Translations = Translations {
    language: "nl",
    cancel: "Annuleren",
    day: "dag",
    days: "dagen",
};

pub const DE: Translations = Translations {
    language: "de",
    cancel: "Abbrechen",
    day: "Tag",
    days: "Tagen",
};

const ALL: [&Translations; 3] = [&EN, &NL, &DE];

impl Translations {
    /// Pick translations by the language part of a locale tag
    /// (`"nl-NL"` → Dutch), falling back to English.
    pub fn for_locale(locale: &str) -> &'static Translations {
        let language = locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        ALL.into_iter()
            .find(|t| t.language == language)
            .unwrap_or(&EN)
    }

    /// Day count label, e.g. `"1 day"` or `"42 days"`.
    pub fn num_days(&self, count: i64) -> String {
        if count == 1 {
            format!("1 {}", self.day)
        } else {
            format!("{count} {}", self.days)
        }
    }
}
