//! Locale-aware due-date parsing and display.
//!
//! The date order is picked from `LC_ALL`, `LC_TIME` or `LANG` with a fixed
//! region table: US is month-first, a handful of regions are year-first, and
//! everything else (including an unknown locale) is day-first.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

/// Order of day, month and year in user-entered and displayed dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    Dmy,
    Mdy,
    Ymd,
}

/// Date formatting rules for the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateLocale {
    pub order: DateOrder,
}

impl Default for DateLocale {
    fn default() -> Self {
        Self { order: DateOrder::Dmy }
    }
}

/// Formats tried after the locale's own layouts.
const FALLBACK_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d %b %Y", "%d %B %Y", "%B %d %Y"];

impl DateLocale {
    pub fn new(order: DateOrder) -> Self {
        Self { order }
    }

    /// Detect from the process environment.
    pub fn from_env() -> Self {
        for key in ["LC_ALL", "LC_TIME", "LANG"] {
            if let Ok(raw) = std::env::var(key) {
                if let Some(region) = locale_region(&raw) {
                    return Self::for_region(&region);
                }
                if parse_language(&normalize_locale(&raw)).is_some() {
                    return Self::default();
                }
            }
        }
        Self::default()
    }

    /// Map an ISO region code onto a date order.
    pub fn for_region(region: &str) -> Self {
        let order = match region {
            "US" => DateOrder::Mdy,
            "CA" | "CN" | "JP" | "KR" | "HU" | "LT" => DateOrder::Ymd,
            _ => DateOrder::Dmy,
        };
        Self { order }
    }

    /// Placeholder shown in the due-date field.
    pub fn hint(&self) -> &'static str {
        match self.order {
            DateOrder::Dmy => "DD/MM/YYYY",
            DateOrder::Mdy => "MM/DD/YYYY",
            DateOrder::Ymd => "YYYY-MM-DD",
        }
    }

    fn display_format(&self) -> &'static str {
        match self.order {
            DateOrder::Dmy => "%d/%m/%Y",
            DateOrder::Mdy => "%m/%d/%Y",
            DateOrder::Ymd => "%Y-%m-%d",
        }
    }

    fn input_formats(&self) -> [&'static str; 3] {
        match self.order {
            DateOrder::Dmy => ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"],
            DateOrder::Mdy => ["%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y"],
            DateOrder::Ymd => ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"],
        }
    }

    /// Parse a due date. Blank input means "no due date".
    ///
    /// Calendar dates are stored as midnight UTC; RFC3339 input keeps its time.
    pub fn parse_due(&self, raw: &str) -> Result<Option<DateTime<Utc>>, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        for fmt in self.input_formats().iter().chain(FALLBACK_FORMATS.iter()) {
            if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
                return Ok(Some(date_only_utc(date)));
            }
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Some(ts.with_timezone(&Utc)));
        }
        Err(format!(
            "due date must match {} (locale), YYYY-MM-DD, or RFC3339",
            self.hint()
        ))
    }

    /// Format the calendar date of a due timestamp.
    pub fn format_date(&self, due: DateTime<Utc>) -> String {
        due.format(self.display_format()).to_string()
    }

    /// Comment timestamps are moments in time, shown in local time.
    pub fn format_timestamp(&self, ts: DateTime<Utc>) -> String {
        ts.with_timezone(&Local)
            .format(&format!("{} %H:%M", self.display_format()))
            .to_string()
    }

    /// Relative label for a due date and whether it is overdue.
    pub fn due_label(&self, due: DateTime<Utc>, now: DateTime<Utc>) -> DueLabel {
        let delta = (due.date_naive() - now.date_naive()).num_days();
        match delta {
            0 => DueLabel::new("Today", DueTone::Today),
            1 => DueLabel::new("Tomorrow", DueTone::Normal),
            d if d < 0 && -d <= 7 => DueLabel::new(&format!("{}d", -d), DueTone::Overdue),
            d if d < 0 => DueLabel::new(&self.format_date(due), DueTone::Overdue),
            _ => DueLabel::new(&self.format_date(due), DueTone::Normal),
        }
    }
}

/// How a due label should be colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueTone {
    Today,
    Normal,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueLabel {
    pub text: String,
    pub tone: DueTone,
}

impl DueLabel {
    fn new(text: &str, tone: DueTone) -> Self {
        Self {
            text: text.to_string(),
            tone,
        }
    }
}

/// Midnight UTC of a calendar date.
pub fn date_only_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// Strip codeset and modifier, and use `-` as the subtag separator:
/// `en_US.UTF-8@euro` becomes `en-US`.
pub fn normalize_locale(raw: &str) -> String {
    let mut locale = raw.trim();
    if let Some(idx) = locale.find('.') {
        locale = &locale[..idx];
    }
    if let Some(idx) = locale.find('@') {
        locale = &locale[..idx];
    }
    locale.replace('_', "-").trim().to_string()
}

fn parse_language(tag: &str) -> Option<String> {
    let lang = tag.split('-').next()?;
    let valid = (2..=3).contains(&lang.len()) && lang.chars().all(|c| c.is_ascii_alphabetic());
    valid.then(|| lang.to_lowercase())
}

/// Region of a locale string: explicit when present, otherwise the most
/// likely region for a few languages whose default region matters here.
pub fn locale_region(raw: &str) -> Option<String> {
    let tag = normalize_locale(raw);
    let lang = parse_language(&tag)?;
    let explicit = tag.split('-').skip(1).find(|part| {
        part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic())
    });
    if let Some(region) = explicit {
        return Some(region.to_uppercase());
    }
    let likely = match lang.as_str() {
        "en" => "US",
        "ja" => "JP",
        "zh" => "CN",
        "ko" => "KR",
        "hu" => "HU",
        "lt" => "LT",
        _ => return None,
    };
    Some(likely.to_string())
}
