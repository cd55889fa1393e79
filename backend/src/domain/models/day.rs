use chrono::{Datelike, NaiveDate};
use shared::{DayEdit, DayRecord};
use std::fmt;

/// Short month names used in day headings
const SHORT_MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateKeyError {
    #[error("Date key {0:?} is not in the expected format")]
    Malformed(String),
    #[error("Date key {0:?} does not name a real calendar day")]
    NoSuchDay(String),
}

/// Calendar day used as a document key
///
/// Renders as `YYYY-MM-DD` for storage and `MM-DD` for routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(DayKey)
    }

    /// Parse a storage key such as `2025-01-05`
    ///
    /// Only the zero-padded form is accepted, so every day has exactly one
    /// storage key.
    pub fn parse(key: &str) -> Result<Self, DateKeyError> {
        let parts: Vec<&str> = key.split('-').collect();
        let widths: Vec<usize> = parts.iter().map(|part| part.len()).collect();
        if widths != [4, 2, 2] {
            return Err(DateKeyError::Malformed(key.to_string()));
        }
        let year = parse_component::<i32>(parts[0], key)?;
        let month = parse_component::<u32>(parts[1], key)?;
        let day = parse_component::<u32>(parts[2], key)?;
        DayKey::new(year, month, day).ok_or_else(|| DateKeyError::NoSuchDay(key.to_string()))
    }

    /// Parse a route key such as `01-05` within the given year
    pub fn from_route(route_key: &str, year: i32) -> Result<Self, DateKeyError> {
        let parts: Vec<&str> = route_key.trim().split('-').collect();
        if parts.len() != 2 {
            return Err(DateKeyError::Malformed(route_key.to_string()));
        }
        let month = parse_component::<u32>(parts[0], route_key)?;
        let day = parse_component::<u32>(parts[1], route_key)?;
        DayKey::new(year, month, day).ok_or_else(|| DateKeyError::NoSuchDay(route_key.to_string()))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn route_key(&self) -> String {
        format!("{:02}-{:02}", self.month(), self.day())
    }

    /// Heading shown on the day view, e.g. `Jan 5`
    pub fn short_label(&self) -> String {
        format!("{} {}", SHORT_MONTH_NAMES[self.0.month0() as usize], self.day())
    }
}

fn parse_component<T: std::str::FromStr>(part: &str, whole: &str) -> Result<T, DateKeyError> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(DateKeyError::Malformed(whole.to_string()));
    }
    part.parse::<T>()
        .map_err(|_| DateKeyError::Malformed(whole.to_string()))
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

/// Free-text fields of a day; these go through the debounced writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    DayNote,
    DailyGoal,
}

impl TextField {
    pub fn field_name(&self) -> &'static str {
        match self {
            TextField::DayNote => "dayNote",
            TextField::DailyGoal => "dailyGoal",
        }
    }

    pub fn into_edit(self, value: String) -> DayEdit {
        match self {
            TextField::DayNote => DayEdit::DayNote(value),
            TextField::DailyGoal => DayEdit::DailyGoal(value),
        }
    }
}

/// A day record together with the date it is stored under
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDay {
    pub key: DayKey,
    pub record: DayRecord,
}

/// Apply an edit to a local copy of a record
pub fn apply_edit(record: &mut DayRecord, edit: &DayEdit) {
    match edit {
        DayEdit::Productivity(value) => record.productivity = *value,
        DayEdit::Expense(value) => record.expense = *value,
        DayEdit::Income(value) => record.income = *value,
        DayEdit::Gym(value) => record.gym = *value,
        DayEdit::DayNote(value) => record.day_note = value.clone(),
        DayEdit::DailyGoal(value) => record.daily_goal = value.clone(),
    }
}
