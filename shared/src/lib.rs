use serde::{Deserialize, Serialize};
use std::fmt;

/// Productivity rating for a day, persisted as its palette tag
///
/// Deserialization is total: any tag outside the palette becomes `Unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Productivity {
    /// No rating chosen yet
    #[default]
    Unset,
    Unproductive,
    Neutral,
    Productive,
    VeryProductive,
}

/// Cell color used for days without a recognised productivity tag
pub const DEFAULT_CELL_COLOR: &str = "bg-yellow-50 text-gray-700 border border-gray-300";

impl Productivity {
    /// The selectable ratings, in the order the day view shows them
    pub const PALETTE: [Productivity; 4] = [
        Productivity::Unproductive,
        Productivity::Neutral,
        Productivity::Productive,
        Productivity::VeryProductive,
    ];

    /// Tag stored in the `productivity` field of a day document
    pub fn tag(&self) -> &'static str {
        match self {
            Productivity::Unset => "gray",
            Productivity::Unproductive => "bg-red-400",
            Productivity::Neutral => "bg-slate-300",
            Productivity::Productive => "bg-green-300",
            Productivity::VeryProductive => "bg-green-500",
        }
    }

    /// Parse a stored tag. Unknown tags map to `Unset`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "bg-red-400" => Productivity::Unproductive,
            "bg-slate-300" => Productivity::Neutral,
            "bg-green-300" => Productivity::Productive,
            "bg-green-500" => Productivity::VeryProductive,
            _ => Productivity::Unset,
        }
    }

    /// Calendar cell color for this rating
    pub fn cell_color(&self) -> &'static str {
        match self {
            Productivity::Unproductive => "bg-red-400 text-white",
            Productivity::Neutral => "bg-slate-50 text-gray-700",
            Productivity::Productive => "bg-green-300 text-white",
            Productivity::VeryProductive => "bg-green-500 text-white",
            Productivity::Unset => DEFAULT_CELL_COLOR,
        }
    }
}

impl From<String> for Productivity {
    fn from(tag: String) -> Self {
        Productivity::from_tag(&tag)
    }
}

impl From<Productivity> for String {
    fn from(productivity: Productivity) -> Self {
        productivity.tag().to_string()
    }
}

impl fmt::Display for Productivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Persisted state of one calendar day
///
/// Stored in the day collection under the key `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DayRecord {
    pub productivity: Productivity,
    /// Money spent that day, never negative
    pub expense: f64,
    /// Money received that day, never negative
    pub income: f64,
    pub gym: bool,
    pub day_note: String,
    pub daily_goal: String,
}

impl Default for DayRecord {
    fn default() -> Self {
        Self {
            productivity: Productivity::Unset,
            expense: 0.0,
            income: 0.0,
            gym: false,
            day_note: String::new(),
            daily_goal: String::new(),
        }
    }
}

/// A single field edit on the open day
///
/// Serialized as `{"field": "<name>", "value": <value>}` where the field
/// names match the stored document fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum DayEdit {
    Productivity(Productivity),
    Expense(f64),
    Income(f64),
    Gym(bool),
    DayNote(String),
    DailyGoal(String),
}

impl DayEdit {
    /// Name of the document field this edit patches
    pub fn field_name(&self) -> &'static str {
        match self {
            DayEdit::Productivity(_) => "productivity",
            DayEdit::Expense(_) => "expense",
            DayEdit::Income(_) => "income",
            DayEdit::Gym(_) => "gym",
            DayEdit::DayNote(_) => "dayNote",
            DayEdit::DailyGoal(_) => "dailyGoal",
        }
    }

    /// Text edits are debounced, everything else writes through
    pub fn is_text(&self) -> bool {
        matches!(self, DayEdit::DayNote(_) | DayEdit::DailyGoal(_))
    }
}

/// One day in the month grid (derived, never persisted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarCell {
    /// Day of month, starting at 1
    pub date: u32,
    pub color: String,
    pub has_gym: bool,
    /// `MM-DD` form used in day routes
    pub route_key: String,
    /// UI path of the day detail view, e.g. `/day/01-05`
    pub path: String,
}

/// A calendar month with its cells and money summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    /// 1 = January
    pub month: u32,
    pub month_name: String,
    pub first_day_of_week: u32, // 0 = Sunday, 1 = Monday, etc.
    pub cells: Vec<CalendarCell>,
    pub total_expense: f64,
    pub total_income: f64,
    /// Totals formatted for display, e.g. `₹150.00`
    pub expense_label: String,
    pub income_label: String,
    /// Total expense is above the configured alert threshold
    pub expense_alert: bool,
    pub has_income: bool,
}

/// Request to jump the calendar to a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectMonthRequest {
    /// 0 = January, 11 = December
    pub month_index: u32,
}

/// Lifecycle of the day detail view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayDetailState {
    Loading,
    Ready,
    /// The requested route key is not a real date
    InvalidDate,
}

/// Snapshot of the day detail view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayDetailView {
    pub state: DayDetailState,
    /// Route key as requested, e.g. `01-05`
    pub route_key: String,
    /// Storage key, e.g. `2025-01-05`; absent for invalid dates
    pub date_key: Option<String>,
    pub year: i32,
    /// Short heading such as `Jan 5`, or `Invalid Date`
    pub title: String,
    pub record: DayRecord,
}

/// Whatever view a UI path resolves to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ResolvedView {
    Calendar(CalendarMonth),
    Day(DayDetailView),
}

/// Log line forwarded by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
    pub component: Option<String>,
}
