//! UI routes: `/` is the month grid, `/day/MM-DD` is a day detail.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Calendar,
    /// Raw `MM-DD` segment, not yet validated as a date
    Day(String),
}

impl Route {
    /// Parse a UI path; `None` for paths no view handles
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Route::Calendar),
            ["day", date] => Some(Route::Day((*date).to_string())),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Calendar => "/".to_string(),
            Route::Day(date) => format!("/day/{}", date),
        }
    }
}
