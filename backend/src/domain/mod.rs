//! # Domain Layer
//!
//! Journal logic that sits between the REST layer and storage.
//!
//! - **calendar**: month layout and aggregation of day records into cells
//!   and totals
//! - **calendar_view**: the month currently shown and its derived view
//! - **day_detail**: the day currently open and its editable local state
//! - **debounce**: per-field delayed writes for free text
//! - **routes**: UI paths the views are reachable under
//!
//! Store failures never surface as errors here. Reads fall back to empty
//! data and writes are logged and dropped, so a view can always render.

pub mod calendar;
pub mod calendar_view;
pub mod day_detail;
pub mod debounce;
pub mod models;
pub mod routes;

pub use calendar::{CalendarService, MonthAggregate};
pub use calendar_view::{CalendarViewError, CalendarViewService, MonthStep};
pub use day_detail::{DayDetailError, DayDetailService};
pub use debounce::DebouncedFieldWriter;
pub use models::{DateKeyError, DayKey, StoredDay, TextField};
pub use routes::Route;
