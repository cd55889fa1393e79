pub mod day;

pub use day::{apply_edit, DateKeyError, DayKey, StoredDay, TextField};
