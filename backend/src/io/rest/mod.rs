//! # REST API Interface Layer
//!
//! JSON endpoints under `/api`:
//!
//! - **calendar_apis**: mount the month view and move between months
//! - **day_apis**: open, edit and close the day detail view
//! - **view_apis**: resolve a UI path such as `/day/01-05` to its view
//! - **logging_apis**: forward client log lines into the server log
//!
//! Validation failures map to `400`, edits that don't fit the open day map
//! to `409`. Store failures never reach this layer as errors.

pub mod calendar_apis;
pub mod day_apis;
pub mod logging_apis;
pub mod view_apis;

#[cfg(test)]
pub(crate) mod test_utils;
