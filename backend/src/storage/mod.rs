//! # Storage Module
//!
//! Handles persistence of day records.
//!
//! The domain layer only sees the `DocumentStore` trait: a collection of JSON
//! documents addressed by string keys, with whole-document create and
//! field-level update. Two implementations are provided:
//!
//! - **CSV files** (`csv`): one file per collection in the data directory
//! - **Memory** (`memory`): process-local, used for tests and throwaway runs
//!
//! `DayRecordRepository` sits on top of a store and speaks in day records
//! and date keys.

pub mod csv;
pub mod day_repository;
pub mod memory;
pub mod traits;

pub use self::csv::{CsvConnection, CsvDocumentStore};
pub use day_repository::{DayDocumentMapper, DayRecordRepository};
pub use memory::{InMemoryDocumentStore, StoreWrite};
pub use traits::{Document, DocumentStore, Fields};
