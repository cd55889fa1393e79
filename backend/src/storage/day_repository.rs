//! # Day Record Repository
//!
//! Maps day records onto documents of one collection in a `DocumentStore`.
//! Decoding is lenient: a missing or mistyped field falls back to its
//! default instead of failing the whole record.

use anyhow::Result;
use log::{info, warn};
use serde_json::{Map, Value};
use shared::{DayEdit, DayRecord, Productivity};
use std::sync::Arc;

use super::traits::{DocumentStore, Fields};
use crate::domain::models::{DayKey, StoredDay};

pub struct DayDocumentMapper;

impl DayDocumentMapper {
    /// Decode a stored document into a record
    pub fn to_record(fields: &Fields) -> DayRecord {
        DayRecord {
            productivity: fields
                .get("productivity")
                .and_then(Value::as_str)
                .map(Productivity::from_tag)
                .unwrap_or_default(),
            expense: amount_field(fields, "expense"),
            income: amount_field(fields, "income"),
            gym: fields.get("gym").and_then(Value::as_bool).unwrap_or(false),
            day_note: text_field(fields, "dayNote"),
            daily_goal: text_field(fields, "dailyGoal"),
        }
    }

    /// Encode a full record as document fields
    pub fn to_fields(record: &DayRecord) -> Fields {
        match serde_json::to_value(record) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        }
    }

    /// Single-field patch for an edit
    pub fn to_patch(edit: &DayEdit) -> Fields {
        let value = match edit {
            DayEdit::Productivity(productivity) => Value::from(productivity.tag()),
            DayEdit::Expense(amount) | DayEdit::Income(amount) => Value::from(*amount),
            DayEdit::Gym(gym) => Value::from(*gym),
            DayEdit::DayNote(text) | DayEdit::DailyGoal(text) => Value::from(text.as_str()),
        };
        let mut patch = Map::new();
        patch.insert(edit.field_name().to_string(), value);
        patch
    }
}

fn amount_field(fields: &Fields, name: &str) -> f64 {
    fields
        .get(name)
        .and_then(Value::as_f64)
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}

fn text_field(fields: &Fields, name: &str) -> String {
    fields
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Repository for day records in one collection
#[derive(Clone)]
pub struct DayRecordRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl DayRecordRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Every stored day whose key parses as a date
    pub async fn list_all(&self) -> Result<Vec<StoredDay>> {
        let documents = self.store.get_all(&self.collection).await?;
        let mut days = Vec::with_capacity(documents.len());
        for document in documents {
            match DayKey::parse(&document.key) {
                Ok(key) => days.push(StoredDay {
                    key,
                    record: DayDocumentMapper::to_record(&document.fields),
                }),
                Err(e) => warn!("Skipping document in {}: {}", self.collection, e),
            }
        }
        Ok(days)
    }

    pub async fn get(&self, key: DayKey) -> Result<Option<DayRecord>> {
        let document = self.store.get(&self.collection, &key.to_string()).await?;
        Ok(document.map(|doc| DayDocumentMapper::to_record(&doc.fields)))
    }

    /// Return the record for `key`, creating the default record first if
    /// the day has never been stored
    ///
    /// Calling this again for an existing day does not write anything.
    pub async fn ensure_record(&self, key: DayKey) -> Result<DayRecord> {
        if let Some(record) = self.get(key).await? {
            return Ok(record);
        }

        let record = DayRecord::default();
        self.store
            .create(&self.collection, &key.to_string(), DayDocumentMapper::to_fields(&record))
            .await?;
        info!("Created default record for {}", key);
        Ok(record)
    }

    /// Patch a single field of an existing day
    pub async fn apply(&self, key: DayKey, edit: &DayEdit) -> Result<()> {
        self.store
            .update(&self.collection, &key.to_string(), DayDocumentMapper::to_patch(edit))
            .await
    }
}
