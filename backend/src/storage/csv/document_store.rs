//! # CSV Document Store
//!
//! File-backed document store. Each collection lives in its own CSV file in
//! the data directory; each row holds one document.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── daybook.yaml          (optional configuration)
//! └── calendarDays.csv      ← one file per collection
//! ```
//!
//! ## CSV Format
//!
//! ```csv
//! key,fields
//! 2025-01-05,"{""productivity"":""bg-slate-300"",""expense"":100.0}"
//! ```
//!
//! The `fields` column carries the document as a JSON object. Every write
//! rewrites the collection through a temp file followed by a rename.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use csv::{Reader, Writer};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::sync::{Arc, Mutex};

use super::connection::CsvConnection;
use crate::storage::traits::{Document, DocumentStore, Fields};

/// CSV row structure for documents
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentRow {
    key: String,
    fields: String,
}

impl TryFrom<DocumentRow> for Document {
    type Error = anyhow::Error;

    fn try_from(row: DocumentRow) -> Result<Self> {
        let value: Value = serde_json::from_str(&row.fields)
            .with_context(|| format!("Failed to parse fields of document {}", row.key))?;
        match value {
            Value::Object(fields) => Ok(Document { key: row.key, fields }),
            other => Err(anyhow!("Document {} is not a JSON object: {}", row.key, other)),
        }
    }
}

#[derive(Clone)]
pub struct CsvDocumentStore {
    connection: CsvConnection,
    // Serializes read-modify-write cycles on the collection files
    write_lock: Arc<Mutex<()>>,
}

impl CsvDocumentStore {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            connection,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read all documents of a collection, keyed by document key
    fn read_documents(&self, collection: &str) -> Result<BTreeMap<String, Fields>> {
        let file_path = self.connection.ensure_collection_file_exists(collection)?;
        let file = File::open(&file_path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut documents = BTreeMap::new();
        for result in csv_reader.deserialize::<DocumentRow>() {
            let row = result?;
            match Document::try_from(row) {
                Ok(document) => {
                    documents.insert(document.key, document.fields);
                }
                Err(e) => {
                    warn!("Skipping unreadable row in {}: {}", collection, e);
                }
            }
        }

        Ok(documents)
    }

    /// Write all documents of a collection
    fn write_documents(&self, collection: &str, documents: &BTreeMap<String, Fields>) -> Result<()> {
        let file_path = self.connection.collection_file_path(collection)?;
        let temp_file_path = file_path.with_extension("csv.tmp");

        {
            let file = File::create(&temp_file_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(file));
            for (key, fields) in documents {
                csv_writer.serialize(DocumentRow {
                    key: key.clone(),
                    fields: serde_json::to_string(fields)?,
                })?;
            }
            csv_writer.flush()?;
        }

        fs::rename(&temp_file_path, &file_path)?;
        debug!("Wrote {} documents to {}", documents.len(), file_path.display());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for CsvDocumentStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>> {
        let documents = self.read_documents(collection)?;
        Ok(documents
            .into_iter()
            .map(|(key, fields)| Document { key, fields })
            .collect())
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>> {
        let mut documents = self.read_documents(collection)?;
        Ok(documents
            .remove(key)
            .map(|fields| Document { key: key.to_string(), fields }))
    }

    async fn create(&self, collection: &str, key: &str, fields: Fields) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut documents = self.read_documents(collection)?;
        documents.insert(key.to_string(), fields);
        self.write_documents(collection, &documents)
    }

    async fn update(&self, collection: &str, key: &str, patch: Fields) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut documents = self.read_documents(collection)?;
        let document = documents
            .get_mut(key)
            .ok_or_else(|| anyhow!("No document {}/{} to update", collection, key))?;
        for (field, value) in patch {
            document.insert(field, value);
        }
        self.write_documents(collection, &documents)
    }
}
