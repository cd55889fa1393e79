//! Debounced writes for free-text day fields.
//!
//! Each `(day, field)` pair has at most one pending entry holding the latest
//! value and the timer that will persist it. A new write for the same pair
//! replaces the entry and restarts the timer; different pairs never affect
//! each other. The day key is captured by value when `write` is called, so a
//! pending edit always lands on the day it was typed into.

use log::{debug, error};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::models::{DayKey, TextField};
use crate::storage::DayRecordRepository;

type PendingKey = (DayKey, TextField);

struct PendingWrite {
    value: String,
    ticket: u64,
    timer: JoinHandle<()>,
}

#[derive(Clone)]
pub struct DebouncedFieldWriter {
    repository: DayRecordRepository,
    quiet_window: Duration,
    pending: Arc<Mutex<HashMap<PendingKey, PendingWrite>>>,
    next_ticket: Arc<AtomicU64>,
}

impl DebouncedFieldWriter {
    pub fn new(repository: DayRecordRepository, quiet_window: Duration) -> Self {
        Self {
            repository,
            quiet_window,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_ticket: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Schedule `value` to be written to `field` of `day` once the quiet
    /// window passes without another write to the same pair
    ///
    /// Must be called from within a tokio runtime.
    pub fn write(&self, day: DayKey, field: TextField, value: impl Into<String>) {
        let value = value.into();
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);

        // The entry is inserted before the timer can look for it
        let mut pending = self.lock_pending();
        let writer = self.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(writer.quiet_window).await;
            writer.fire(day, field, ticket).await;
        });

        if let Some(replaced) = pending.insert((day, field), PendingWrite { value, ticket, timer }) {
            replaced.timer.abort();
            debug!("Restarted quiet window for {} {}", day, field.field_name());
        }
    }

    /// Persist every pending write for `day` right away
    ///
    /// Returns the number of writes flushed.
    pub async fn flush_date(&self, day: DayKey) -> usize {
        let drained = {
            let mut pending = self.lock_pending();
            let keys: Vec<PendingKey> = pending.keys().filter(|(d, _)| *d == day).copied().collect();
            keys.into_iter()
                .filter_map(|key| pending.remove(&key).map(|entry| (key, entry)))
                .collect::<Vec<_>>()
        };
        self.persist_drained(drained).await
    }

    /// Persist every pending write for every day
    pub async fn flush_all(&self) -> usize {
        let drained: Vec<_> = self.lock_pending().drain().collect();
        self.persist_drained(drained).await
    }

    pub fn pending_count(&self) -> usize {
        self.lock_pending().len()
    }

    async fn persist_drained(&self, drained: Vec<(PendingKey, PendingWrite)>) -> usize {
        let count = drained.len();
        for ((day, field), entry) in drained {
            entry.timer.abort();
            self.persist(day, field, entry.value).await;
        }
        count
    }

    async fn fire(&self, day: DayKey, field: TextField, ticket: u64) {
        let value = {
            let mut pending = self.lock_pending();
            match pending.get(&(day, field)) {
                Some(entry) if entry.ticket == ticket => {
                    pending.remove(&(day, field)).map(|entry| entry.value)
                }
                _ => None,
            }
        };

        if let Some(value) = value {
            self.persist(day, field, value).await;
        }
    }

    /// Failures are logged and dropped; the caller's local state stays as
    /// typed even though the store did not take the write.
    async fn persist(&self, day: DayKey, field: TextField, value: String) {
        let edit = field.into_edit(value);
        match self.repository.apply(day, &edit).await {
            Ok(()) => debug!("Saved {} for {}", field.field_name(), day),
            Err(e) => error!("Failed to save {} for {}: {}", field.field_name(), day, e),
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<PendingKey, PendingWrite>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
