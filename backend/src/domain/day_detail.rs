//! Day detail view state.
//!
//! Holds the one day currently open in the detail view: its lifecycle
//! (`loading`, `ready`, `invalid_date`) and a local copy of the record that
//! edits are applied to before the store confirms them. Number, flag and
//! productivity edits are written straight through; text edits go through
//! the debounced writer.

use log::{debug, error, info, warn};
use shared::{DayDetailState, DayDetailView, DayEdit, DayRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::debounce::DebouncedFieldWriter;
use super::models::{apply_edit, DayKey, TextField};
use crate::storage::DayRecordRepository;

pub const INVALID_DATE_TITLE: &str = "Invalid Date";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DayDetailError {
    #[error("No day is open")]
    NotOpen,
    #[error("Day {requested} is not the open day ({open})")]
    NotOpenDay { requested: String, open: String },
    #[error("Day {0} is still loading")]
    StillLoading(String),
    #[error("{field} must be a non-negative amount, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },
}

struct OpenDay {
    route_key: String,
    key: Option<DayKey>,
    state: DayDetailState,
    record: DayRecord,
    generation: u64,
}

#[derive(Clone)]
pub struct DayDetailService {
    repository: DayRecordRepository,
    writer: DebouncedFieldWriter,
    year: i32,
    current: Arc<Mutex<Option<OpenDay>>>,
    generation: Arc<AtomicU64>,
}

impl DayDetailService {
    pub fn new(repository: DayRecordRepository, writer: DebouncedFieldWriter, year: i32) -> Self {
        Self {
            repository,
            writer,
            year,
            current: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Open the day named by a `MM-DD` route key
    ///
    /// Pending text edits of the previously open day are flushed first. A
    /// day without a stored record gets the default record created before
    /// the view turns ready. If another `open` starts while this one waits
    /// on the store, this load is dropped and the newer view is returned.
    pub async fn open(&self, route_key: &str) -> DayDetailView {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let parsed = DayKey::from_route(route_key, self.year);

        let previous = {
            let mut current = self.lock_current();
            let state = if parsed.is_ok() {
                DayDetailState::Loading
            } else {
                DayDetailState::InvalidDate
            };
            let previous = current.as_ref().and_then(|open| open.key);
            *current = Some(OpenDay {
                route_key: route_key.to_string(),
                key: parsed.as_ref().ok().copied(),
                state,
                record: DayRecord::default(),
                generation,
            });
            previous
        };

        if let Some(previous) = previous {
            let flushed = self.writer.flush_date(previous).await;
            if flushed > 0 {
                debug!("Flushed {} pending edits for {}", flushed, previous);
            }
        }

        let key = match parsed {
            Ok(key) => key,
            Err(e) => {
                warn!("Opening invalid day {:?}: {}", route_key, e);
                return self.current_view().unwrap_or_else(|| self.invalid_view(route_key));
            }
        };

        let record = match self.repository.ensure_record(key).await {
            Ok(record) => record,
            Err(e) => {
                error!("Failed to load {}: {}. Showing defaults.", key, e);
                DayRecord::default()
            }
        };

        let mut current = self.lock_current();
        let view = match current.as_mut() {
            Some(open) if open.generation == generation => {
                open.record = record;
                open.state = DayDetailState::Ready;
                info!("Day {} ready", key);
                self.view_of(open)
            }
            Some(open) => {
                debug!("Discarding load of {}; view moved to {}", key, open.route_key);
                self.view_of(open)
            }
            None => {
                debug!("Day {} was closed while loading", key);
                self.view_of(&OpenDay {
                    route_key: route_key.to_string(),
                    key: Some(key),
                    state: DayDetailState::Ready,
                    record,
                    generation,
                })
            }
        };
        view
    }

    /// Apply an edit to the open day
    ///
    /// Local state changes first. A failed store write is logged and the
    /// local value is kept.
    pub async fn edit(&self, route_key: &str, edit: DayEdit) -> Result<DayDetailView, DayDetailError> {
        validate_amount(&edit)?;
        let requested = DayKey::from_route(route_key, self.year).ok();

        let (key, view) = {
            let mut current = self.lock_current();
            let open = current.as_mut().ok_or(DayDetailError::NotOpen)?;
            let key = match open.key {
                Some(key) if Some(key) == requested => key,
                _ => {
                    return Err(DayDetailError::NotOpenDay {
                        requested: route_key.to_string(),
                        open: open.route_key.clone(),
                    })
                }
            };
            if open.state == DayDetailState::Loading {
                return Err(DayDetailError::StillLoading(open.route_key.clone()));
            }
            apply_edit(&mut open.record, &edit);
            (key, self.view_of(open))
        };

        match edit {
            DayEdit::DayNote(text) => self.writer.write(key, TextField::DayNote, text),
            DayEdit::DailyGoal(text) => self.writer.write(key, TextField::DailyGoal, text),
            other => {
                if let Err(e) = self.repository.apply(key, &other).await {
                    error!("Failed to save {} for {}: {}", other.field_name(), key, e);
                }
            }
        }

        Ok(view)
    }

    /// Leave the open day, flushing its pending text edits
    pub async fn close(&self, route_key: &str) -> Result<usize, DayDetailError> {
        let closed = {
            let mut current = self.lock_current();
            let open = current.as_ref().ok_or(DayDetailError::NotOpen)?;
            let is_open_day = match open.key {
                Some(key) => DayKey::from_route(route_key, self.year).ok() == Some(key),
                None => open.route_key == route_key,
            };
            if !is_open_day {
                return Err(DayDetailError::NotOpenDay {
                    requested: route_key.to_string(),
                    open: open.route_key.clone(),
                });
            }
            self.generation.fetch_add(1, Ordering::SeqCst);
            current.take().and_then(|open| open.key)
        };

        match closed {
            Some(key) => Ok(self.writer.flush_date(key).await),
            None => Ok(0),
        }
    }

    /// Persist every pending text edit, used on shutdown
    pub async fn flush_pending(&self) -> usize {
        self.writer.flush_all().await
    }

    pub fn current_view(&self) -> Option<DayDetailView> {
        let current = self.lock_current();
        current.as_ref().map(|open| self.view_of(open))
    }

    fn view_of(&self, open: &OpenDay) -> DayDetailView {
        DayDetailView {
            state: open.state,
            route_key: open.route_key.clone(),
            date_key: open.key.map(|key| key.to_string()),
            year: self.year,
            title: open
                .key
                .map(|key| key.short_label())
                .unwrap_or_else(|| INVALID_DATE_TITLE.to_string()),
            record: open.record.clone(),
        }
    }

    fn invalid_view(&self, route_key: &str) -> DayDetailView {
        DayDetailView {
            state: DayDetailState::InvalidDate,
            route_key: route_key.to_string(),
            date_key: None,
            year: self.year,
            title: INVALID_DATE_TITLE.to_string(),
            record: DayRecord::default(),
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<OpenDay>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn validate_amount(edit: &DayEdit) -> Result<(), DayDetailError> {
    if let DayEdit::Expense(value) | DayEdit::Income(value) = edit {
        if !value.is_finite() || *value < 0.0 {
            return Err(DayDetailError::InvalidAmount {
                field: edit.field_name(),
                value: *value,
            });
        }
    }
    Ok(())
}
