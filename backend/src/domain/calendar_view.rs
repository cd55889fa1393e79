//! Calendar view state: which month of the configured year is shown and the
//! month view last derived for it.
//!
//! Every month change re-reads all day records and re-runs the aggregation.
//! A read that finishes after a newer month change is dropped.

use log::{debug, error, info};
use shared::CalendarMonth;
use std::sync::{Arc, Mutex, MutexGuard};

use super::calendar::CalendarService;
use crate::storage::DayRecordRepository;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarViewError {
    #[error("Month index {0} is out of range (expected 0-11)")]
    MonthOutOfRange(u32),
}

/// Direction for month navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthStep {
    Previous,
    Next,
}

impl MonthStep {
    /// Step a zero-based month index, wrapping December and January
    pub fn apply(self, month_index: u32) -> u32 {
        match self {
            MonthStep::Previous => (month_index + 11) % 12,
            MonthStep::Next => (month_index + 1) % 12,
        }
    }
}

#[derive(Default)]
struct CalendarViewState {
    month_index: u32,
    generation: u64,
    view: Option<CalendarMonth>,
}

#[derive(Clone)]
pub struct CalendarViewService {
    repository: DayRecordRepository,
    calendar: CalendarService,
    year: i32,
    state: Arc<Mutex<CalendarViewState>>,
}

impl CalendarViewService {
    /// Start on `initial_month_index` (clamped into 0-11)
    pub fn new(
        repository: DayRecordRepository,
        calendar: CalendarService,
        year: i32,
        initial_month_index: u32,
    ) -> Self {
        Self {
            repository,
            calendar,
            year,
            state: Arc::new(Mutex::new(CalendarViewState {
                month_index: initial_month_index.min(11),
                ..CalendarViewState::default()
            })),
        }
    }

    pub fn current_month_index(&self) -> u32 {
        self.lock_state().month_index
    }

    /// Last derived view, if any month has been loaded
    pub fn current_view(&self) -> Option<CalendarMonth> {
        self.lock_state().view.clone()
    }

    /// Derive the view for the current month
    pub async fn refresh(&self) -> CalendarMonth {
        let (month_index, generation) = {
            let mut state = self.lock_state();
            state.generation += 1;
            (state.month_index, state.generation)
        };
        self.load(month_index, generation).await
    }

    /// Move one month back or forward and derive the new view
    pub async fn navigate(&self, step: MonthStep) -> CalendarMonth {
        let (month_index, generation) = {
            let mut state = self.lock_state();
            state.month_index = step.apply(state.month_index);
            state.generation += 1;
            (state.month_index, state.generation)
        };
        info!("Calendar moved {:?} to month index {}", step, month_index);
        self.load(month_index, generation).await
    }

    /// Jump straight to a month
    pub async fn select_month(&self, month_index: u32) -> Result<CalendarMonth, CalendarViewError> {
        if month_index > 11 {
            return Err(CalendarViewError::MonthOutOfRange(month_index));
        }
        let generation = {
            let mut state = self.lock_state();
            state.month_index = month_index;
            state.generation += 1;
            state.generation
        };
        info!("Calendar jumped to month index {}", month_index);
        Ok(self.load(month_index, generation).await)
    }

    async fn load(&self, month_index: u32, generation: u64) -> CalendarMonth {
        let month = month_index + 1;
        let days = match self.repository.list_all().await {
            Ok(days) => days,
            Err(e) => {
                error!("Failed to read day records for {}-{:02}: {}", self.year, month, e);
                Vec::new()
            }
        };

        let view = self.calendar.build_month_view(self.year, month, &days);

        let mut state = self.lock_state();
        if state.generation == generation {
            state.view = Some(view.clone());
        } else {
            debug!("Discarding stale calendar view for {}-{:02}", self.year, month);
        }
        view
    }

    fn lock_state(&self) -> MutexGuard<'_, CalendarViewState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Document, DocumentStore, Fields, InMemoryDocumentStore};
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;
    use shared::{Productivity, DEFAULT_CELL_COLOR};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    const COLLECTION: &str = "calendarDays";

    fn setup() -> (InMemoryDocumentStore, CalendarViewService) {
        let store = InMemoryDocumentStore::new();
        let repository = DayRecordRepository::new(Arc::new(store.clone()), COLLECTION);
        let service = CalendarViewService::new(repository, CalendarService::default(), 2025, 0);
        (store, service)
    }

    fn seed(store: &InMemoryDocumentStore, key: &str, value: serde_json::Value) {
        store.seed(COLLECTION, key, value.as_object().cloned().unwrap());
    }

    /// Counts `get_all` calls; the first call waits for a permit
    struct CountingStore {
        inner: InMemoryDocumentStore,
        reads: AtomicUsize,
        first_read_gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl DocumentStore for CountingStore {
        async fn get_all(&self, collection: &str) -> Result<Vec<Document>> {
            if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
                let _permit = self.first_read_gate.acquire().await?;
            }
            self.inner.get_all(collection).await
        }

        async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>> {
            self.inner.get(collection, key).await
        }

        async fn create(&self, collection: &str, key: &str, fields: Fields) -> Result<()> {
            self.inner.create(collection, key, fields).await
        }

        async fn update(&self, collection: &str, key: &str, patch: Fields) -> Result<()> {
            self.inner.update(collection, key, patch).await
        }
    }

    #[test]
    fn test_month_step_wraps() {
        assert_eq!(MonthStep::Next.apply(0), 1);
        assert_eq!(MonthStep::Next.apply(11), 0);
        assert_eq!(MonthStep::Previous.apply(0), 11);
        assert_eq!(MonthStep::Previous.apply(5), 4);

        let mut index = 3;
        for _ in 0..12 {
            index = MonthStep::Next.apply(index);
        }
        assert_eq!(index, 3);
    }

    #[tokio::test]
    async fn test_mount_january() {
        let (store, service) = setup();
        seed(&store, "2025-01-05", json!({"productivity": "bg-slate-300", "expense": 100}));
        seed(&store, "2025-01-12", json!({"expense": 50}));

        let view = service.refresh().await;

        assert_eq!(view.month, 1);
        assert_eq!(view.month_name, "January");
        assert_eq!(view.cells.len(), 31);
        assert_eq!(view.total_expense, 150.0);
        assert_eq!(view.total_income, 0.0);
        assert_eq!(view.cells[4].color, Productivity::Neutral.cell_color());
        assert_eq!(view.cells[11].color, DEFAULT_CELL_COLOR);
        assert_eq!(service.current_view(), Some(view));
    }

    #[tokio::test]
    async fn test_non_canonical_keys_do_not_shadow_a_day() {
        let (store, service) = setup();
        seed(&store, "2025-01-05", json!({"expense": 100}));
        seed(&store, "2025-1-5", json!({"expense": 40}));

        let view = service.refresh().await;

        assert_eq!(view.total_expense, 100.0);
        assert_eq!(view.expense_label, "₹100.00");
    }

    #[tokio::test]
    async fn test_navigation_wraps_and_refetches() {
        let (store, service) = setup();
        service.refresh().await;

        let december = service.navigate(MonthStep::Previous).await;
        assert_eq!(december.month, 12);
        assert_eq!(december.cells.len(), 31);
        assert_eq!(service.current_month_index(), 11);

        // A record written after the last fetch shows up on the next change
        seed(&store, "2025-01-20", json!({"income": 500, "gym": true}));
        let january = service.navigate(MonthStep::Next).await;
        assert_eq!(january.month, 1);
        assert_eq!(january.total_income, 500.0);
        assert!(january.has_income);
        assert!(january.cells[19].has_gym);

        let february = service.navigate(MonthStep::Next).await;
        assert_eq!(february.cells.len(), 28);
        assert_eq!(february.total_income, 0.0);
    }

    #[tokio::test]
    async fn test_select_month() {
        let (_store, service) = setup();

        let july = service.select_month(6).await.unwrap();
        assert_eq!(july.month_name, "July");
        assert_eq!(july.first_day_of_week, 2); // July 1 2025 is a Tuesday
        assert_eq!(service.current_month_index(), 6);

        assert_eq!(
            service.select_month(12).await,
            Err(CalendarViewError::MonthOutOfRange(12))
        );
        assert_eq!(service.current_month_index(), 6);
    }

    #[tokio::test]
    async fn test_read_failure_shows_empty_month() {
        let (store, service) = setup();
        seed(&store, "2025-01-05", json!({"expense": 100}));
        store.set_fail_reads(true);

        let view = service.refresh().await;

        assert_eq!(view.cells.len(), 31);
        assert_eq!(view.total_expense, 0.0);
        assert!(view.cells.iter().all(|c| c.color == DEFAULT_CELL_COLOR));
    }

    #[tokio::test]
    async fn test_stale_fetch_does_not_replace_newer_month() {
        let gate = Arc::new(Semaphore::new(0));
        let store = Arc::new(CountingStore {
            inner: InMemoryDocumentStore::new(),
            reads: AtomicUsize::new(0),
            first_read_gate: gate.clone(),
        });
        let repository = DayRecordRepository::new(store.clone(), COLLECTION);
        let service = CalendarViewService::new(repository, CalendarService::default(), 2025, 0);

        let slow = tokio::spawn({
            let service = service.clone();
            async move { service.refresh().await }
        });
        while store.reads.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let march = service.select_month(2).await.unwrap();
        assert_eq!(march.month, 3);

        gate.add_permits(1);
        let stale = slow.await.unwrap();
        assert_eq!(stale.month, 1);

        assert_eq!(service.current_view().map(|v| v.month), Some(3));
        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
    }
}
