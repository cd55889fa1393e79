//! # Daybook Backend
//!
//! Contains all non-UI logic for the journal calendar.
//!
//! ```text
//! UI (any client of the REST API)
//!     ↓
//! IO Layer (REST handlers)
//!     ↓
//! Domain Layer (month aggregation, view state, debounced writes)
//!     ↓
//! Storage Layer (document store: CSV files or memory)
//! ```
//!
//! View state lives here rather than in the client, so every client sees
//! the same open day and the same calendar month.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::{AppConfig, StorageBackend};
use crate::domain::{
    CalendarService, CalendarViewService, DayDetailService, DebouncedFieldWriter,
};
use crate::storage::{
    CsvConnection, CsvDocumentStore, DayRecordRepository, DocumentStore, InMemoryDocumentStore,
};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub calendar_view: CalendarViewService,
    pub day_detail: DayDetailService,
}

/// Initialize the backend with the store selected in `config`
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    let store: Arc<dyn DocumentStore> = match config.storage {
        StorageBackend::Csv => {
            info!("Setting up CSV storage in {}", config.data_directory.display());
            let connection = CsvConnection::open(&config.data_directory)?;
            Arc::new(CsvDocumentStore::new(connection))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; nothing will be saved");
            Arc::new(InMemoryDocumentStore::new())
        }
    };
    Ok(initialize_backend_with_store(config, store))
}

/// Wire the services around an already constructed store
pub fn initialize_backend_with_store(config: &AppConfig, store: Arc<dyn DocumentStore>) -> AppState {
    info!("Setting up domain model");
    let repository = DayRecordRepository::new(store, config.collection.clone());
    let writer = DebouncedFieldWriter::new(repository.clone(), config.quiet_window());
    let calendar_service = CalendarService::new(config.expense_alert_threshold);

    let calendar_view =
        CalendarViewService::new(repository.clone(), calendar_service, config.calendar_year, 0);
    let day_detail = DayDetailService::new(repository, writer, config.calendar_year);

    AppState {
        calendar_view,
        day_detail,
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Router {
    // CORS setup to allow a separately served frontend to make requests
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers(Any);
    match config.allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(e) => warn!("Ignoring allowed_origin {:?}: {}", config.allowed_origin, e),
    }

    let mut router = Router::new()
        .nest("/api/calendar", io::rest::calendar_apis::router())
        .nest("/api/day", io::rest::day_apis::router())
        .route("/api/view", get(io::rest::view_apis::get_view))
        .route("/api/logs", post(io::rest::logging_apis::log_message));

    if let Some(static_dir) = &config.static_dir {
        info!("Serving UI assets from {}", static_dir.display());
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    router.layer(cors).with_state(app_state)
}
