//! Helpers for driving the router in-process in REST tests

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::{AppConfig, StorageBackend};
use crate::storage::InMemoryDocumentStore;
use crate::{create_router, initialize_backend_with_store, AppState};

pub struct TestApp {
    pub store: InMemoryDocumentStore,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig {
            storage: StorageBackend::Memory,
            ..AppConfig::default()
        };
        let store = InMemoryDocumentStore::new();
        let state = initialize_backend_with_store(&config, Arc::new(store.clone()));
        let router = create_router(state.clone(), &config);
        Self { store, state, router }
    }

    pub fn seed(&self, key: &str, fields: Value) {
        self.store.seed(
            "calendarDays",
            key,
            fields.as_object().cloned().unwrap_or_default(),
        );
    }

    /// Send a request and return the status with the body parsed as JSON
    /// (`Value::Null` for an empty or non-JSON body)
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}
