use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use log::{info, warn};
use serde::Serialize;
use shared::DayEdit;

use crate::domain::DayDetailError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CloseDayResponse {
    pub flushed_edits: usize,
}

/// Create a router for day detail APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_open_day))
        .route("/:date", get(open_day).patch(edit_day))
        .route("/:date/close", post(close_day))
}

/// The day currently open, if any
async fn get_open_day(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/day");

    match state.day_detail.current_view() {
        Some(view) => (StatusCode::OK, Json(view)).into_response(),
        None => (StatusCode::NOT_FOUND, "No day is open").into_response(),
    }
}

/// Open a day by its `MM-DD` route key
///
/// An impossible date still answers `200` with the `invalid_date` view.
async fn open_day(State(state): State<AppState>, Path(date): Path<String>) -> impl IntoResponse {
    info!("GET /api/day/{}", date);

    let view = state.day_detail.open(&date).await;
    (StatusCode::OK, Json(view)).into_response()
}

async fn edit_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(edit): Json<DayEdit>,
) -> impl IntoResponse {
    info!("PATCH /api/day/{} - field: {}", date, edit.field_name());

    match state.day_detail.edit(&date, edit).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => day_error_response(e),
    }
}

/// Flush pending edits and leave the day
async fn close_day(State(state): State<AppState>, Path(date): Path<String>) -> impl IntoResponse {
    info!("POST /api/day/{}/close", date);

    match state.day_detail.close(&date).await {
        Ok(flushed_edits) => (StatusCode::OK, Json(CloseDayResponse { flushed_edits })).into_response(),
        Err(e) => day_error_response(e),
    }
}

fn day_error_response(error: DayDetailError) -> Response {
    warn!("Rejected day request: {}", error);
    let status = match error {
        DayDetailError::InvalidAmount { .. } => StatusCode::BAD_REQUEST,
        DayDetailError::NotOpen
        | DayDetailError::NotOpenDay { .. }
        | DayDetailError::StillLoading(_) => StatusCode::CONFLICT,
    };
    (status, error.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_utils::TestApp;
    use crate::storage::StoreWrite;
    use axum::http::Method;
    use serde_json::json;
    use shared::{DayDetailState, DayDetailView, Productivity};

    #[tokio::test]
    async fn test_no_open_day_is_not_found() {
        let app = TestApp::new();

        let (status, _) = app.send(Method::GET, "/api/day", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_open_day() -> Result<(), Box<dyn std::error::Error>> {
        let app = TestApp::new();
        app.seed("2025-01-05", json!({"productivity": "bg-green-300", "gym": true}));

        let (status, body) = app.send(Method::GET, "/api/day/01-05", None).await;

        assert_eq!(status, StatusCode::OK);
        let view: DayDetailView = serde_json::from_value(body)?;
        assert_eq!(view.state, DayDetailState::Ready);
        assert_eq!(view.title, "Jan 5");
        assert_eq!(view.record.productivity, Productivity::Productive);
        assert!(view.record.gym);

        let (status, body) = app.send(Method::GET, "/api/day", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["route_key"], "01-05");

        Ok(())
    }

    #[tokio::test]
    async fn test_open_invalid_day() -> Result<(), Box<dyn std::error::Error>> {
        let app = TestApp::new();

        let (status, body) = app.send(Method::GET, "/api/day/02-31", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "invalid_date");
        assert_eq!(body["title"], "Invalid Date");
        assert!(app.store.writes().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_edit_and_close_day() -> Result<(), Box<dyn std::error::Error>> {
        let app = TestApp::new();
        app.send(Method::GET, "/api/day/03-14", None).await;

        let (status, body) = app
            .send(Method::PATCH, "/api/day/03-14", Some(json!({"field": "expense", "value": 42.5})))
            .await;
        assert_eq!(status, StatusCode::OK);
        let view: DayDetailView = serde_json::from_value(body)?;
        assert_eq!(view.record.expense, 42.5);

        let (status, body) = app
            .send(Method::PATCH, "/api/day/03-14", Some(json!({"field": "dayNote", "value": "pi day"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["record"]["dayNote"], "pi day");

        let (status, body) = app.send(Method::POST, "/api/day/03-14/close", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["flushed_edits"], 1);

        let patched: Vec<String> = app
            .store
            .writes()
            .into_iter()
            .filter_map(|w| match w {
                StoreWrite::Update { key, patch, .. } => {
                    assert_eq!(key, "2025-03-14");
                    patch.keys().next().cloned()
                }
                _ => None,
            })
            .collect();
        assert_eq!(patched, vec!["expense".to_string(), "dayNote".to_string()]);

        let (status, _) = app.send(Method::GET, "/api/day", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_edits() {
        let app = TestApp::new();

        let (status, _) = app
            .send(Method::PATCH, "/api/day/01-05", Some(json!({"field": "gym", "value": true})))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        app.send(Method::GET, "/api/day/01-05", None).await;

        let (status, _) = app
            .send(Method::PATCH, "/api/day/01-05", Some(json!({"field": "income", "value": -1})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(Method::PATCH, "/api/day/01-06", Some(json!({"field": "gym", "value": true})))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = app
            .send(Method::PATCH, "/api/day/01-05", Some(json!({"field": "mood", "value": "ok"})))
            .await;
        assert!(status.is_client_error());

        let updates = app
            .store
            .writes()
            .iter()
            .filter(|w| matches!(w, StoreWrite::Update { .. }))
            .count();
        assert_eq!(updates, 0);
    }
}
