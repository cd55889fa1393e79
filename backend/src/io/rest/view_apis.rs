use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{info, warn};
use serde::Deserialize;
use shared::ResolvedView;

use crate::domain::Route;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub path: String,
}

/// Resolve a UI path to the view it shows
///
/// `/` mounts the calendar; `/day/MM-DD` opens that day.
pub async fn get_view(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> impl IntoResponse {
    info!("GET /api/view - path: {}", query.path);

    match Route::parse(&query.path) {
        Some(Route::Calendar) => {
            let month = state.calendar_view.refresh().await;
            (StatusCode::OK, Json(ResolvedView::Calendar(month))).into_response()
        }
        Some(Route::Day(date)) => {
            let view = state.day_detail.open(&date).await;
            (StatusCode::OK, Json(ResolvedView::Day(view))).into_response()
        }
        None => {
            warn!("No view for path {:?}", query.path);
            (StatusCode::NOT_FOUND, "No view for this path").into_response()
        }
    }
}
