use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::{info, warn};
use shared::SelectMonthRequest;

use crate::domain::MonthStep;
use crate::AppState;

/// Create a router for calendar related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/month", get(get_current_month).post(select_month))
        .route("/month/previous", post(navigate_previous_month))
        .route("/month/next", post(navigate_next_month))
}

/// Mount or refresh the current month
async fn get_current_month(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/calendar/month");

    let month = state.calendar_view.refresh().await;
    (StatusCode::OK, Json(month)).into_response()
}

/// Jump to a month of the configured year
async fn select_month(
    State(state): State<AppState>,
    Json(request): Json<SelectMonthRequest>,
) -> impl IntoResponse {
    info!("POST /api/calendar/month - request: {:?}", request);

    match state.calendar_view.select_month(request.month_index).await {
        Ok(month) => (StatusCode::OK, Json(month)).into_response(),
        Err(e) => {
            warn!("Rejected month selection: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Navigate to the previous month
async fn navigate_previous_month(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/calendar/month/previous");

    let month = state.calendar_view.navigate(MonthStep::Previous).await;
    (StatusCode::OK, Json(month)).into_response()
}

/// Navigate to the next month
async fn navigate_next_month(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/calendar/month/next");

    let month = state.calendar_view.navigate(MonthStep::Next).await;
    (StatusCode::OK, Json(month)).into_response()
}
