use axum::{extract::State, http::StatusCode, response::Json};
use log::{debug, error, info, warn};
use serde::Serialize;
use shared::LogEntry;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub success: bool,
}

/// Write a client log line into the server log
pub async fn log_message(
    State(_app_state): State<AppState>,
    Json(entry): Json<LogEntry>,
) -> Result<Json<LogResponse>, StatusCode> {
    let component = entry.component.as_deref().unwrap_or("client");
    let message = format!("[{}] {}", component, entry.message);

    match entry.level.to_lowercase().as_str() {
        "debug" => debug!("{}", message),
        "info" => info!("{}", message),
        "warn" => warn!("{}", message),
        "error" => error!("{}", message),
        _ => info!("{}", message),
    }

    Ok(Json(LogResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_utils::TestApp;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_log_message() {
        let app = TestApp::new();

        let (status, body) = app
            .send(
                Method::POST,
                "/api/logs",
                Some(json!({"level": "warn", "message": "slow render", "component": "calendar"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _) = app
            .send(Method::POST, "/api/logs", Some(json!({"level": "trace", "message": "no component"})))
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}
