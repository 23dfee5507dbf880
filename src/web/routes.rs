//! Web routes and handlers

use super::components;
use crate::controller::export::CSV_CONTENT_TYPE;
use crate::controller::{AppState, ScanSummary, SessionError, SessionSnapshot, DEFAULT_EXPORT_PATH};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Main scanner page (SSR)
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(components::render_scanner_page(&state.session.snapshot()))
}

/// API: Get current status
pub async fn api_status(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    success: bool,
    title: String,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<ScanSummary>,
}

impl ApiResponse {
    fn ok(title: &str, message: impl Into<String>, summary: Option<ScanSummary>) -> Self {
        Self {
            success: true,
            title: title.to_string(),
            message: message.into(),
            summary,
        }
    }

    fn failed(error: &SessionError) -> Self {
        Self {
            success: false,
            title: error.title().to_string(),
            message: error.to_string(),
            summary: None,
        }
    }
}

/// API: Run a fresh scan
pub async fn api_scan(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ApiResponse>) {
    match state.session.scan().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(ApiResponse::ok(
                "Scan Complete",
                "Wi-Fi networks found!",
                Some(summary),
            )),
        ),
        Err(e) => error_response(e),
    }
}

/// API: Re-run the last scan
pub async fn api_refresh(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ApiResponse>) {
    match state.session.refresh().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(ApiResponse::ok(
                "Refreshed",
                "Wi-Fi networks refreshed!",
                Some(summary),
            )),
        ),
        Err(e) => error_response(e),
    }
}

/// API: Drop results and return to idle
pub async fn api_clear(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ApiResponse>) {
    match state.session.clear() {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok(
                "Cleared",
                "Wi-Fi data cleared. You can scan again.",
                None,
            )),
        ),
        Err(e) => error_response(e),
    }
}

/// API: Download the current results as CSV
pub async fn api_export(State(state): State<Arc<AppState>>) -> Response {
    match state.session.export_csv(&state.config.scanner.csv) {
        Ok(export) => {
            let disposition = format!("attachment; filename=\"{}\"", DEFAULT_EXPORT_PATH);

            tracing::info!(rows = export.rows, "Serving CSV export");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                export.bytes,
            )
                .into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

fn error_response(error: SessionError) -> (StatusCode, Json<ApiResponse>) {
    let status = match &error {
        SessionError::ScanInProgress | SessionError::RefreshUnavailable => StatusCode::CONFLICT,
        SessionError::ScanFailed(_) => StatusCode::BAD_GATEWAY,
        SessionError::NoData => StatusCode::NOT_FOUND,
        SessionError::Csv(_) | SessionError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    tracing::warn!(error = %error, status = status.as_u16(), "API request failed");
    (status, Json(ApiResponse::failed(&error)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::test_support::{fixture_app_state, fixture_config};
    use crate::controller::error::ProviderError;
    use crate::controller::normalize::RawObservation;
    use crate::controller::{
        ConnectivityProbe, DaemonConfig, ScanSession, SessionState, WifiProvider,
    };
    use crate::web::router;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::path::PathBuf;
    use tower::ServiceExt;

    async fn send(state: &Arc<AppState>, method: &str, uri: &str) -> (StatusCode, Response) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = router(state.clone()).oneshot(request).await.unwrap();
        (response.status(), response)
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn api(state: &Arc<AppState>, method: &str, uri: &str) -> (StatusCode, ApiResponse) {
        let (status, response) = send(state, method, uri).await;
        let body = body_text(response).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    #[tokio::test]
    async fn test_refresh_and_export_need_a_scan() {
        let state = fixture_app_state(PathBuf::from(DEFAULT_EXPORT_PATH));

        let (status, body) = api(&state, "POST", "/api/refresh").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(!body.success);
        assert_eq!(body.title, "Refresh Unavailable");

        let (status, body) = api(&state, "GET", "/api/export").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "no Wi-Fi networks to export");
    }

    #[tokio::test]
    async fn test_scan_then_export_csv() {
        let state = fixture_app_state(PathBuf::from(DEFAULT_EXPORT_PATH));

        let (status, body) = api(&state, "POST", "/api/scan").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.summary.map(|s| s.network_count), Some(6));

        let (status, response) = send(&state, "GET", "/api/export").await;
        assert_eq!(status, StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], CSV_CONTENT_TYPE);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"wifi_networks.csv\""
        );

        let text = body_text(response).await;
        assert_eq!(text.lines().count(), 7);
        assert!(text.starts_with("SSID,Signal,Security"));
    }

    #[tokio::test]
    async fn test_status_and_clear() {
        let state = fixture_app_state(PathBuf::from(DEFAULT_EXPORT_PATH));
        api(&state, "POST", "/api/scan").await;

        let (_, response) = send(&state, "GET", "/api/status").await;
        let snapshot: SessionSnapshot = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(snapshot.state, SessionState::Ready);
        assert_eq!(snapshot.network_count, 6);
        assert!(snapshot.can_refresh);

        let (status, body) = api(&state, "POST", "/api/clear").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.message, "Wi-Fi data cleared. You can scan again.");
        assert_eq!(state.session.state(), SessionState::Idle);
        assert!(state.session.results().is_empty());
    }

    #[tokio::test]
    async fn test_index_renders_results() {
        let state = fixture_app_state(PathBuf::from(DEFAULT_EXPORT_PATH));
        api(&state, "POST", "/api/scan").await;

        let (status, response) = send(&state, "GET", "/").await;
        assert_eq!(status, StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Wi-Fi Network Scanner"));
        assert!(html.contains("Connected to: CU_WiFi"));
        assert!(html.contains("&lt;Hidden&gt;"));
    }

    #[tokio::test]
    async fn test_stylesheet_is_served() {
        let state = fixture_app_state(PathBuf::from(DEFAULT_EXPORT_PATH));
        let (status, response) = send(&state, "GET", "/style.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
    }

    struct BrokenRadio;

    #[async_trait]
    impl WifiProvider for BrokenRadio {
        async fn scan(&self) -> Result<Vec<RawObservation>, ProviderError> {
            Err(ProviderError::PermissionDenied)
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[async_trait]
    impl ConnectivityProbe for BrokenRadio {
        async fn current_ssid(&self) -> Option<String> {
            None
        }
    }

    #[tokio::test]
    async fn test_provider_failure_maps_to_bad_gateway() {
        let radio = Arc::new(BrokenRadio);
        let state = Arc::new(AppState {
            session: Arc::new(ScanSession::new(radio.clone(), radio)),
            config: DaemonConfig {
                scanner: fixture_config(PathBuf::from(DEFAULT_EXPORT_PATH)),
                port: 0,
                socket: String::new(),
            },
        });

        let (status, body) = api(&state, "POST", "/api/scan").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.title, "Scan Failed");
        assert!(body.message.contains("permission denied"));
        assert_eq!(state.session.state(), SessionState::Idle);
    }
}
