//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{error, info, warn};

use super::responses::{
    ApiResponse, ErrorResponse, HealthResponse, NotificationActionRequest, StatusResponse,
};
use crate::{
    error::{SettingsError, TimerError},
    settings::{Settings, SettingsPatch},
    state::AppState,
    timer::PomodoroState,
};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(e: TimerError) -> ApiError {
    let status = match &e {
        TimerError::LoopClosed => StatusCode::SERVICE_UNAVAILABLE,
        TimerError::Settings(SettingsError::Invalid(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        TimerError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

/// Handle POST /start-stop - Start a work interval or stop the timer
pub async fn start_stop_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    match state.timer.start_stop().await {
        Ok(changed) => {
            state.record_action("start-stop");
            let snapshot = state.timer.snapshot();
            let message = if snapshot.state == PomodoroState::Work {
                "Work interval started"
            } else {
                "Timer stopped"
            };
            info!("Start-stop endpoint called - {}", snapshot.state);
            Ok(Json(ApiResponse::from_outcome(changed, message, snapshot)))
        }
        Err(e) => {
            error!("Failed to start or stop timer: {}", e);
            Err(api_error(e))
        }
    }
}

/// Handle POST /skip-rest - Cut the current rest short
pub async fn skip_rest_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    match state.timer.skip_rest().await {
        Ok(changed) => {
            state.record_action("skip-rest");
            info!("Skip-rest endpoint called - rest skipped: {}", changed);
            Ok(Json(ApiResponse::from_outcome(
                changed,
                "Rest skipped, back to work",
                state.timer.snapshot(),
            )))
        }
        Err(e) => {
            error!("Failed to skip rest: {}", e);
            Err(api_error(e))
        }
    }
}

/// Handle POST /notification/action - Action chosen on a notification
pub async fn notification_action_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NotificationActionRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    match state.timer.notification_action(request.action).await {
        Ok(changed) => {
            state.record_action("notification-action");
            Ok(Json(ApiResponse::from_outcome(
                changed,
                "Notification action applied",
                state.timer.snapshot(),
            )))
        }
        Err(e) => {
            error!("Failed to apply notification action: {}", e);
            Err(api_error(e))
        }
    }
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.timer.snapshot(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /settings - Return the interval settings
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Settings>, ApiError> {
    state.timer.settings().await.map(Json).map_err(|e| {
        error!("Failed to read settings: {}", e);
        api_error(e)
    })
}

/// Handle PATCH /settings - Change some interval settings
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<Settings>, ApiError> {
    match state.timer.update_settings(patch).await {
        Ok(settings) => {
            state.record_action("update-settings");
            Ok(Json(settings))
        }
        Err(e) => {
            warn!("Rejected settings update: {}", e);
            Err(api_error(e))
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
