use crate::errors::AppError;
use crate::media_gate::{PlayerCommand, PlayerSignal, PlayerState};
use crate::models::{
    Coordinates, DisplayState, HealthResponse, LocationReport, LocationResponse,
    PageConfigResponse, PageQuery,
};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct PlayerStateReport {
    pub state: PlayerState,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let page = state.session.write().await.begin_page();
    Html(render_index(&state.config, page))
}

pub async fn get_display(State(state): State<AppState>) -> Json<DisplayState> {
    let session = state.session.read().await;
    Json(session.display.clone())
}

pub async fn get_page_config(State(state): State<AppState>) -> Json<PageConfigResponse> {
    Json(PageConfigResponse {
        video_id: state.config.video_id.clone(),
        display_name: state.config.display_name.clone(),
        auto_detect_location: state.config.auto_detect_location,
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
    })
}

pub async fn trigger_refresh(State(state): State<AppState>) -> StatusCode {
    state.refresh.notify_one();
    StatusCode::ACCEPTED
}

pub async fn gesture(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<StatusCode, AppError> {
    state.gate.gesture(query.page).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn player_ready(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<StatusCode, AppError> {
    state.gate.signal(query.page, PlayerSignal::Ready).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn player_state(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Json(report): Json<PlayerStateReport>,
) -> Result<StatusCode, AppError> {
    state
        .gate
        .signal(query.page, PlayerSignal::StateChange(report.state))
        .await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn drain_player_commands(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<Vec<PlayerCommand>> {
    let mut session = state.session.write().await;
    Json(session.drain_commands(query.page))
}

pub async fn report_location(
    State(state): State<AppState>,
    Json(report): Json<LocationReport>,
) -> Result<Json<LocationResponse>, AppError> {
    if !state.config.auto_detect_location {
        return Err(AppError::bad_request("location auto-detect is disabled"));
    }

    let mut session = state.session.write().await;
    let current = session.coordinates;

    let (latitude, longitude) = match (report.latitude, report.longitude, report.error) {
        (Some(latitude), Some(longitude), None) => (latitude, longitude),
        (_, _, Some(reason)) => {
            warn!("location auto-detect failed, keeping configured coordinates: {reason}");
            return Ok(Json(to_response(current, false)));
        }
        _ => return Err(AppError::bad_request("latitude and longitude are required")),
    };

    let detected = Coordinates {
        latitude,
        longitude,
    };
    if !detected.is_valid() {
        return Err(AppError::bad_request("coordinates out of range"));
    }

    session.coordinates = detected;
    info!(latitude, longitude, "location auto-detected");
    Ok(Json(to_response(detected, true)))
}

fn to_response(coords: Coordinates, updated: bool) -> LocationResponse {
    LocationResponse {
        latitude: coords.latitude,
        longitude: coords.longitude,
        updated,
    }
}
