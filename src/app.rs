use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/display", get(handlers::get_display))
        .route("/api/config", get(handlers::get_page_config))
        .route("/api/refresh", post(handlers::trigger_refresh))
        .route("/api/gesture", post(handlers::gesture))
        .route("/api/player/ready", post(handlers::player_ready))
        .route("/api/player/state", post(handlers::player_state))
        .route("/api/player/commands", get(handlers::drain_player_commands))
        .route("/api/location", post(handlers::report_location))
        .with_state(state)
}
