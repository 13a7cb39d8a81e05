#![allow(dead_code)]

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use std::net::TcpListener;

pub fn recovery_body() -> Value {
    json!({ "cycle_id": 93845, "score_state": "SCORED", "score": { "recovery_score": 66.5, "resting_heart_rate": 52.0 } })
}

pub fn sleep_body() -> Value {
    json!({ "id": "sleep-1", "nap": false, "score": { "sleep_performance_percentage": 87.6 } })
}

pub fn workout_body() -> Value {
    json!({ "score": { "strain": 8.0 } })
}

pub fn cycle_body() -> Value {
    json!({ "score": { "strain": 12.34 } })
}

/// Upstream where every endpoint answers with a scored payload.
pub fn healthy_upstream() -> Router {
    Router::new()
        .route("/api/recovery", get(|| async { Json(recovery_body()) }))
        .route("/api/sleep", get(|| async { Json(sleep_body()) }))
        .route("/api/workout", get(|| async { Json(workout_body()) }))
        .route("/api/cycle", get(|| async { Json(cycle_body()) }))
}

pub async fn failing() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

/// Serves `router` on a random local port inside the current runtime.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Serves `router` from a dedicated thread so it outlives any single test runtime.
pub fn spawn_upstream_thread(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind upstream");
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("upstream runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, router).await.unwrap();
        });
    });

    format!("http://{addr}")
}

pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
