use sleep_projector::{
    media_gate::{run_media_gate, GateHandle},
    router, AppState, Config, MetricsFetcher, Scheduler,
};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    info!(
        latitude = config.coordinates.latitude,
        longitude = config.coordinates.longitude,
        api_base_url = %config.api_base_url,
        "sleep projector starting"
    );

    let fetcher = MetricsFetcher::new(config.api_base_url.clone(), config.request_timeout)?;
    let port = config.port;

    let (gate, inbox) = GateHandle::channel();
    let state = AppState::new(config, gate);
    tokio::spawn(run_media_gate(state.clone(), inbox));
    Scheduler::new(state.clone(), fetcher).spawn();

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
