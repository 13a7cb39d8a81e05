pub mod alarm;
pub mod app;
pub mod config;
pub mod ephemeris;
pub mod errors;
pub mod fetcher;
pub mod handlers;
pub mod media_gate;
pub mod models;
pub mod reconciler;
pub mod scheduler;
pub mod solar;
pub mod state;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use fetcher::MetricsFetcher;
pub use scheduler::Scheduler;
pub use state::AppState;
