use crate::ephemeris::render_clock;
use crate::fetcher::{FetchError, MetricsFetcher};
use crate::reconciler::reconcile;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

pub struct Scheduler {
    state: AppState,
    fetcher: MetricsFetcher,
}

impl Scheduler {
    pub fn new(state: AppState, fetcher: MetricsFetcher) -> Self {
        Self { state, fetcher }
    }

    /// Clock and metrics run as separate tasks. Each fires once immediately.
    pub fn spawn(self) {
        let clock_period = self.state.config.clock_period;
        let metrics_period = self.state.config.metrics_period;

        tokio::spawn(run_clock(self.state.clone(), clock_period));
        tokio::spawn(run_metrics(self.state, self.fetcher, metrics_period));
    }
}

async fn run_clock(state: AppState, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        clock_tick(&state, Utc::now()).await;
    }
}

async fn run_metrics(state: AppState, fetcher: MetricsFetcher, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(base_url = fetcher.base_url(), ?period, "metrics refresh started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = state.refresh.notified() => debug!("manual metrics refresh"),
        }

        if let Err(err) = refresh_metrics(&state, &fetcher).await {
            error!("metrics refresh abandoned: {err}");
        }
    }
}

pub async fn clock_tick(state: &AppState, now: DateTime<Utc>) {
    let coordinates = state.session.read().await.coordinates;
    let clock = render_clock(now, state.config.timezone, coordinates);

    let mut session = state.session.write().await;
    session.display.clock = clock;
    let fired = session.alarm.poll(now, &state.config.wake_phrases);
    if fired.is_some() {
        session.display.wake_phrase = fired;
    }
}

/// One metrics tick: fetch all four endpoints, then reconcile. When the fetch
/// as a whole fails nothing is written and the previous values stay up.
pub async fn refresh_metrics(state: &AppState, fetcher: &MetricsFetcher) -> Result<(), FetchError> {
    let bundle = fetcher.fetch_all().await?;
    let metrics = reconcile(&bundle);
    debug!(?metrics, "metrics reconciled");

    let mut session = state.session.write().await;
    session.display.metrics = metrics;
    session.display.metrics_updated_at = Some(Utc::now());
    Ok(())
}
