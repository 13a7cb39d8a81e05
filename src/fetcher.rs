use crate::models::{MetricBundle, MetricPayload};
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Recovery,
    Sleep,
    Workout,
    Cycle,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Recovery,
        Endpoint::Sleep,
        Endpoint::Workout,
        Endpoint::Cycle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Recovery => "recovery",
            Endpoint::Sleep => "sleep",
            Endpoint::Workout => "workout",
            Endpoint::Cycle => "cycle",
        }
    }

    pub fn url(self, base_url: &str) -> Result<Url, FetchError> {
        let raw = format!("{}/api/{}", base_url.trim_end_matches('/'), self.name());
        Url::parse(&raw).map_err(|err| FetchError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: err.to_string(),
        })
    }
}

/// Failure of a whole refresh. Per-endpoint problems never produce this.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid metrics base url {base_url:?}: {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum EndpointFailure {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("malformed body: {0}")]
    Body(#[from] serde_json::Error),
}

pub type EndpointOutcome = Result<MetricPayload, EndpointFailure>;

#[derive(Debug, Clone)]
pub struct MetricsFetcher {
    client: Client,
    base_url: String,
}

impl MetricsFetcher {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Queries all four endpoints concurrently and waits for every one of them
    /// to settle. A failing endpoint yields `None` in its slot.
    pub async fn fetch_all(&self) -> Result<MetricBundle, FetchError> {
        let [recovery_url, sleep_url, workout_url, cycle_url] =
            Endpoint::ALL.map(|endpoint| endpoint.url(&self.base_url));
        let (recovery_url, sleep_url, workout_url, cycle_url) =
            (recovery_url?, sleep_url?, workout_url?, cycle_url?);

        let (recovery, sleep, workout, cycle) = tokio::join!(
            self.fetch_endpoint(recovery_url),
            self.fetch_endpoint(sleep_url),
            self.fetch_endpoint(workout_url),
            self.fetch_endpoint(cycle_url),
        );

        Ok(MetricBundle {
            recovery: settle(Endpoint::Recovery, recovery),
            sleep: settle(Endpoint::Sleep, sleep),
            workout: settle(Endpoint::Workout, workout),
            cycle: settle(Endpoint::Cycle, cycle),
        })
    }

    pub async fn fetch_endpoint(&self, url: Url) -> EndpointOutcome {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EndpointFailure::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn settle(endpoint: Endpoint, outcome: EndpointOutcome) -> Option<MetricPayload> {
    match outcome {
        Ok(payload) => {
            debug!(endpoint = endpoint.name(), ?payload, "metrics payload received");
            Some(payload)
        }
        Err(err) => {
            warn!(endpoint = endpoint.name(), "metrics endpoint unavailable: {err}");
            None
        }
    }
}
