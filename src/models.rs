use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u64);

impl PageId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: PageId,
}

/// Body returned by every metrics endpoint. Unknown fields are ignored, and a
/// body of `{}` simply has no score.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetricPayload {
    #[serde(default)]
    pub score: Option<MetricScore>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetricScore {
    #[serde(default)]
    pub recovery_score: Option<f64>,
    #[serde(default)]
    pub sleep_performance_percentage: Option<f64>,
    #[serde(default)]
    pub strain: Option<f64>,
}

impl MetricPayload {
    pub fn recovery_score(&self) -> Option<f64> {
        self.score.as_ref()?.recovery_score
    }

    pub fn sleep_performance(&self) -> Option<f64> {
        self.score.as_ref()?.sleep_performance_percentage
    }

    pub fn strain(&self) -> Option<f64> {
        self.score.as_ref()?.strain
    }
}

/// Result of one metrics tick. Each category is independently absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricBundle {
    pub recovery: Option<MetricPayload>,
    pub sleep: Option<MetricPayload>,
    pub workout: Option<MetricPayload>,
    pub cycle: Option<MetricPayload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryBand {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrainBand {
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryDisplay {
    pub value: String,
    pub band: Option<RecoveryBand>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepDisplay {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrainDisplay {
    pub value: String,
    pub band: Option<StrainBand>,
}

impl Default for RecoveryDisplay {
    fn default() -> Self {
        Self {
            value: PLACEHOLDER.to_string(),
            band: None,
        }
    }
}

impl Default for SleepDisplay {
    fn default() -> Self {
        Self {
            value: PLACEHOLDER.to_string(),
        }
    }
}

impl Default for StrainDisplay {
    fn default() -> Self {
        Self {
            value: PLACEHOLDER.to_string(),
            band: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsDisplay {
    pub recovery: RecoveryDisplay,
    pub sleep: SleepDisplay,
    pub strain: StrainDisplay,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockDisplay {
    pub time: String,
    pub date: String,
    pub sunrise: String,
}

impl Default for ClockDisplay {
    fn default() -> Self {
        Self {
            time: PLACEHOLDER.to_string(),
            date: String::new(),
            sunrise: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayState {
    pub clock: ClockDisplay,
    pub metrics: MetricsDisplay,
    pub metrics_updated_at: Option<DateTime<Utc>>,
    pub display_name: Option<String>,
    pub overlay_visible: bool,
    pub wake_phrase: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PageConfigResponse {
    pub video_id: String,
    pub display_name: Option<String>,
    pub auto_detect_location: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct LocationReport {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub updated: bool,
}
