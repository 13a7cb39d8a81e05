use crate::models::Coordinates;
use chrono_tz::Tz;
use std::{env, fmt::Display, str::FromStr, time::Duration};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001";
pub const DEFAULT_COORDINATES: Coordinates = Coordinates {
    latitude: 37.7749,
    longitude: -122.4194,
};
pub const DEFAULT_VIDEO_ID: &str = "4xVqlc-L9ok";
/// Four 90 minute sleep cycles.
pub const DEFAULT_SLEEP_HOURS: f64 = 6.0;
pub const MAX_SLEEP_HOURS: f64 = 24.0;
pub const DEFAULT_WAKE_PHRASES: [&str; 11] = [
    "Momentum starts now",
    "Secrets are left to be discovered",
    "Make it look effortless",
    "Great or nothing",
    "Future you is watching",
    "Outsized impact today",
    "The work will be astonishing",
    "Full ownership",
    "You define the rules",
    "Unstoppable",
    "Iconoclasm",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Display) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_base_url: String,
    pub coordinates: Coordinates,
    pub timezone: Tz,
    pub video_id: String,
    pub display_name: Option<String>,
    pub sleep_duration: Duration,
    pub wake_phrases: Vec<String>,
    pub auto_detect_location: bool,
    pub clock_period: Duration,
    pub metrics_period: Duration,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            coordinates: DEFAULT_COORDINATES,
            timezone: host_timezone(),
            video_id: DEFAULT_VIDEO_ID.to_string(),
            display_name: None,
            sleep_duration: Duration::from_secs_f64(DEFAULT_SLEEP_HOURS * 3600.0),
            wake_phrases: DEFAULT_WAKE_PHRASES.iter().map(|s| s.to_string()).collect(),
            auto_detect_location: false,
            clock_period: Duration::from_secs(1),
            metrics_period: Duration::from_secs(5 * 60),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let coordinates = Coordinates {
            latitude: parse_or(&var, "PROJECTOR_LATITUDE", defaults.coordinates.latitude)?,
            longitude: parse_or(&var, "PROJECTOR_LONGITUDE", defaults.coordinates.longitude)?,
        };
        if !coordinates.is_valid() {
            return Err(ConfigError::invalid(
                "PROJECTOR_LATITUDE",
                &format!("{}, {}", coordinates.latitude, coordinates.longitude),
                "coordinates out of range",
            ));
        }

        let timezone = match var("PROJECTOR_TIMEZONE").filter(|v| !v.is_empty()) {
            Some(value) => value
                .parse::<Tz>()
                .map_err(|err| ConfigError::invalid("PROJECTOR_TIMEZONE", &value, err))?,
            None => defaults.timezone,
        };

        let sleep_hours: f64 = parse_or(&var, "PROJECTOR_SLEEP_HOURS", DEFAULT_SLEEP_HOURS)?;
        if !(sleep_hours > 0.0 && sleep_hours <= MAX_SLEEP_HOURS) {
            return Err(ConfigError::invalid(
                "PROJECTOR_SLEEP_HOURS",
                &sleep_hours.to_string(),
                format!("must be more than 0 and at most {MAX_SLEEP_HOURS} hours"),
            ));
        }

        let wake_phrases = match var("PROJECTOR_WAKE_PHRASES") {
            Some(value) => value
                .split('|')
                .map(str::trim)
                .filter(|phrase| !phrase.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.wake_phrases,
        };

        Ok(Self {
            port: parse_or(&var, "PORT", defaults.port)?,
            api_base_url: var("PROJECTOR_API_BASE_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.api_base_url),
            coordinates,
            timezone,
            video_id: var("PROJECTOR_VIDEO_ID")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.video_id),
            display_name: var("PROJECTOR_DISPLAY_NAME").filter(|v| !v.is_empty()),
            sleep_duration: Duration::from_secs_f64(sleep_hours * 3600.0),
            wake_phrases,
            auto_detect_location: match var("PROJECTOR_AUTO_DETECT_LOCATION") {
                Some(value) => parse_flag("PROJECTOR_AUTO_DETECT_LOCATION", &value)?,
                None => defaults.auto_detect_location,
            },
            clock_period: Duration::from_millis(positive(
                &var,
                "PROJECTOR_CLOCK_PERIOD_MS",
                1000,
            )?),
            metrics_period: Duration::from_secs(positive(
                &var,
                "PROJECTOR_METRICS_PERIOD_SECS",
                5 * 60,
            )?),
            request_timeout: Duration::from_secs(positive(
                &var,
                "PROJECTOR_REQUEST_TIMEOUT_SECS",
                30,
            )?),
        })
    }
}

/// The host's IANA zone, so the clock can print an abbreviation like `PDT`.
pub fn host_timezone() -> Tz {
    match iana_time_zone::get_timezone() {
        Ok(name) => name.parse::<Tz>().unwrap_or_else(|err| {
            warn!("host time zone {name:?} is not recognised, using UTC: {err}");
            Tz::UTC
        }),
        Err(err) => {
            warn!("could not determine host time zone, using UTC: {err}");
            Tz::UTC
        }
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key).filter(|v| !v.is_empty()) {
        Some(value) => value
            .parse()
            .map_err(|err| ConfigError::invalid(key, &value, err)),
        None => Ok(default),
    }
}

fn positive<F>(var: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(var, key, default)?;
    if value == 0 {
        return Err(ConfigError::invalid(key, "0", "must be greater than zero"));
    }
    Ok(value)
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::invalid(key, value, "expected true or false")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_base_url, "http://localhost:5001");
        assert_eq!(config.coordinates, DEFAULT_COORDINATES);
        assert_eq!(config.sleep_duration, Duration::from_secs(6 * 3600));
        assert_eq!(config.wake_phrases.len(), 11);
        assert_eq!(config.display_name, None);
        assert_eq!(config.timezone, host_timezone());
        assert!(!config.auto_detect_location);
        assert_eq!(config.metrics_period, Duration::from_secs(300));
        assert_eq!(config.clock_period, Duration::from_secs(1));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("PROJECTOR_API_BASE_URL", "http://metrics.local:5001"),
            ("PROJECTOR_LATITUDE", "51.5"),
            ("PROJECTOR_LONGITUDE", "-0.12"),
            ("PROJECTOR_TIMEZONE", "Europe/London"),
            ("PROJECTOR_DISPLAY_NAME", "  Ada  "),
            ("PROJECTOR_SLEEP_HOURS", "7.5"),
            ("PROJECTOR_WAKE_PHRASES", "Rise | Shine ||"),
            ("PROJECTOR_AUTO_DETECT_LOCATION", "yes"),
            ("PROJECTOR_METRICS_PERIOD_SECS", "60"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.api_base_url, "http://metrics.local:5001");
        assert_eq!(config.coordinates.latitude, 51.5);
        assert_eq!(config.timezone, chrono_tz::Europe::London);
        assert_eq!(config.display_name.as_deref(), Some("Ada"));
        assert_eq!(config.sleep_duration, Duration::from_secs(27_000));
        assert_eq!(config.wake_phrases, vec!["Rise", "Shine"]);
        assert!(config.auto_detect_location);
        assert_eq!(config.metrics_period, Duration::from_secs(60));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("PROJECTOR_LATITUDE", "123")]).is_err());
        assert!(config_from(&[("PROJECTOR_TIMEZONE", "Mars/Olympus")]).is_err());
        assert!(config_from(&[("PROJECTOR_SLEEP_HOURS", "-1")]).is_err());
        assert!(config_from(&[("PROJECTOR_SLEEP_HOURS", "NaN")]).is_err());
        assert!(config_from(&[("PROJECTOR_AUTO_DETECT_LOCATION", "maybe")]).is_err());
        assert!(config_from(&[("PROJECTOR_CLOCK_PERIOD_MS", "0")]).is_err());
    }

    #[test]
    fn sleep_hours_are_capped_at_a_day() {
        for huge in ["1e10", "1e20", "inf", "24.5"] {
            assert!(
                config_from(&[("PROJECTOR_SLEEP_HOURS", huge)]).is_err(),
                "{huge} accepted"
            );
        }
        let config = config_from(&[("PROJECTOR_SLEEP_HOURS", "24")]).unwrap();
        assert_eq!(config.sleep_duration, Duration::from_secs(24 * 3600));
    }
}
