use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

/// Wake-up alarm armed when the sleeper unlocks the projector.
#[derive(Debug, Clone)]
pub struct WakeAlarm {
    sleep_duration: Duration,
    wake_at: Option<DateTime<Utc>>,
    fired: bool,
}

impl WakeAlarm {
    pub fn new(sleep_duration: std::time::Duration) -> Self {
        Self {
            sleep_duration: Duration::from_std(sleep_duration).unwrap_or(Duration::hours(6)),
            wake_at: None,
            fired: false,
        }
    }

    pub fn arm(&mut self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.fired = false;
        self.wake_at = from.checked_add_signed(self.sleep_duration);
        match self.wake_at {
            Some(wake_at) => info!(%wake_at, "wake alarm armed"),
            None => warn!(sleep_duration = %self.sleep_duration, "wake time out of range, alarm not armed"),
        }
        self.wake_at
    }

    /// Returns the wake phrase on the first poll at or after the wake time,
    /// `None` on every other poll.
    pub fn poll(&mut self, now: DateTime<Utc>, phrases: &[String]) -> Option<String> {
        let wake_at = self.wake_at?;
        if self.fired || now < wake_at {
            return None;
        }
        self.fired = true;
        info!(%wake_at, "wake alarm fired");
        pick_phrase(phrases, wake_at).map(str::to_string)
    }
}

/// Phrase choice is derived from the wake time, so one arming always shows
/// the same phrase.
pub fn pick_phrase(phrases: &[String], wake_at: DateTime<Utc>) -> Option<&str> {
    if phrases.is_empty() {
        return None;
    }
    let index = wake_at.timestamp().unsigned_abs() % phrases.len() as u64;
    phrases.get(index as usize).map(String::as_str)
}
