use crate::models::{ClockDisplay, Coordinates, PLACEHOLDER};
use crate::solar::sunrise_near;
use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt::Display;

pub fn render_clock(now: DateTime<Utc>, zone: Tz, coords: Coordinates) -> ClockDisplay {
    let local = now.with_timezone(&zone);
    ClockDisplay {
        time: format_time(&local),
        date: format_date(&local),
        sunrise: sunrise_countdown(now, coords),
    }
}

/// `HH:MM` in 24-hour time followed by the zone abbreviation.
pub fn format_time<Z>(local: &DateTime<Z>) -> String
where
    Z: TimeZone,
    Z::Offset: Display,
{
    local.format("%H:%M %Z").to_string()
}

pub fn format_date<Z>(local: &DateTime<Z>) -> String
where
    Z: TimeZone,
    Z::Offset: Display,
{
    local.format("%A, %B %-d, %Y").to_string()
}

/// The first sunrise strictly after `now`. Once today's sunrise has been
/// reached the next day's is used instead.
pub fn next_sunrise(now: DateTime<Utc>, coords: Coordinates) -> Option<DateTime<Utc>> {
    match sunrise_near(now, coords) {
        Some(today) if now < today => Some(today),
        _ => sunrise_near(now + Duration::days(1), coords).filter(|tomorrow| *tomorrow > now),
    }
}

pub fn sunrise_countdown(now: DateTime<Utc>, coords: Coordinates) -> String {
    match next_sunrise(now, coords) {
        Some(sunrise) => format_countdown(sunrise - now),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn format_countdown(remaining: Duration) -> String {
    let total_minutes = remaining.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours == 0 {
        format!("{minutes}m to sunrise")
    } else if minutes == 0 {
        format!("{hours}h to sunrise")
    } else {
        format!("{hours}h {minutes}m to sunrise")
    }
}
