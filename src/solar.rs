use crate::models::Coordinates;
use chrono::{DateTime, Utc};
use std::f64::consts::PI;

const DAY_MS: f64 = 86_400_000.0;
const J1970: f64 = 2_440_588.0;
const J2000: f64 = 2_451_545.0;
const J0: f64 = 0.0009;
const OBLIQUITY_DEG: f64 = 23.4397;
const SUNRISE_ALTITUDE_DEG: f64 = -0.833;

fn to_days(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / DAY_MS - 0.5 + J1970 - J2000
}

fn from_julian(julian: f64) -> Option<DateTime<Utc>> {
    let millis = (julian + 0.5 - J1970) * DAY_MS;
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis.round() as i64)
}

fn solar_mean_anomaly(days: f64) -> f64 {
    (357.5291 + 0.985_600_28 * days).to_radians()
}

fn ecliptic_longitude(mean_anomaly: f64) -> f64 {
    let center = (1.9148 * mean_anomaly.sin()
        + 0.02 * (2.0 * mean_anomaly).sin()
        + 0.0003 * (3.0 * mean_anomaly).sin())
    .to_radians();
    let perihelion = 102.9372_f64.to_radians();
    mean_anomaly + center + perihelion + PI
}

fn declination(ecliptic_longitude: f64) -> f64 {
    (OBLIQUITY_DEG.to_radians().sin() * ecliptic_longitude.sin()).asin()
}

fn approx_transit(hour_angle: f64, west_longitude: f64, cycle: f64) -> f64 {
    J0 + (hour_angle + west_longitude) / (2.0 * PI) + cycle
}

fn solar_transit(approx: f64, mean_anomaly: f64, ecliptic_longitude: f64) -> f64 {
    J2000 + approx + 0.0053 * mean_anomaly.sin() - 0.0069 * (2.0 * ecliptic_longitude).sin()
}

/// Sunrise of the solar day whose transit is nearest `instant`. `None` during
/// polar day or polar night.
pub fn sunrise_near(instant: DateTime<Utc>, coords: Coordinates) -> Option<DateTime<Utc>> {
    let west_longitude = (-coords.longitude).to_radians();
    let phi = coords.latitude.to_radians();
    let days = to_days(instant);

    // JS-style rounding, half up.
    let cycle = (days - J0 - west_longitude / (2.0 * PI) + 0.5).floor();
    let transit_days = approx_transit(0.0, west_longitude, cycle);

    let mean_anomaly = solar_mean_anomaly(transit_days);
    let longitude = ecliptic_longitude(mean_anomaly);
    let dec = declination(longitude);
    let noon = solar_transit(transit_days, mean_anomaly, longitude);

    let cos_hour_angle = (SUNRISE_ALTITUDE_DEG.to_radians().sin() - phi.sin() * dec.sin())
        / (phi.cos() * dec.cos());
    if !(-1.0..=1.0).contains(&cos_hour_angle) {
        return None;
    }
    let hour_angle = cos_hour_angle.acos();

    let set = solar_transit(
        approx_transit(hour_angle, west_longitude, cycle),
        mean_anomaly,
        longitude,
    );
    from_julian(noon - (set - noon))
}
