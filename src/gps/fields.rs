// src/gps/fields.rs
//! Field decoders shared by the sentence parsers

use crate::error::{GpsError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

/// One nautical mile per hour in km/h.
const KNOTS_TO_KMH: f64 = 1.852;

/// Decode a latitude field in DDMM.mmmm form with its hemisphere letter.
pub fn parse_latitude(raw: &str, hemisphere: &str) -> Result<f64> {
    parse_angle(raw, hemisphere, 2, "latitude")
}

/// Decode a longitude field in DDDMM.mmmm form with its hemisphere letter.
pub fn parse_longitude(raw: &str, hemisphere: &str) -> Result<f64> {
    parse_angle(raw, hemisphere, 3, "longitude")
}

/// Shared degrees+minutes decoder. The wire format packs a fixed number of
/// integer degree digits in front of decimal minutes; S and W flip the sign.
fn parse_angle(raw: &str, hemisphere: &str, degree_digits: usize, what: &str) -> Result<f64> {
    if !raw.is_ascii() || raw.len() <= degree_digits {
        return Err(GpsError::Parse(format!("malformed {} field: {:?}", what, raw)));
    }
    let degrees: f64 = raw[..degree_digits]
        .parse()
        .map_err(|_| GpsError::Parse(format!("non-numeric {} degrees: {:?}", what, raw)))?;
    let minutes: f64 = raw[degree_digits..]
        .parse()
        .map_err(|_| GpsError::Parse(format!("non-numeric {} minutes: {:?}", what, raw)))?;

    let sign = match hemisphere {
        "N" | "E" => 1.0,
        "S" | "W" => -1.0,
        _ => {
            return Err(GpsError::Parse(format!(
                "missing or invalid hemisphere for {}: {:?}",
                what, hemisphere
            )))
        }
    };

    Ok(sign * (degrees + minutes / 60.0))
}

/// Decode a UTC time-of-day field in HHMMSS[.ffffff] form.
pub fn parse_utc_time(raw: &str) -> Result<NaiveTime> {
    if !raw.is_ascii() || raw.len() < 6 {
        return Err(GpsError::Parse(format!("time field too short: {:?}", raw)));
    }
    let hour: u32 = raw[..2]
        .parse()
        .map_err(|_| GpsError::Parse(format!("non-numeric hour: {:?}", raw)))?;
    let minute: u32 = raw[2..4]
        .parse()
        .map_err(|_| GpsError::Parse(format!("non-numeric minute: {:?}", raw)))?;
    let second: u32 = raw[4..6]
        .parse()
        .map_err(|_| GpsError::Parse(format!("non-numeric second: {:?}", raw)))?;

    let micros = if raw.len() > 6 {
        let frac: f64 = format!("0{}", &raw[6..])
            .parse()
            .map_err(|_| GpsError::Parse(format!("non-numeric fractional second: {:?}", raw)))?;
        (frac * 1_000_000.0).round() as u32
    } else {
        0
    };

    NaiveTime::from_hms_micro_opt(hour, minute, second, micros)
        .ok_or_else(|| GpsError::Parse(format!("invalid time of day: {:?}", raw)))
}

/// Convert a speed over ground from knots to km/h.
pub fn knots_to_kmh(knots: f64) -> f64 {
    knots * KNOTS_TO_KMH
}

/// Split decimal degrees into integer degrees, integer minutes and a seconds
/// remainder rounded to 6 decimal places.
///
/// Truncates toward zero, so a negative input keeps its sign on each nonzero
/// component rather than on the degrees alone.
pub fn decimal_degrees_to_dms(decimal_degrees: f64) -> (i32, i32, f64) {
    let degrees = decimal_degrees.trunc();
    let minutes = ((decimal_degrees - degrees) * 60.0).trunc();
    let seconds = (decimal_degrees - degrees - minutes / 60.0) * 3600.0;
    let seconds = (seconds * 1_000_000.0).round() / 1_000_000.0;
    (degrees as i32, minutes as i32, seconds)
}

/// Convert a UTC instant to the configured civil timezone.
pub fn utc_to_timezone(utc: DateTime<Utc>, timezone: Tz) -> DateTime<Tz> {
    utc.with_timezone(&timezone)
}

/// Combine a stored date and time-of-day into an ISO 8601 string.
pub fn format_fix_datetime(date: NaiveDate, time: NaiveTime) -> String {
    format!("{}T{}", date.format("%Y-%m-%d"), time.format("%H:%M:%S"))
}
