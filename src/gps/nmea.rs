// src/gps/nmea.rs
//! NMEA sentence tokenization and parsing

use super::fields;
use super::fix::{Coordinate, FixQuality, PartialGga, PartialVtg};
use crate::error::{GpsError, Result};
use chrono::Utc;
use chrono_tz::Tz;

/// Historical minimum field count of a GGA sentence.
const GGA_MIN_FIELDS: usize = 15;

/// Split a raw line into its comma-delimited fields.
///
/// The checksum suffix (after `*`) is not stripped; it trails the last field,
/// which neither parser reads for numeric content. An empty line tokenizes
/// to no fields at all.
pub fn tokenize(line: &str) -> Vec<&str> {
    if line.is_empty() {
        return Vec::new();
    }
    line.split(',').collect()
}

/// Whether a line carries a position/fix sentence (GN or GP talker).
pub fn is_gga(line: &str) -> bool {
    line.starts_with("$GNGGA") || line.starts_with("$GPGGA")
}

/// Whether a line carries a course/speed sentence (GN or GP talker).
pub fn is_vtg(line: &str) -> bool {
    line.starts_with("$GNVTG") || line.starts_with("$GPVTG")
}

/// Parse a GGA (fix data) sentence into a partial record.
///
/// Returns `Ok(None)` when the line is not a GGA sentence or carries a
/// non-actionable fix quality; returns an error only for a sentence that is
/// recognizably GGA but malformed. The sentence carries no calendar date, so
/// the current UTC date is stamped and the combined timestamp converted to
/// the given civil timezone before the local date and time are stored.
pub fn parse_gga_sentence(line: &str, timezone: Tz) -> Result<Option<PartialGga>> {
    let parts = tokenize(line);
    if parts.is_empty() || !is_gga(parts[0]) {
        return Ok(None);
    }
    if parts.len() < GGA_MIN_FIELDS {
        return Err(GpsError::Parse(format!(
            "GGA sentence has {} fields, expected at least {}",
            parts.len(),
            GGA_MIN_FIELDS
        )));
    }

    // Fix quality (field 6). Unknown categories and non-actionable fixes
    // are dropped silently, not reported as parse failures.
    let quality_raw: u8 = parts[6]
        .parse()
        .map_err(|_| GpsError::Parse(format!("non-numeric fix quality: {:?}", parts[6])))?;
    let quality = match FixQuality::from_u8(quality_raw) {
        Some(q) if q.is_actionable() => q,
        _ => return Ok(None),
    };

    // UTC time of day (field 1)
    let utc_time = fields::parse_utc_time(parts[1])?;

    // Position (fields 2-5)
    let latitude = fields::parse_latitude(parts[2], parts[3])?;
    let longitude = fields::parse_longitude(parts[4], parts[5])?;
    let coordinate = Coordinate::new(latitude, longitude)?;

    // Satellite count (field 7), blank when the receiver reports none
    let num_satellites: u8 = if parts[7].is_empty() {
        0
    } else {
        parts[7]
            .parse()
            .map_err(|_| GpsError::Parse(format!("non-numeric satellite count: {:?}", parts[7])))?
    };

    let utc_now = Utc::now();
    let utc_datetime = utc_now.date_naive().and_time(utc_time).and_utc();
    let local = fields::utc_to_timezone(utc_datetime, timezone);

    Ok(Some(PartialGga {
        coordinate,
        date: local.date_naive(),
        time: local.time(),
        num_satellites,
        fix_quality: quality,
        high_accuracy: quality.is_high_accuracy(),
    }))
}

/// Parse a VTG (course over ground) sentence into a partial record.
///
/// Returns `Ok(None)` when the line is not a VTG sentence. Bearing (field 1)
/// and speed decode to `None` when empty. Speed comes from the km/h field
/// (field 7); when that is blank the knots field (field 5) is converted
/// instead.
pub fn parse_vtg_sentence(line: &str) -> Result<Option<PartialVtg>> {
    let parts = tokenize(line);
    if parts.is_empty() || !is_vtg(parts[0]) {
        return Ok(None);
    }

    // Bearing, degrees true (field 1)
    let bearing = match parts.get(1) {
        Some(raw) if !raw.is_empty() => Some(
            raw.parse::<f64>()
                .map_err(|_| GpsError::Parse(format!("non-numeric bearing: {:?}", raw)))?,
        ),
        _ => None,
    };

    // Speed over ground: km/h field first, knots fallback
    let speed_kmh = match parts.get(7) {
        Some(raw) if !raw.is_empty() => Some(
            raw.parse::<f64>()
                .map_err(|_| GpsError::Parse(format!("non-numeric speed: {:?}", raw)))?,
        ),
        _ => match parts.get(5) {
            Some(raw) if !raw.is_empty() => {
                let knots: f64 = raw
                    .parse()
                    .map_err(|_| GpsError::Parse(format!("non-numeric speed: {:?}", raw)))?;
                Some(fields::knots_to_kmh(knots))
            }
            _ => None,
        },
    };

    Ok(Some(PartialVtg { bearing, speed_kmh }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kolkata() -> Tz {
        "Asia/Kolkata".parse().unwrap()
    }

    #[test]
    fn test_tokenize() {
        let parts = tokenize("$GNVTG,054.7,T,034.4,M,005.5,N,010.2,K*48");
        assert_eq!(parts.len(), 9);
        assert_eq!(parts[0], "$GNVTG");
        assert_eq!(parts[7], "010.2");
        // Checksum stays glued to the final field
        assert_eq!(parts[8], "K*48");

        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_gga_parsing() {
        let gga = "$GNGGA,123519.00,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        let partial = parse_gga_sentence(gga, kolkata()).unwrap().unwrap();

        assert!((partial.coordinate.latitude() - 48.1173).abs() < 1e-4);
        assert!((partial.coordinate.longitude() - 11.516_666_666_666_667).abs() < 1e-9);
        assert_eq!(partial.fix_quality, FixQuality::Gps);
        assert_eq!(partial.num_satellites, 8);
        assert!(!partial.high_accuracy);
    }

    #[test]
    fn test_gga_accepts_gp_talker() {
        let gga = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        assert!(parse_gga_sentence(gga, kolkata()).unwrap().is_some());
    }

    #[test]
    fn test_gga_rejects_non_actionable_quality() {
        for quality in ["0", "6", "7", "8"] {
            let gga = format!(
                "$GNGGA,123519.00,4807.038,N,01131.000,E,{},08,0.9,545.4,M,46.9,M,,*47",
                quality
            );
            assert_eq!(parse_gga_sentence(&gga, kolkata()).unwrap(), None);
        }
    }

    #[test]
    fn test_gga_unknown_quality_is_dropped() {
        let gga = "$GNGGA,123519.00,4807.038,N,01131.000,E,9,08,0.9,545.4,M,46.9,M,,*47";
        assert_eq!(parse_gga_sentence(gga, kolkata()).unwrap(), None);
    }

    #[test]
    fn test_gga_rtk_marks_high_accuracy() {
        let gga = "$GNGGA,123519.00,4807.038,N,01131.000,E,4,08,0.9,545.4,M,46.9,M,,*47";
        let partial = parse_gga_sentence(gga, kolkata()).unwrap().unwrap();
        assert!(partial.high_accuracy);
        assert_eq!(partial.fix_quality, FixQuality::RtkFixed);
    }

    #[test]
    fn test_gga_blank_satellite_count_defaults_to_zero() {
        let gga = "$GNGGA,123519.00,4807.038,N,01131.000,E,1,,0.9,545.4,M,46.9,M,,*47";
        let partial = parse_gga_sentence(gga, kolkata()).unwrap().unwrap();
        assert_eq!(partial.num_satellites, 0);
    }

    #[test]
    fn test_gga_malformed_fields_are_errors() {
        // Too few fields
        assert!(parse_gga_sentence("$GNGGA,123519.00,4807.038,N", kolkata()).is_err());
        // Non-numeric latitude
        let gga = "$GNGGA,123519.00,48o7.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        assert!(parse_gga_sentence(gga, kolkata()).is_err());
        // Malformed time
        let gga = "$GNGGA,12,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        assert!(parse_gga_sentence(gga, kolkata()).is_err());
    }

    #[test]
    fn test_vtg_parsing() {
        let vtg = "$GNVTG,054.7,T,034.4,M,005.5,N,010.2,K*48";
        let partial = parse_vtg_sentence(vtg).unwrap().unwrap();
        assert_eq!(partial.bearing, Some(54.7));
        assert_eq!(partial.speed_kmh, Some(10.2));
    }

    #[test]
    fn test_vtg_speed_falls_back_to_knots_field() {
        let vtg = "$GNVTG,054.7,T,034.4,M,005.5,N,,K*48";
        let partial = parse_vtg_sentence(vtg).unwrap().unwrap();
        let speed = partial.speed_kmh.unwrap();
        assert!((speed - 10.186).abs() < 1e-9);
    }

    #[test]
    fn test_vtg_empty_fields_decode_to_none() {
        let vtg = "$GNVTG,,T,,M,,N,,K*48";
        let partial = parse_vtg_sentence(vtg).unwrap().unwrap();
        assert_eq!(partial.bearing, None);
        assert_eq!(partial.speed_kmh, None);
    }

    #[test]
    fn test_invalid_sentence_is_no_data() {
        assert_eq!(parse_gga_sentence("Invalid Sentence", kolkata()).unwrap(), None);
        assert_eq!(parse_vtg_sentence("Invalid Sentence").unwrap(), None);
        assert_eq!(parse_gga_sentence("", kolkata()).unwrap(), None);
        assert_eq!(parse_vtg_sentence("").unwrap(), None);
    }

    #[test]
    fn test_vtg_malformed_bearing_is_error() {
        assert!(parse_vtg_sentence("$GNVTG,abc,T,034.4,M,005.5,N,010.2,K*48").is_err());
    }
}
