// src/gps/fix.rs
//! Fix record data structures and coordinate validation

use super::fields::decimal_degrees_to_dms;
use crate::error::{GpsError, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::fmt;

/// Validate if a given value is a valid latitude.
pub fn is_valid_latitude(latitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude)
}

/// Validate if a given value is a valid longitude.
pub fn is_valid_longitude(longitude: f64) -> bool {
    (-180.0..=180.0).contains(&longitude)
}

/// A position on the WGS84 ellipsoid in decimal degrees.
///
/// Construction rejects out-of-range values, so a `Coordinate` that exists
/// is always within latitude [-90, 90] and longitude [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !is_valid_latitude(latitude) || !is_valid_longitude(longitude) {
            return Err(GpsError::InvalidCoordinate { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Re-check the range invariant.
    pub fn is_valid(&self) -> bool {
        is_valid_latitude(self.latitude) && is_valid_longitude(self.longitude)
    }
}

impl fmt::Display for Coordinate {
    /// Degrees-minutes-seconds with hemisphere letters, for logs and export.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lat_d, lat_m, lat_s) = decimal_degrees_to_dms(self.latitude.abs());
        let (lon_d, lon_m, lon_s) = decimal_degrees_to_dms(self.longitude.abs());
        let ns = if self.latitude < 0.0 { 'S' } else { 'N' };
        let ew = if self.longitude < 0.0 { 'W' } else { 'E' };
        write!(
            f,
            "{}\u{00b0}{}'{:.3}\"{} {}\u{00b0}{}'{:.3}\"{}",
            lat_d, lat_m, lat_s, ns, lon_d, lon_m, lon_s, ew
        )
    }
}

/// Receiver-reported confidence category of a fix (GGA field 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixQuality {
    NoFix = 0,
    Gps = 1,
    Dgps = 2,
    Pps = 3,
    RtkFixed = 4,
    RtkFloat = 5,
    Estimated = 6,
    Manual = 7,
    Simulation = 8,
}

impl FixQuality {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FixQuality::NoFix),
            1 => Some(FixQuality::Gps),
            2 => Some(FixQuality::Dgps),
            3 => Some(FixQuality::Pps),
            4 => Some(FixQuality::RtkFixed),
            5 => Some(FixQuality::RtkFloat),
            6 => Some(FixQuality::Estimated),
            7 => Some(FixQuality::Manual),
            8 => Some(FixQuality::Simulation),
            _ => None,
        }
    }

    /// Whether a sentence carrying this quality should reach fusion.
    /// No-fix, estimated, manual and simulation fixes are dropped.
    pub fn is_actionable(self) -> bool {
        !matches!(
            self,
            FixQuality::NoFix | FixQuality::Estimated | FixQuality::Manual | FixQuality::Simulation
        )
    }

    /// RTK solutions count as high accuracy.
    pub fn is_high_accuracy(self) -> bool {
        matches!(self, FixQuality::RtkFixed | FixQuality::RtkFloat)
    }

    pub fn description(self) -> &'static str {
        match self {
            FixQuality::NoFix => "No fix",
            FixQuality::Gps => "GPS",
            FixQuality::Dgps => "DGPS",
            FixQuality::Pps => "PPS",
            FixQuality::RtkFixed => "RTK",
            FixQuality::RtkFloat => "Float RTK",
            FixQuality::Estimated => "Estimated",
            FixQuality::Manual => "Manual",
            FixQuality::Simulation => "Simulation",
        }
    }
}

impl Serialize for FixQuality {
    /// Stored as the raw integer category, matching the receiver encoding.
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

/// Position, timestamp and quality decoded from one GGA sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialGga {
    pub coordinate: Coordinate,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub num_satellites: u8,
    pub fix_quality: FixQuality,
    pub high_accuracy: bool,
}

/// Course and speed decoded from one VTG sentence. Either field may be
/// absent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PartialVtg {
    pub bearing: Option<f64>,
    pub speed_kmh: Option<f64>,
}

/// A completed fix, emitted once per GGA/VTG pair and handed to storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixRecord {
    pub coordinate: Coordinate,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub speed_kmh: Option<f64>,
    pub bearing: Option<f64>,
    pub fix_quality: FixQuality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_bounds_inclusive() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(45.0, 120.0).is_ok());
    }

    #[test]
    fn test_coordinate_out_of_range() {
        assert!(Coordinate::new(90.0001, 0.0).is_err());
        assert!(Coordinate::new(-100.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.0001).is_err());
        assert!(Coordinate::new(0.0, 200.0).is_err());
    }

    #[test]
    fn test_coordinate_display_dms() {
        let coord = Coordinate::new(48.1173, -11.5).unwrap();
        let text = format!("{}", coord);
        assert!(text.contains("48\u{00b0}"));
        assert!(text.ends_with("W"));
        assert!(text.contains("N"));
    }

    #[test]
    fn test_fix_quality_classification() {
        assert_eq!(FixQuality::from_u8(1), Some(FixQuality::Gps));
        assert_eq!(FixQuality::from_u8(9), None);

        for rejected in [0, 6, 7, 8] {
            assert!(!FixQuality::from_u8(rejected).unwrap().is_actionable());
        }
        for accepted in [1, 2, 3, 4, 5] {
            assert!(FixQuality::from_u8(accepted).unwrap().is_actionable());
        }
        assert!(FixQuality::RtkFixed.is_high_accuracy());
        assert!(FixQuality::RtkFloat.is_high_accuracy());
        assert!(!FixQuality::Gps.is_high_accuracy());
    }

    #[test]
    fn test_fix_quality_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&FixQuality::Gps).unwrap(), "1");
        assert_eq!(serde_json::to_string(&FixQuality::RtkFloat).unwrap(), "5");
    }
}
