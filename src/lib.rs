// src/lib.rs
//! GPS Fix Recorder Library
//!
//! Decodes NMEA GGA/VTG sentences streamed from a GNSS receiver, fuses them
//! into unified fix records, and hands each validated record to a storage
//! backend.

pub mod config;
pub mod error;
pub mod gps;
pub mod logging;
pub mod recorder;
pub mod storage;

// Re-export main types for convenience
pub use config::RecorderConfig;
pub use error::{GpsError, Result};
pub use gps::{Coordinate, FixQuality, FixRecord};
pub use recorder::GpsRecorder;
pub use storage::{FixStore, JsonlStore, MemoryStore};
