// src/recorder.rs
//! Main ingestion loop: serial line stream -> parsers -> fusion -> storage

use crate::{
    config::RecorderConfig,
    error::{GpsError, Result},
    gps::{fields, fusion::FusionAccumulator, nmea, FixRecord},
    storage::FixStore,
};
use chrono_tz::Tz;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_serial::{SerialPortBuilderExt, SerialPortType, SerialStream};
use tracing::{debug, error, info, warn};

/// USB product descriptions of the supported GPS receiver bridges.
const KNOWN_BRIDGES: [&str; 2] = [
    "CP2102N USB to UART Bridge Controller",
    "Silicon Labs CP210x USB to UART Bridge",
];

/// Drives one GPS receiver stream into a fix store.
///
/// A single sequential reader: each line is tokenized, parsed and merged
/// into the fusion accumulator; a completed fix is validated and written to
/// the store before the next line is read. Parse and storage failures are
/// logged and recovered; only a transport failure ends the loop.
pub struct GpsRecorder<S: FixStore> {
    accumulator: FusionAccumulator,
    store: S,
    timezone: Tz,
    running: Arc<AtomicBool>,
}

impl<S: FixStore> GpsRecorder<S> {
    pub fn new(timezone: Tz, store: S) -> Self {
        Self {
            accumulator: FusionAccumulator::new(),
            store,
            timezone,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Shared stop flag; clear it to end the loop after the current line.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Stop the recorder.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the ingestion loop over any line-oriented reader until EOF,
    /// transport failure or a cleared stop flag.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, mut reader: R) -> Result<()> {
        let mut buf = Vec::new();

        while self.running.load(Ordering::Relaxed) {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|e| GpsError::Connection(format!("stream read failed: {}", e)))?;
            if n == 0 {
                break; // EOF
            }

            let text = String::from_utf8_lossy(&buf);
            let line = text.trim();
            if !line.is_empty() {
                self.handle_line(line).await;
            }
        }

        Ok(())
    }

    /// Process one sentence: parse, fuse, validate and store. Never fails;
    /// per-sentence problems are logged at a severity matching their kind.
    pub async fn handle_line(&mut self, line: &str) {
        match self.ingest_line(line) {
            Ok(Some(record)) => {
                info!(
                    "fix complete: {} at {} ({})",
                    record.coordinate,
                    fields::format_fix_datetime(record.date, record.time),
                    record.fix_quality.description()
                );
                if let Err(e) = self.store.insert(&record).await {
                    error!("failed to store fix record: {}", e);
                }
            }
            Ok(None) => {}
            Err(GpsError::InvalidCoordinate { latitude, longitude }) => {
                debug!(
                    "rejected fix with out-of-range coordinates: lat={}, lon={}",
                    latitude, longitude
                );
            }
            Err(e) => warn!("dropped unparseable sentence: {}", e),
        }
    }

    /// The pure decode-and-fuse step: returns a completed, validated fix
    /// when this line finishes one.
    pub fn ingest_line(&mut self, line: &str) -> Result<Option<FixRecord>> {
        let completed = if nmea::is_gga(line) {
            match nmea::parse_gga_sentence(line, self.timezone)? {
                Some(partial) => {
                    debug!("absorbed GGA partial: {:?}", partial);
                    self.accumulator.absorb_gga(partial)
                }
                None => None,
            }
        } else if nmea::is_vtg(line) {
            match nmea::parse_vtg_sentence(line)? {
                Some(partial) => {
                    debug!("absorbed VTG partial: {:?}", partial);
                    self.accumulator.absorb_vtg(partial)
                }
                None => None,
            }
        } else {
            // Other sentence types pass through untouched
            None
        };

        match completed {
            Some(record) => {
                // Range holds at construction; re-checked before storage
                if !record.coordinate.is_valid() {
                    return Err(GpsError::InvalidCoordinate {
                        latitude: record.coordinate.latitude(),
                        longitude: record.coordinate.longitude(),
                    });
                }
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}

/// Open the configured serial port, auto-detecting when none is set.
pub async fn connect_serial(config: &RecorderConfig) -> Result<BufReader<SerialStream>> {
    let port = match &config.serial_port {
        Some(port) => port.clone(),
        None => auto_select_serial_port()?,
    };

    info!("connecting to GPS on {} at {} baud", port, config.serial_baudrate);

    let serial = tokio_serial::new(&port, config.serial_baudrate)
        .timeout(Duration::from_secs(config.serial_timeout_secs))
        .open_native_async()
        .map_err(|e| GpsError::Connection(format!("failed to open serial port {}: {}", port, e)))?;

    info!("connected to serial port {}", port);
    Ok(BufReader::new(serial))
}

/// Pick the first port whose USB description matches a known GPS bridge.
pub fn auto_select_serial_port() -> Result<String> {
    let ports = tokio_serial::available_ports()?;

    for port in ports {
        if let SerialPortType::UsbPort(ref usb) = port.port_type {
            if let Some(product) = &usb.product {
                if KNOWN_BRIDGES.iter().any(|known| product.contains(known)) {
                    return Ok(port.port_name);
                }
            }
        }
    }

    Err(GpsError::Connection("GPS serial port not found".to_string()))
}

/// List available serial ports.
pub fn list_serial_ports() -> Result<()> {
    let ports = tokio_serial::available_ports()?;

    if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        println!("Available serial ports:");
        for port in ports {
            println!("  {} - {:?}", port.port_name, port.port_type);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gps::FixQuality;
    use crate::storage::MemoryStore;

    const GGA: &str = "$GNGGA,123519.00,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
    const VTG: &str = "$GNVTG,054.7,T,034.4,M,005.5,N,010.2,K*48";

    fn recorder() -> GpsRecorder<MemoryStore> {
        GpsRecorder::new("Asia/Kolkata".parse().unwrap(), MemoryStore::new())
    }

    #[test]
    fn test_ingest_gga_then_vtg_completes_fix() {
        let mut rec = recorder();
        assert!(rec.ingest_line(GGA).unwrap().is_none());

        let record = rec.ingest_line(VTG).unwrap().expect("fix should complete");
        assert!((record.coordinate.latitude() - 48.1173).abs() < 1e-4);
        assert_eq!(record.speed_kmh, Some(10.2));
        assert_eq!(record.bearing, Some(54.7));
        assert_eq!(record.fix_quality, FixQuality::Gps);
    }

    #[test]
    fn test_ingest_vtg_then_gga_completes_fix() {
        let mut rec = recorder();
        assert!(rec.ingest_line(VTG).unwrap().is_none());
        assert!(rec.ingest_line(GGA).unwrap().is_some());
    }

    #[test]
    fn test_ingest_skips_foreign_sentences() {
        let mut rec = recorder();
        let gsv = "$GPGSV,3,1,12,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*75";
        assert!(rec.ingest_line(gsv).unwrap().is_none());
        assert!(rec.ingest_line("Invalid Sentence").unwrap().is_none());
    }

    #[test]
    fn test_ingest_no_fix_quality_never_completes() {
        let mut rec = recorder();
        let no_fix = "$GNGGA,123519.00,4807.038,N,01131.000,E,0,08,0.9,545.4,M,46.9,M,,*47";
        assert!(rec.ingest_line(no_fix).unwrap().is_none());
        assert!(rec.ingest_line(VTG).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_run_stores_completed_fixes() {
        let stream = format!("{}\r\n{}\r\n{}\r\n", GGA, VTG, "$GPGSV,1,1,00*79");
        let mut rec = recorder();
        rec.run(BufReader::new(stream.as_bytes())).await.unwrap();

        assert_eq!(rec.store().records().len(), 1);
        assert_eq!(rec.store().records()[0].speed_kmh, Some(10.2));
    }

    #[tokio::test]
    async fn test_run_recovers_from_malformed_sentences() {
        let bad_gga = "$GNGGA,123519.00,48o7.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        let stream = format!("{}\r\n{}\r\n{}\r\n", bad_gga, GGA, VTG);
        let mut rec = recorder();
        rec.run(BufReader::new(stream.as_bytes())).await.unwrap();

        assert_eq!(rec.store().records().len(), 1);
    }

    #[tokio::test]
    async fn test_run_honors_stop_flag() {
        let mut rec = recorder();
        rec.stop();
        rec.run(BufReader::new(&b"$GNGGA,never read\r\n"[..]))
            .await
            .unwrap();
        assert!(rec.store().records().is_empty());
    }
}
