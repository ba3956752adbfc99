// src/main.rs
//! GPS Fix Recorder - records fixes from a serial NMEA stream

use anyhow::Context;
use clap::Parser;
use gps_recorder::{
    config::RecorderConfig,
    logging,
    recorder::{self, GpsRecorder},
    storage::JsonlStore,
};
use std::path::PathBuf;
use std::sync::atomic::Ordering;

#[derive(Debug, Parser)]
#[command(name = "gps-recorder", about = "Record GPS fixes from a serial NMEA stream")]
struct Args {
    /// Config file path (defaults to ~/.config/gps-recorder/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial port device, overriding config and auto-detection
    #[arg(long)]
    port: Option<String>,

    /// Serial baud rate override
    #[arg(long)]
    baudrate: Option<u32>,

    /// Output file for recorded fixes
    #[arg(long)]
    output: Option<String>,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.list_ports {
        recorder::list_serial_ports()?;
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => RecorderConfig::load_from(path).context("failed to load config")?,
        None => RecorderConfig::load().unwrap_or_default(),
    };
    if let Some(port) = args.port {
        config.serial_port = Some(port);
    }
    if let Some(baudrate) = args.baudrate {
        config.serial_baudrate = baudrate;
    }
    if let Some(output) = args.output {
        config.output_path = output;
    }

    let _guard = logging::init_logging(&config.log_dir, &config.log_file)
        .context("failed to initialize logging")?;

    let timezone = config.timezone().context("invalid timezone in config")?;
    let store = JsonlStore::open(&config.output_path)
        .await
        .context("failed to open output file")?;
    let mut recorder = GpsRecorder::new(timezone, store);

    // Stop after the current line on ctrl-c
    let running = recorder.running_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            running.store(false, Ordering::Relaxed);
        }
    });

    let reader = recorder::connect_serial(&config).await?;
    recorder.run(reader).await?;

    println!("Shutting down...");
    Ok(())
}
