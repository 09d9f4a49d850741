//! # Telemetry Collector Entry Point
//!
//! Loads the collector configuration, starts the configured dial-in sessions
//! and the dial-out listener, and runs until Ctrl-C.

use collector::config::{CollectorConfig, DialInProtocol};
use collector::sink::{EventLogWriter, EventSink, LogDiagnostics, LogSink};
use collector::transport::{DialoutServer, GnmiDialer, MdtDialer};
use collector::{Diagnostics, SessionManager};
use log::{error, info};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const CONFIG_ENV: &str = "TELEMETRY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./telemetry.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=================================================");
    println!("  Telemetry Collector - gNMI & Cisco MDT         ");
    println!("=================================================");
    println!();

    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match CollectorConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration from {}: {}", config_path, e);
            return Err(e.into());
        }
    };
    info!("Loaded configuration from {}", config_path);
    println!("  - Targets: {}", config.targets.len());
    println!("  - Redial interval: {}s", config.redial_interval_secs);
    println!();

    let sink: Arc<dyn EventSink> = match &config.event_log {
        Some(log_config) => {
            info!("Writing events to {}", log_config.base_dir);
            Arc::new(EventLogWriter::new(log_config.clone())?)
        }
        None => Arc::new(LogSink),
    };
    let diagnostics: Arc<dyn Diagnostics> = Arc::new(LogDiagnostics);
    let shutdown = CancellationToken::new();

    let gnmi = match &config.gnmi {
        Some(gnmi) => {
            let manager = SessionManager::new(
                GnmiDialer::new(gnmi)?,
                config.targets_for(DialInProtocol::Gnmi),
                config.redial_interval(),
                sink.clone(),
                diagnostics.clone(),
            )?
            .with_cancellation_token(shutdown.clone());
            println!("  - gNMI sessions: {}", manager.start());
            Some(manager)
        }
        None => None,
    };

    let mdt = match &config.mdt {
        Some(mdt) => {
            let manager = SessionManager::new(
                MdtDialer::new(mdt)?,
                config.targets_for(DialInProtocol::Mdt),
                config.redial_interval(),
                sink.clone(),
                diagnostics.clone(),
            )?
            .with_cancellation_token(shutdown.clone());
            println!("  - MDT dial-in sessions: {}", manager.start());
            Some(manager)
        }
        None => None,
    };

    let dialout = match &config.dialout {
        Some(dialout) => {
            let server = DialoutServer::new(dialout, sink.clone(), diagnostics.clone(), shutdown.clone())?;
            println!("  - MDT dial-out listener: {}", server.listen_addr());
            Some(tokio::spawn(server.serve()))
        }
        None => None,
    };
    println!();

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    shutdown.cancel();

    if let Some(manager) = &gnmi {
        manager.shutdown().await;
    }
    if let Some(manager) = &mdt {
        manager.shutdown().await;
    }
    if let Some(handle) = dialout {
        match handle.await {
            Ok(Err(e)) => error!("Dial-out listener failed: {}", e),
            Err(e) => error!("Dial-out listener task failed: {}", e),
            Ok(Ok(())) => {}
        }
    }

    println!("=================================================");
    println!("  Telemetry Collector Shut Down");
    println!("=================================================");

    Ok(())
}
