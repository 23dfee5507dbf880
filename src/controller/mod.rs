//! Scan controller - session, providers and daemon wiring

pub mod error;
pub mod export;
pub mod fixture;
pub mod ipc;
mod network_manager;
pub mod normalize;
pub mod provider;
pub mod security;
pub mod session;
pub mod signal;
pub mod state;

pub use error::SessionError;
pub use export::{CsvOptions, DEFAULT_EXPORT_PATH};
pub use normalize::NetworkRecord;
pub use provider::{ConnectivityProbe, WifiProvider};
pub use session::{ScanSession, ScanSummary};
pub use signal::SignalTier;
pub use state::{SessionSnapshot, SessionState};

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UnixListener;

/// Default Unix socket for daemon communication
pub const DEFAULT_SOCKET_PATH: &str = "/run/wifi-scanner.sock";

/// Which scan backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderKind {
    /// NetworkManager over D-Bus
    #[value(name = "networkmanager")]
    NetworkManager,
    /// Canned demo networks
    Fixture,
}

/// Scanner configuration shared by every front end
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub provider: ProviderKind,
    pub interface: String,
    pub settle: Duration,
    pub scan_timeout: Option<Duration>,
    pub export_path: PathBuf,
    pub csv: CsvOptions,
}

/// Daemon configuration
pub struct DaemonConfig {
    pub scanner: ScannerConfig,
    pub port: u16,
    pub socket: String,
}

/// Shared application state
pub struct AppState {
    pub session: Arc<ScanSession>,
    pub config: DaemonConfig,
}

/// Build the process-wide session for the configured backend
pub fn build_session(config: &ScannerConfig) -> ScanSession {
    let (provider, probe): (Arc<dyn WifiProvider>, Arc<dyn ConnectivityProbe>) =
        match config.provider {
            ProviderKind::NetworkManager => {
                let nm = Arc::new(network_manager::NetworkManagerProvider::new(
                    config.interface.clone(),
                    config.settle,
                ));
                (nm.clone(), nm)
            }
            ProviderKind::Fixture => (
                Arc::new(fixture::FixtureProvider::demo(config.settle)),
                Arc::new(fixture::FixtureProbe::new(Some(
                    fixture::DEMO_CONNECTED_SSID.to_string(),
                ))),
            ),
        };

    tracing::info!(
        provider = provider.name(),
        interface = %config.interface,
        settle_ms = config.settle.as_millis() as u64,
        timeout_secs = config.scan_timeout.map(|t| t.as_secs()),
        "Initializing scan session"
    );

    ScanSession::new(provider, probe).with_timeout(config.scan_timeout)
}

/// Run the daemon: web view plus IPC socket around one session
pub async fn run_daemon(config: DaemonConfig) -> Result<()> {
    let session = Arc::new(build_session(&config.scanner));
    let app_state = Arc::new(AppState { session, config });

    // Start IPC server
    let socket_path = app_state.config.socket.clone();
    let _ = std::fs::remove_file(&socket_path);
    let listener = UnixListener::bind(&socket_path)
        .with_context(|| format!("Failed to bind IPC socket {}", socket_path))?;
    tracing::info!(path = %socket_path, "IPC server listening");

    let ipc_state = app_state.clone();
    let ipc_handle = tokio::spawn(async move { ipc::run_ipc_server(listener, ipc_state).await });

    // Start web view
    let web_state = app_state.clone();
    let mut web_handle = tokio::spawn(async move { crate::web::run_server(web_state).await });

    tokio::select! {
        result = &mut web_handle => {
            match result {
                Ok(Ok(())) => tracing::info!("Web server stopped"),
                Ok(Err(e)) => tracing::error!(error = %e, "Web server failed"),
                Err(e) => tracing::error!(error = %e, "Web server task panicked"),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT, shutting down");
        }
    }

    // Cleanup
    tracing::info!("Cleaning up...");
    ipc_handle.abort();
    web_handle.abort();
    let _ = std::fs::remove_file(&socket_path);

    Ok(())
}

/// Scan once, print the report and optionally export it
pub async fn run_once(config: &ScannerConfig, export: bool) -> Result<()> {
    let session = build_session(config);
    session.scan().await?;

    let snapshot = session.snapshot();
    print_report(&snapshot);

    if export {
        match session.export_csv(&config.csv) {
            Ok(csv) => {
                export::write_csv_file(&config.export_path, &csv.bytes)?;
                println!(
                    "Exported {} networks to {}",
                    csv.rows,
                    config.export_path.display()
                );
            }
            Err(SessionError::NoData) => eprintln!("No Wi-Fi networks to export."),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Print current status (for CLI)
pub async fn print_status(socket_path: &str) -> Result<()> {
    match ipc::get_status(socket_path).await {
        Ok(snapshot) => print_report(&snapshot),
        Err(e) => {
            eprintln!("Failed to get status: {}", e);
            eprintln!("Is the daemon running?");
        }
    }
    Ok(())
}

fn print_report(snapshot: &SessionSnapshot) {
    println!("Wi-Fi Network Scanner");
    println!("=====================");
    println!("Status: {:?}", snapshot.state);
    println!("{}", snapshot.last_scan_text());
    println!("{}", snapshot.connected_text());
    if let Some(error) = &snapshot.last_error {
        println!("Last error: {}", error);
    }
    println!("Found {} networks.", snapshot.network_count);

    if snapshot.networks.is_empty() {
        return;
    }

    println!();
    println!("{:<32} {:>8}  {:<10} {}", "SSID", "Signal", "Quality", "Security");
    for net in &snapshot.networks {
        println!(
            "{:<32} {:>8}  {:<10} {}{}",
            net.ssid(),
            net.signal_display(),
            net.signal_tier(),
            net.security(),
            if net.is_open_warning() { " *" } else { "" }
        );
    }
}
