//! Wi-Fi Network Scanner - nearby network survey with web view, TUI and CSV export
//!
//! This binary provides four modes:
//! - `daemon`: Runs the scan session behind the web view and IPC socket
//! - `tui`: Terminal table driven by an in-process session
//! - `scan`: One-shot scan printed to stdout (for scripts)
//! - `ctl`: Sends a single command to a running daemon

mod controller;
mod tui;
mod web;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use controller::{
    ipc, CsvOptions, ProviderKind, ScannerConfig, DEFAULT_EXPORT_PATH, DEFAULT_SOCKET_PATH,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "wifi-scanner")]
#[command(about = "Scan, grade and export nearby Wi-Fi networks", long_about = None)]
struct Cli {
    #[command(flatten)]
    scanner: ScannerArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScannerArgs {
    /// Scan backend
    #[arg(long, value_enum, default_value = "networkmanager", global = true)]
    provider: ProviderKind,

    /// Wireless interface to scan with
    #[arg(long, default_value = "auto", global = true)]
    interface: String,

    /// Seconds to let the radio collect beacons after requesting a scan
    #[arg(long, default_value = "3", global = true)]
    settle_secs: u64,

    /// Give up on a scan after this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Where exported CSV files are written
    #[arg(long, default_value = DEFAULT_EXPORT_PATH, global = true)]
    export_path: PathBuf,

    /// Include tier glyphs and open-network stars in exported cells
    #[arg(long, global = true)]
    glyphs: bool,
}

impl From<ScannerArgs> for ScannerConfig {
    fn from(args: ScannerArgs) -> Self {
        Self {
            provider: args.provider,
            interface: args.interface,
            settle: Duration::from_secs(args.settle_secs),
            scan_timeout: args.timeout_secs.map(Duration::from_secs),
            export_path: args.export_path,
            csv: if args.glyphs {
                CsvOptions::table_view()
            } else {
                CsvOptions::default()
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scanner daemon (web view + IPC socket)
    Daemon {
        /// Web view port
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Unix socket path for client commands
        #[arg(long, default_value = DEFAULT_SOCKET_PATH)]
        socket: String,
    },

    /// Run the terminal UI
    Tui,

    /// Scan once and print the results
    Scan {
        /// Also write the results as CSV
        #[arg(long)]
        export: bool,
    },

    /// Send a command to a running daemon
    Ctl {
        /// Unix socket path for daemon communication
        #[arg(long, default_value = DEFAULT_SOCKET_PATH)]
        socket: String,

        #[command(subcommand)]
        action: CtlAction,
    },
}

#[derive(Subcommand)]
enum CtlAction {
    /// Run a fresh scan
    Scan,
    /// Re-run the last scan
    Refresh,
    /// Drop the current results
    Clear,
    /// Write the current results as CSV on the daemon host
    Export {
        #[arg(long)]
        path: Option<String>,
    },
    /// Show the daemon's current results
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so it only logs warnings and keeps them off stdout.
    if matches!(cli.command, Commands::Tui) {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let scanner = ScannerConfig::from(cli.scanner);

    match cli.command {
        Commands::Daemon { port, socket } => {
            tracing::info!("Starting Wi-Fi scanner daemon");
            controller::run_daemon(controller::DaemonConfig {
                scanner,
                port,
                socket,
            })
            .await?;
        }
        Commands::Tui => {
            tui::run_tui(scanner).await?;
        }
        Commands::Scan { export } => {
            controller::run_once(&scanner, export).await?;
        }
        Commands::Ctl { socket, action } => {
            let request = match action {
                CtlAction::Status => return controller::print_status(&socket).await,
                CtlAction::Scan => ipc::IpcRequest::Scan,
                CtlAction::Refresh => ipc::IpcRequest::Refresh,
                CtlAction::Clear => ipc::IpcRequest::Clear,
                CtlAction::Export { path } => ipc::IpcRequest::Export { path },
            };

            let response = ipc::request(&socket, &request)
                .await
                .with_context(|| format!("Failed to reach daemon at {} (is it running?)", socket))?;
            println!("{}", ipc::describe_response(&response));
            if let ipc::IpcResponse::Error(e) = response {
                anyhow::bail!("daemon rejected request: {}", e);
            }
        }
    }

    Ok(())
}
