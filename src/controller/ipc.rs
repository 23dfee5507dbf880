//! IPC server for command-line clients

use super::export::write_csv_file;
use super::session::ScanSummary;
use super::state::SessionSnapshot;
use super::AppState;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

/// IPC request from client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IpcRequest {
    GetStatus,
    Scan,
    Refresh,
    Clear,
    Export {
        #[serde(default)]
        path: Option<String>,
    },
}

/// IPC response to client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IpcResponse {
    Status(SessionSnapshot),
    Scanned(ScanSummary),
    Exported { path: String, rows: usize },
    Ok,
    Error(String),
}

/// Run the IPC server
pub async fn run_ipc_server(listener: UnixListener, state: Arc<AppState>) -> Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let state = state.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, state).await {
                        tracing::warn!(error = %e, "IPC client error");
                    }
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to accept IPC connection");
            }
        }
    }
}

async fn handle_client(stream: UnixStream, state: Arc<AppState>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            break; // EOF
        }

        let response = match serde_json::from_str::<IpcRequest>(&line) {
            Ok(request) => handle_request(request, &state).await,
            Err(e) => IpcResponse::Error(format!("Invalid request: {}", e)),
        };

        let json = serde_json::to_string(&response)? + "\n";
        writer.write_all(json.as_bytes()).await?;
    }

    Ok(())
}

async fn handle_request(request: IpcRequest, state: &AppState) -> IpcResponse {
    let session = &state.session;
    match request {
        IpcRequest::GetStatus => IpcResponse::Status(session.snapshot()),
        IpcRequest::Scan => match session.scan().await {
            Ok(summary) => IpcResponse::Scanned(summary),
            Err(e) => IpcResponse::Error(e.to_string()),
        },
        IpcRequest::Refresh => match session.refresh().await {
            Ok(summary) => IpcResponse::Scanned(summary),
            Err(e) => IpcResponse::Error(e.to_string()),
        },
        IpcRequest::Clear => match session.clear() {
            Ok(()) => IpcResponse::Ok,
            Err(e) => IpcResponse::Error(e.to_string()),
        },
        IpcRequest::Export { path } => {
            let path = path
                .map(PathBuf::from)
                .unwrap_or_else(|| state.config.scanner.export_path.clone());
            let exported = session
                .export_csv(&state.config.scanner.csv)
                .and_then(|export| write_csv_file(&path, &export.bytes).map(|()| export.rows));

            match exported {
                Ok(rows) => IpcResponse::Exported {
                    path: path.display().to_string(),
                    rows,
                },
                Err(e) => IpcResponse::Error(e.to_string()),
            }
        }
    }
}

/// Send one request to the daemon and wait for its response (client side)
pub async fn request(socket_path: &str, request: &IpcRequest) -> Result<IpcResponse> {
    let stream = UnixStream::connect(socket_path).await?;
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let json = serde_json::to_string(request)? + "\n";
    writer.write_all(json.as_bytes()).await?;

    let mut line = String::new();
    reader.read_line(&mut line).await?;

    Ok(serde_json::from_str(&line)?)
}

/// Get status from daemon (client side)
pub async fn get_status(socket_path: &str) -> Result<SessionSnapshot> {
    match request(socket_path, &IpcRequest::GetStatus).await? {
        IpcResponse::Status(snapshot) => Ok(snapshot),
        IpcResponse::Error(e) => anyhow::bail!("Daemon error: {}", e),
        _ => anyhow::bail!("Unexpected response"),
    }
}

/// One-line summary of a daemon response for the `ctl` command
pub fn describe_response(response: &IpcResponse) -> String {
    match response {
        IpcResponse::Status(snapshot) => format!(
            "{:?}: {} networks ({})",
            snapshot.state,
            snapshot.network_count,
            snapshot.last_scan_text()
        ),
        IpcResponse::Scanned(summary) => format!(
            "Found {} networks ({} open).",
            summary.network_count, summary.open_count
        ),
        IpcResponse::Exported { path, rows } => {
            format!("Exported {} networks to {}", rows, path)
        }
        IpcResponse::Ok => "OK".to_string(),
        IpcResponse::Error(e) => format!("Error: {}", e),
    }
}
