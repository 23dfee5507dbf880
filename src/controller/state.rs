//! Shared state types for the scan session

use super::normalize::NetworkRecord;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the scan session
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Scanning,
    Ready,
    Cleared,
}

/// Mutable session data guarded by the session lock
#[derive(Debug, Clone, Default)]
pub(super) struct SessionData {
    pub state: SessionState,
    pub results: Vec<NetworkRecord>,
    pub last_scan: Option<DateTime<Local>>,
    pub connected_ssid: Option<String>,
    pub last_error: Option<String>,
}

/// Serializable view of the session (for presenters, IPC and the web API)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub networks: Vec<NetworkRecord>,
    pub network_count: usize,
    pub last_scan: Option<DateTime<Local>>,
    pub connected_ssid: Option<String>,
    pub last_error: Option<String>,
    pub can_refresh: bool,
}

impl SessionSnapshot {
    /// `"Last scanned: 2026-10-18 09:41 AM"` or `"Last scanned: Never"`
    pub fn last_scan_text(&self) -> String {
        match &self.last_scan {
            Some(at) => format!("Last scanned: {}", at.format("%Y-%m-%d %I:%M %p")),
            None => "Last scanned: Never".to_string(),
        }
    }

    pub fn connected_text(&self) -> String {
        format!(
            "Connected to: {}",
            self.connected_ssid.as_deref().unwrap_or("Unavailable")
        )
    }

    pub fn open_count(&self) -> usize {
        self.networks.iter().filter(|n| n.is_open_warning()).count()
    }
}

impl From<&SessionData> for SessionSnapshot {
    fn from(data: &SessionData) -> Self {
        Self {
            state: data.state,
            networks: data.results.clone(),
            network_count: data.results.len(),
            last_scan: data.last_scan,
            connected_ssid: data.connected_ssid.clone(),
            last_error: data.last_error.clone(),
            can_refresh: data.state == SessionState::Ready,
        }
    }
}
