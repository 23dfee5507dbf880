//! Error types for scanning, session transitions and export

use std::time::Duration;
use thiserror::Error;

/// Failure reported by a [`super::WifiProvider`]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("no wireless interface available: {0}")]
    NoInterface(String),

    #[error("permission denied while scanning")]
    PermissionDenied,

    #[error("{0}")]
    Provider(String),
}

/// Why a scan did not produce results
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScanFailure {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("scan timed out after {0:?}")]
    TimedOut(Duration),

    #[error("scan cancelled")]
    Cancelled,
}

/// Errors returned by [`super::ScanSession`] operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a scan is already in progress")]
    ScanInProgress,

    #[error("refresh is only available after a completed scan")]
    RefreshUnavailable,

    #[error("scan failed: {0}")]
    ScanFailed(#[from] ScanFailure),

    #[error("no Wi-Fi networks to export")]
    NoData,

    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Short title for status bars and notifications
    pub fn title(&self) -> &'static str {
        match self {
            Self::ScanInProgress => "Scan In Progress",
            Self::RefreshUnavailable => "Refresh Unavailable",
            Self::ScanFailed(_) => "Scan Failed",
            Self::NoData => "No Data",
            Self::Csv(_) | Self::Io(_) => "Export Failed",
        }
    }
}
