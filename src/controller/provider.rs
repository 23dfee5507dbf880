//! Collaborator traits for scan backends

use super::error::ProviderError;
use super::normalize::RawObservation;
use async_trait::async_trait;

/// A source of raw WiFi scan results.
///
/// Implementations may block for a settle interval while the radio collects
/// beacons. Callers must not assume a fast return.
#[async_trait]
pub trait WifiProvider: Send + Sync {
    /// Trigger a scan and return every observed access point in scan order.
    async fn scan(&self) -> Result<Vec<RawObservation>, ProviderError>;

    /// Short backend name used in logs
    fn name(&self) -> &'static str;
}

/// Best-effort lookup of the network this machine is associated with.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Returns `None` when disconnected or when the lookup fails.
    async fn current_ssid(&self) -> Option<String>;
}
