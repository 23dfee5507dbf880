//! Canned scan results for demos and environments without a wireless radio

use super::error::ProviderError;
use super::normalize::RawObservation;
use super::provider::{ConnectivityProbe, WifiProvider};
use super::security::AkmCode;
use async_trait::async_trait;
use std::time::Duration;

/// Provider that replays a fixed set of observations
pub struct FixtureProvider {
    observations: Vec<RawObservation>,
    settle: Duration,
}

impl FixtureProvider {
    pub fn new(observations: Vec<RawObservation>, settle: Duration) -> Self {
        Self {
            observations,
            settle,
        }
    }

    /// Demo data set covering every signal tier and the common security types
    pub fn demo(settle: Duration) -> Self {
        Self::new(demo_observations(), settle)
    }
}

#[async_trait]
impl WifiProvider for FixtureProvider {
    async fn scan(&self) -> Result<Vec<RawObservation>, ProviderError> {
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }
        Ok(self.observations.clone())
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

/// Probe that always reports the same SSID (or none)
pub struct FixtureProbe {
    ssid: Option<String>,
}

impl FixtureProbe {
    pub fn new(ssid: Option<String>) -> Self {
        Self { ssid }
    }
}

#[async_trait]
impl ConnectivityProbe for FixtureProbe {
    async fn current_ssid(&self) -> Option<String> {
        self.ssid.clone()
    }
}

pub const DEMO_CONNECTED_SSID: &str = "CU_WiFi";

fn demo_observations() -> Vec<RawObservation> {
    vec![
        RawObservation::new("CU_WiFi", -45, vec![AkmCode::WPA2_PSK]),
        RawObservation::new("Library-Guest", -58, vec![AkmCode::NONE]),
        RawObservation::new("eduroam", -63, vec![AkmCode::WPA2]),
        RawObservation::new("", -80, vec![]),
        RawObservation::new("Cafe, \"Free\" WiFi", -71, vec![]),
        RawObservation::new("Printer-DIRECT", -86, vec![AkmCode::WPA_PSK]),
    ]
}
