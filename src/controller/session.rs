//! Scan session state machine
//!
//! One `ScanSession` exists per process and is shared by every front end as
//! an `Arc<ScanSession>`. The session owns the current result set and decides
//! when a scan, refresh, clear or export may happen.
//!
//! The state lock is a plain `std::sync::Mutex` that is only held for the
//! guard-and-set of a transition, never across the provider call.

use super::error::{ScanFailure, SessionError};
use super::export::{to_csv, CsvExport, CsvOptions};
use super::normalize::{normalize, NetworkRecord, RawObservation};
use super::provider::{ConnectivityProbe, WifiProvider};
use super::state::{SessionData, SessionSnapshot, SessionState};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Result of a completed scan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanSummary {
    pub scan_id: Uuid,
    pub network_count: usize,
    pub open_count: usize,
    pub scanned_at: DateTime<Local>,
    pub refreshed: bool,
}

/// Upper bound on the connected-SSID lookup that follows each scan
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanKind {
    Initial,
    Refresh,
}

pub struct ScanSession {
    provider: Arc<dyn WifiProvider>,
    probe: Arc<dyn ConnectivityProbe>,
    scan_timeout: Option<Duration>,
    data: Mutex<SessionData>,
    state_tx: watch::Sender<SessionSnapshot>,
}

impl ScanSession {
    pub fn new(provider: Arc<dyn WifiProvider>, probe: Arc<dyn ConnectivityProbe>) -> Self {
        let (state_tx, _) = watch::channel(SessionSnapshot::default());
        Self {
            provider,
            probe,
            scan_timeout: None,
            data: Mutex::new(SessionData::default()),
            state_tx,
        }
    }

    /// Bound each provider call. `None` waits as long as the provider needs.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.scan_timeout = timeout;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&*self.lock())
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Scan for networks, replacing any previous results.
    pub async fn scan(&self) -> Result<ScanSummary, SessionError> {
        self.run_scan(ScanKind::Initial, CancellationToken::new())
            .await
    }

    /// Re-scan. Only allowed once a scan has completed since the last clear.
    pub async fn refresh(&self) -> Result<ScanSummary, SessionError> {
        self.run_scan(ScanKind::Refresh, CancellationToken::new())
            .await
    }

    pub async fn scan_with_cancel(
        &self,
        cancel: CancellationToken,
    ) -> Result<ScanSummary, SessionError> {
        self.run_scan(ScanKind::Initial, cancel).await
    }

    pub async fn refresh_with_cancel(
        &self,
        cancel: CancellationToken,
    ) -> Result<ScanSummary, SessionError> {
        self.run_scan(ScanKind::Refresh, cancel).await
    }

    /// Discard results and timestamp. Passes through `Cleared` and settles in `Idle`.
    pub fn clear(&self) -> Result<(), SessionError> {
        let mut data = self.lock();
        if data.state == SessionState::Scanning {
            return Err(SessionError::ScanInProgress);
        }

        let discarded = data.results.len();
        data.results.clear();
        data.last_scan = None;
        data.last_error = None;
        data.state = SessionState::Cleared;
        self.publish(&data);

        data.state = SessionState::Idle;
        self.publish(&data);

        tracing::info!(discarded, "Cleared scan results");
        Ok(())
    }

    /// Encode the current results as CSV. Never changes the session state.
    pub fn export_csv(&self, options: &CsvOptions) -> Result<CsvExport, SessionError> {
        let results = self.lock().results.clone();
        let bytes = to_csv(&results, options)?;
        Ok(CsvExport {
            bytes,
            rows: results.len(),
        })
    }

    /// Current results in scan order
    pub fn results(&self) -> Vec<NetworkRecord> {
        self.lock().results.clone()
    }

    async fn run_scan(
        &self,
        kind: ScanKind,
        cancel: CancellationToken,
    ) -> Result<ScanSummary, SessionError> {
        let guard = self.begin_scan(kind)?;
        let scan_id = Uuid::new_v4();

        tracing::info!(
            scan_id = %scan_id,
            provider = self.provider.name(),
            refresh = kind == ScanKind::Refresh,
            "Scanning for WiFi networks"
        );

        let outcome = match self.query_provider(&cancel).await {
            Ok(observations) => self
                .query_probe(&cancel)
                .await
                .map(|connected_ssid| (observations, connected_ssid)),
            Err(failure) => Err(failure),
        };

        match outcome {
            Ok((observations, connected_ssid)) => {
                let records = normalize(&observations);
                let summary = guard.commit(scan_id, kind, records, connected_ssid);

                tracing::info!(
                    scan_id = %scan_id,
                    count = summary.network_count,
                    open = summary.open_count,
                    "Scan complete"
                );
                Ok(summary)
            }
            Err(failure) => {
                tracing::warn!(scan_id = %scan_id, error = %failure, "Scan failed");
                guard.fail(&failure);
                Err(SessionError::ScanFailed(failure))
            }
        }
    }

    fn begin_scan(&self, kind: ScanKind) -> Result<ScanGuard<'_>, SessionError> {
        let mut data = self.lock();
        match (data.state, kind) {
            (SessionState::Scanning, _) => return Err(SessionError::ScanInProgress),
            (SessionState::Ready, _) | (_, ScanKind::Initial) => {}
            (_, ScanKind::Refresh) => return Err(SessionError::RefreshUnavailable),
        }

        let prior = data.state;
        data.state = SessionState::Scanning;
        self.publish(&data);

        Ok(ScanGuard {
            session: self,
            prior,
            finished: false,
        })
    }

    async fn query_provider(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawObservation>, ScanFailure> {
        let scan = async {
            match self.scan_timeout {
                Some(limit) => tokio::time::timeout(limit, self.provider.scan())
                    .await
                    .map_err(|_| ScanFailure::TimedOut(limit))?
                    .map_err(ScanFailure::from),
                None => self.provider.scan().await.map_err(ScanFailure::from),
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ScanFailure::Cancelled),
            result = scan => result,
        }
    }

    /// Look up the connected SSID. An overrun reads as `None`; only
    /// cancellation fails the scan.
    async fn query_probe(&self, cancel: &CancellationToken) -> Result<Option<String>, ScanFailure> {
        let limit = self
            .scan_timeout
            .map_or(PROBE_TIMEOUT, |timeout| timeout.min(PROBE_TIMEOUT));

        let lookup = async {
            match tokio::time::timeout(limit, self.probe.current_ssid()).await {
                Ok(ssid) => ssid,
                Err(_) => {
                    tracing::debug!(
                        timeout_ms = limit.as_millis() as u64,
                        "Connected SSID lookup timed out"
                    );
                    None
                }
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ScanFailure::Cancelled),
            ssid = lookup => Ok(ssid),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, data: &SessionData) {
        self.state_tx.send_replace(SessionSnapshot::from(data));
    }
}

/// Holds the `Scanning` state for one provider call.
///
/// Dropping the guard without committing restores the state the session had
/// before the scan started, so an aborted task cannot leave it stuck.
struct ScanGuard<'a> {
    session: &'a ScanSession,
    prior: SessionState,
    finished: bool,
}

impl ScanGuard<'_> {
    fn commit(
        mut self,
        scan_id: Uuid,
        kind: ScanKind,
        records: Vec<NetworkRecord>,
        connected_ssid: Option<String>,
    ) -> ScanSummary {
        let scanned_at = Local::now();
        let summary = ScanSummary {
            scan_id,
            network_count: records.len(),
            open_count: records.iter().filter(|r| r.is_open_warning()).count(),
            scanned_at,
            refreshed: kind == ScanKind::Refresh,
        };

        let mut data = self.session.lock();
        data.results = records;
        data.last_scan = Some(scanned_at);
        data.connected_ssid = connected_ssid;
        data.last_error = None;
        data.state = SessionState::Ready;
        self.session.publish(&data);

        self.finished = true;
        summary
    }

    fn fail(mut self, failure: &ScanFailure) {
        let mut data = self.session.lock();
        data.state = self.prior;
        data.last_error = Some(failure.to_string());
        self.session.publish(&data);

        self.finished = true;
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let mut data = self.session.lock();
        data.state = self.prior;
        self.session.publish(&data);
        tracing::debug!(state = ?self.prior, "Scan abandoned, state restored");
    }
}
