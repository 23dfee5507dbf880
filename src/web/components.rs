//! Leptos + shadcn component rendering for the scanner page.

use crate::controller::{NetworkRecord, SessionSnapshot, SessionState};
use leptos::prelude::*;
use leptos_shadcn_alert::{Alert, AlertDescription, AlertTitle, AlertVariant};
use leptos_shadcn_badge::{Badge, BadgeVariant};
use leptos_shadcn_button::{Button, ButtonSize, ButtonVariant};
use leptos_shadcn_card::{Card, CardContent, CardDescription, CardHeader, CardTitle};

const SCANNER_BEHAVIOR_JS: &str = r#"
(function () {
  var actionIds = ['scan-btn', 'refresh-btn', 'clear-btn'];
  var initiallyDisabled = {};

  function byId(id) {
    return document.getElementById(id);
  }

  function updateStatus(text, tone, detail) {
    var status = byId('status');
    status.setAttribute('data-state', tone);
    byId('status-text').textContent = text;
    if (typeof detail === 'string' && detail.length > 0) {
      byId('status-detail').textContent = detail;
    }
  }

  function setBusy(busy) {
    actionIds.forEach(function (id) {
      var button = byId(id);
      button.disabled = busy ? true : initiallyDisabled[id];
    });
  }

  async function post(path, pendingText, pendingDetail) {
    setBusy(true);
    updateStatus(pendingText, 'scanning', pendingDetail);

    try {
      var response = await fetch(path, { method: 'POST' });
      var data = await response.json();
      if (data.success) {
        updateStatus(data.title, 'ready', data.message);
        window.location.reload();
        return;
      }
      updateStatus(data.title || 'Request failed', 'failed', data.message);
    } catch (err) {
      updateStatus('Request failed', 'failed', err.message || 'Unexpected network error.');
    }
    setBusy(false);
  }

  actionIds.forEach(function (id) {
    initiallyDisabled[id] = byId(id).disabled;
  });

  byId('scan-btn').addEventListener('click', function () {
    post('/api/scan', 'Scanning for nearby networks', 'Waiting for the radio to collect results...');
  });

  byId('refresh-btn').addEventListener('click', function () {
    post('/api/refresh', 'Refreshing networks', 'Waiting for the radio to collect results...');
  });

  byId('clear-btn').addEventListener('click', function () {
    post('/api/clear', 'Clearing results', '');
  });

  byId('export-btn').addEventListener('click', function (event) {
    if (!document.querySelector('.network-row')) {
      event.preventDefault();
      updateStatus('No Data', 'failed', 'No Wi-Fi networks to export.');
    }
  });
})();
"#;

pub fn render_scanner_page(snapshot: &SessionSnapshot) -> String {
    let status_text = status_text(snapshot);
    let status_detail = status_detail(snapshot);
    let status_variant = status_variant(snapshot);
    let status_class = format!("scanner-status state-{}", status_tone(snapshot));
    let last_scan = snapshot.last_scan_text();
    let connected = snapshot.connected_text();
    let scanning = snapshot.state == SessionState::Scanning;
    let refresh_disabled = !snapshot.can_refresh || scanning;
    let footer = format!("Found {} networks.", snapshot.network_count);
    let networks = snapshot.networks.clone();
    let has_networks = !networks.is_empty();

    let body_html = view! {
            <div class="scanner-root">
                <Card class="scanner-shell">
                    <CardHeader class="scanner-header">
                        <CardTitle class="scanner-title">"Wi-Fi Network Scanner"</CardTitle>
                        <CardDescription class="scanner-subtitle">{last_scan}</CardDescription>
                        <p class="scanner-connected" id="connected-ssid">{connected}</p>
                    </CardHeader>

                    <CardContent class="scanner-content">
                        <Alert class=status_class id="status" variant=status_variant>
                            <AlertTitle class="scanner-status-title" id="status-text">{status_text}</AlertTitle>
                            <AlertDescription class="scanner-status-detail" id="status-detail">{status_detail}</AlertDescription>
                        </Alert>

                        <div class="scanner-actions">
                            <button class="plain-btn primary" disabled=scanning id="scan-btn" type="button">
                                "Scan Networks"
                            </button>
                            <button class="plain-btn" disabled=refresh_disabled id="refresh-btn" type="button">
                                "Refresh"
                            </button>
                            <a class="plain-btn link-btn" download="" href="/api/export" id="export-btn">
                                "Export to CSV"
                            </a>
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                class="scanner-action-btn"
                                id="clear-btn"
                            >
                                "Clear Results"
                            </Button>
                        </div>

                        <section class="network-list" id="network-list">
                            {if has_networks {
                                view! {
                                    <table class="network-table">
                                        <thead>
                                            <tr>
                                                <th>"SSID"</th>
                                                <th>"Signal"</th>
                                                <th>"Security"</th>
                                            </tr>
                                        </thead>
                                        <tbody>
                                            {networks.into_iter().map(render_network_row).collect_view()}
                                        </tbody>
                                    </table>
                                }
                                .into_any()
                            } else {
                                view! {
                                    <p class="empty-state">
                                        "No networks to show. Use Scan Networks to look for nearby Wi-Fi."
                                    </p>
                                }
                                .into_any()
                            }}
                        </section>

                        <p class="scanner-footer" id="status-bar">{footer}</p>
                    </CardContent>
                </Card>
            </div>
    }
    .to_html();

    format!(
        r#"<!DOCTYPE html>
<html class="dark" lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <meta name="color-scheme" content="dark">
  <title>Wi-Fi Network Scanner</title>
  <link rel="stylesheet" href="/style.css">
</head>
<body>
{}
<script>{}</script>
</body>
</html>"#,
        body_html, SCANNER_BEHAVIOR_JS
    )
}

fn render_network_row(network: NetworkRecord) -> impl IntoView {
    let row_class = if network.is_even_row() {
        "network-row even"
    } else {
        "network-row odd"
    };
    let tier = network.signal_tier();
    let tier_class = format!("signal-cell tier-{}", tier.label().to_lowercase());
    let open = network.is_open_warning();
    let security_label = if open {
        format!("{} ⭐", network.security())
    } else {
        network.security().to_string()
    };
    let badge_variant = if open {
        BadgeVariant::Default
    } else {
        BadgeVariant::Secondary
    };

    view! {
        <tr class=row_class data-open=if open { "true" } else { "false" }>
            <td class="network-ssid">{network.ssid().to_string()}</td>
            <td class=tier_class>
                <span class="signal-value">{network.signal_display()}</span>
                <span class="signal-glyph" title=tier.label()>{tier.glyph()}</span>
            </td>
            <td class="network-security">
                <Badge class="network-badge" variant=badge_variant>{security_label}</Badge>
            </td>
        </tr>
    }
}

fn status_variant(snapshot: &SessionSnapshot) -> AlertVariant {
    if snapshot.last_error.is_some() && snapshot.state != SessionState::Scanning {
        return AlertVariant::Destructive;
    }
    match snapshot.state {
        SessionState::Scanning => AlertVariant::Warning,
        SessionState::Ready => AlertVariant::Success,
        SessionState::Idle | SessionState::Cleared => AlertVariant::Default,
    }
}

fn status_tone(snapshot: &SessionSnapshot) -> &'static str {
    if snapshot.last_error.is_some() && snapshot.state != SessionState::Scanning {
        return "failed";
    }
    match snapshot.state {
        SessionState::Scanning => "scanning",
        SessionState::Ready => "ready",
        SessionState::Idle | SessionState::Cleared => "idle",
    }
}

fn status_text(snapshot: &SessionSnapshot) -> String {
    match (snapshot.state, &snapshot.last_error) {
        (SessionState::Scanning, _) => "Scanning for nearby networks".to_string(),
        (SessionState::Ready, Some(_)) => "Refresh failed".to_string(),
        (_, Some(_)) => "Scan failed".to_string(),
        (SessionState::Ready, None) => "Scan complete".to_string(),
        (SessionState::Cleared, None) => "Results cleared".to_string(),
        (SessionState::Idle, None) => "Ready to scan".to_string(),
    }
}

fn status_detail(snapshot: &SessionSnapshot) -> String {
    if let Some(error) = &snapshot.last_error {
        if snapshot.state != SessionState::Scanning {
            return error.clone();
        }
    }
    match snapshot.state {
        SessionState::Scanning => "Waiting for the radio to collect results...".to_string(),
        SessionState::Ready => match snapshot.open_count() {
            0 => "Wi-Fi networks found!".to_string(),
            open => format!("Wi-Fi networks found! {} open networks are marked ⭐.", open),
        },
        SessionState::Cleared => "Wi-Fi data cleared. You can scan again.".to_string(),
        SessionState::Idle => "Click Scan Networks to look for nearby Wi-Fi.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::normalize::{normalize, RawObservation};
    use crate::controller::security::AkmCode;

    fn ready_snapshot() -> SessionSnapshot {
        let networks = normalize(&[
            RawObservation::new("Home<5G>", -45, vec![AkmCode::WPA2_PSK]),
            RawObservation::new("", -72, vec![]),
            RawObservation::new("Lobby", -85, vec![]),
        ]);
        SessionSnapshot {
            state: SessionState::Ready,
            network_count: networks.len(),
            networks,
            last_scan: None,
            connected_ssid: Some("Home<5G>".to_string()),
            last_error: None,
            can_refresh: true,
        }
    }

    #[test]
    fn test_idle_page_disables_refresh() {
        let html = render_scanner_page(&SessionSnapshot::default());
        assert!(html.contains("Ready to scan"));
        assert!(html.contains("Last scanned: Never"));
        assert!(html.contains("Connected to: Unavailable"));
        assert!(html.contains("Found 0 networks."));
        assert!(html.contains("empty-state"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn test_ready_page_escapes_and_stripes_rows() {
        let html = render_scanner_page(&ready_snapshot());
        assert!(html.contains("Home&lt;5G&gt;"));
        assert!(html.contains("&lt;Hidden&gt;"));
        assert!(!html.contains("<Hidden>"));
        assert!(html.contains("network-row odd"));
        assert!(html.contains("network-row even"));
        assert!(html.contains("-45 dBm"));
        assert!(html.contains("Open ⭐"));
        assert!(html.contains("tier-excellent"));
        assert!(html.contains("tier-unusable"));
        assert!(html.contains("Found 3 networks."));
    }

    #[test]
    fn test_failed_refresh_keeps_rows_and_shows_error() {
        let mut snapshot = ready_snapshot();
        snapshot.last_error = Some("scan timed out after 5s".to_string());

        assert_eq!(status_text(&snapshot), "Refresh failed");
        assert_eq!(status_tone(&snapshot), "failed");
        let html = render_scanner_page(&snapshot);
        assert!(html.contains("scan timed out after 5s"));
        assert!(html.contains("Lobby"));
    }

    #[test]
    fn test_status_copy_per_state() {
        let mut snapshot = SessionSnapshot::default();
        snapshot.state = SessionState::Scanning;
        assert_eq!(status_text(&snapshot), "Scanning for nearby networks");
        assert_eq!(status_tone(&snapshot), "scanning");

        snapshot.state = SessionState::Cleared;
        assert_eq!(
            status_detail(&snapshot),
            "Wi-Fi data cleared. You can scan again."
        );

        snapshot.state = SessionState::Idle;
        snapshot.last_error = Some("permission denied while scanning".to_string());
        assert_eq!(status_text(&snapshot), "Scan failed");
    }
}
