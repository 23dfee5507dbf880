//! NetworkManager D-Bus integration

use super::error::ProviderError;
use super::normalize::RawObservation;
use super::provider::{ConnectivityProbe, WifiProvider};
use super::security::AkmCode;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use zbus::Connection;
use zvariant::{OwnedObjectPath, Value};

const NM_DEST: &str = "org.freedesktop.NetworkManager";
const NM_PATH: &str = "/org/freedesktop/NetworkManager";
const NM_IFACE: &str = "org.freedesktop.NetworkManager";
const NM_DEVICE_IFACE: &str = "org.freedesktop.NetworkManager.Device";
const NM_WIFI_DEVICE_IFACE: &str = "org.freedesktop.NetworkManager.Device.Wireless";
const NM_AP_IFACE: &str = "org.freedesktop.NetworkManager.AccessPoint";
const NM_DEVICE_TYPE_WIFI: u32 = 2;
const NM_80211_AP_FLAGS_PRIVACY: u32 = 0x1;

// NM_802_11_AP_SEC_* key management bits (WpaFlags / RsnFlags)
const NM_AP_SEC_KEY_MGMT_PSK: u32 = 0x100;
const NM_AP_SEC_KEY_MGMT_802_1X: u32 = 0x200;
const NM_AP_SEC_KEY_MGMT_SAE: u32 = 0x400;
const NM_AP_SEC_KEY_MGMT_OWE: u32 = 0x800;

/// Codes for suites outside the classic WPA/WPA2 set
pub const AKM_SAE: AkmCode = AkmCode(8);
pub const AKM_OWE: AkmCode = AkmCode(9);

const SCAN_POLL_INTERVAL: Duration = Duration::from_millis(400);

/// Scans through NetworkManager on the system bus
pub struct NetworkManagerProvider {
    interface: String,
    settle: Duration,
}

impl NetworkManagerProvider {
    /// `interface` may be `auto`; it is resolved on every scan so a card that
    /// appears later is picked up.
    pub fn new(interface: impl Into<String>, settle: Duration) -> Self {
        Self {
            interface: interface.into(),
            settle,
        }
    }
}

#[async_trait]
impl WifiProvider for NetworkManagerProvider {
    async fn scan(&self) -> Result<Vec<RawObservation>, ProviderError> {
        let interface = resolve_wireless_interface(&self.interface)?;
        scan_networks(&interface, self.settle).await
    }

    fn name(&self) -> &'static str {
        "networkmanager"
    }
}

#[async_trait]
impl ConnectivityProbe for NetworkManagerProvider {
    async fn current_ssid(&self) -> Option<String> {
        let interface = resolve_wireless_interface(&self.interface).ok()?;
        match active_ssid(&interface).await {
            Ok(ssid) => ssid,
            Err(e) => {
                tracing::debug!(interface = %interface, error = %e, "Connected SSID unavailable");
                None
            }
        }
    }
}

#[derive(Debug, Clone)]
struct WirelessInterface {
    name: String,
    driver_bound: bool,
    device_hint: String,
}

/// Resolve and validate wireless interface selection.
///
/// Behavior:
/// - `auto` picks a detected wireless interface
/// - explicit interface is used if valid
/// - if explicit interface is missing but exactly one wireless interface exists, fallback to it
fn resolve_wireless_interface(configured: &str) -> Result<String, ProviderError> {
    let configured = configured.trim();
    let interfaces = list_wireless_interfaces();

    if configured.eq_ignore_ascii_case("auto") || configured.is_empty() {
        return choose_auto_interface(&interfaces);
    }

    if let Some(iface) = interfaces.iter().find(|iface| iface.name == configured) {
        if iface.driver_bound {
            return Ok(iface.name.clone());
        }

        return Err(ProviderError::NoInterface(format!(
            "interface '{}' (device: {}) has no kernel driver bound",
            iface.name, iface.device_hint
        )));
    }

    let viable: Vec<&WirelessInterface> = interfaces
        .iter()
        .filter(|iface| iface.driver_bound && !iface.name.starts_with("p2p-"))
        .collect();

    if viable.len() == 1 {
        tracing::warn!(
            configured = configured,
            detected = %viable[0].name,
            "Configured interface not found; falling back to detected wireless interface"
        );
        return Ok(viable[0].name.clone());
    }

    if !viable.is_empty() {
        let names = viable
            .iter()
            .map(|iface| iface.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ProviderError::NoInterface(format!(
            "interface '{}' was not found; detected: {}",
            configured, names
        )));
    }

    Err(ProviderError::NoInterface(format!(
        "interface '{}' was not found and no wireless interfaces were detected",
        configured
    )))
}

fn choose_auto_interface(interfaces: &[WirelessInterface]) -> Result<String, ProviderError> {
    let mut viable = interfaces
        .iter()
        .filter(|iface| iface.driver_bound && !iface.name.starts_with("p2p-"))
        .collect::<Vec<_>>();

    viable.sort_by(|a, b| a.name.cmp(&b.name));

    if let Some(interface) = viable.first() {
        tracing::debug!(interface = %interface.name, "Auto-selected wireless interface");
        return Ok(interface.name.clone());
    }

    let without_driver = interfaces
        .iter()
        .filter(|iface| !iface.driver_bound && !iface.name.starts_with("p2p-"))
        .map(|iface| format!("{} ({})", iface.name, iface.device_hint))
        .collect::<Vec<_>>();

    if !without_driver.is_empty() {
        return Err(ProviderError::NoInterface(format!(
            "wireless interface(s) detected but no kernel driver is bound: {}",
            without_driver.join(", ")
        )));
    }

    Err(ProviderError::NoInterface(
        "no usable wireless interfaces detected".to_string(),
    ))
}

fn list_wireless_interfaces() -> Vec<WirelessInterface> {
    list_wireless_interfaces_in(Path::new("/sys/class/net"))
}

fn list_wireless_interfaces_in(root: &Path) -> Vec<WirelessInterface> {
    let mut interfaces = Vec::new();
    let Ok(entries) = fs::read_dir(root) else {
        return interfaces;
    };

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        let iface_path = entry.path();
        if !iface_path.join("wireless").exists() {
            continue;
        }

        let driver_bound = iface_path.join("device/driver").exists();
        let device_hint = fs::read_link(iface_path.join("device"))
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "unknown-device".to_string());

        interfaces.push(WirelessInterface {
            name,
            driver_bound,
            device_hint,
        });
    }

    interfaces
}

/// Scan for WiFi networks, keeping NetworkManager's access point order
async fn scan_networks(interface: &str, settle: Duration) -> Result<Vec<RawObservation>, ProviderError> {
    tracing::debug!(interface = %interface, "Requesting NetworkManager scan");

    let connection = Connection::system().await.map_err(dbus_error)?;
    let device_path = get_wifi_device_path(&connection, interface).await?;

    request_scan_and_wait(&connection, &device_path, settle).await;

    let ap_paths = get_access_points(&connection, &device_path).await?;
    let mut observations = Vec::with_capacity(ap_paths.len());

    for ap_path in ap_paths {
        match read_access_point(&connection, &ap_path).await {
            Ok(observation) => observations.push(observation),
            // Access points can vanish between listing and reading
            Err(e) => tracing::debug!(path = %ap_path.as_str(), error = %e, "Skipping access point"),
        }
    }

    tracing::debug!(count = observations.len(), "Read access points");
    Ok(observations)
}

async fn get_wifi_device_path(
    connection: &Connection,
    interface: &str,
) -> Result<OwnedObjectPath, ProviderError> {
    let nm_proxy = zbus::Proxy::new(connection, NM_DEST, NM_PATH, NM_IFACE)
        .await
        .map_err(dbus_error)?;
    let device_path: OwnedObjectPath = nm_proxy
        .call("GetDeviceByIpIface", &(interface,))
        .await
        .map_err(|e| match dbus_error(e) {
            ProviderError::Provider(msg) => ProviderError::NoInterface(format!(
                "NetworkManager does not manage '{}': {}",
                interface, msg
            )),
            other => other,
        })?;

    let device_proxy = zbus::Proxy::new(connection, NM_DEST, device_path.as_str(), NM_DEVICE_IFACE)
        .await
        .map_err(dbus_error)?;
    let device_type: u32 = device_proxy
        .get_property("DeviceType")
        .await
        .map_err(|e| dbus_error(e.into()))?;
    if device_type != NM_DEVICE_TYPE_WIFI {
        return Err(ProviderError::NoInterface(format!(
            "interface '{}' is not a WiFi device according to NetworkManager (type={})",
            interface, device_type
        )));
    }

    Ok(device_path)
}

/// Ask for a fresh scan and wait up to `settle` for `LastScan` to move.
///
/// NetworkManager rate-limits scan requests; a rejected request still leaves
/// the cached access point list readable, so errors here are not fatal.
async fn request_scan_and_wait(
    connection: &Connection,
    device_path: &OwnedObjectPath,
    settle: Duration,
) {
    let Ok(wifi_proxy) = zbus::Proxy::new(
        connection,
        NM_DEST,
        device_path.as_str(),
        NM_WIFI_DEVICE_IFACE,
    )
    .await
    else {
        return;
    };

    let last_scan_before: i64 = wifi_proxy.get_property("LastScan").await.unwrap_or(-1);

    let options = HashMap::<&str, Value>::new();
    if let Err(e) = wifi_proxy
        .call::<_, _, ()>("RequestScan", &(options,))
        .await
    {
        tracing::debug!(error = %e, "RequestScan rejected, using cached results");
    }

    let scan_deadline = std::time::Instant::now() + settle;
    while std::time::Instant::now() < scan_deadline {
        let last_scan_now: i64 = wifi_proxy.get_property("LastScan").await.unwrap_or(-1);
        if last_scan_now > last_scan_before {
            break;
        }
        tokio::time::sleep(SCAN_POLL_INTERVAL).await;
    }
}

async fn get_access_points(
    connection: &Connection,
    device_path: &OwnedObjectPath,
) -> Result<Vec<OwnedObjectPath>, ProviderError> {
    let wifi_proxy = zbus::Proxy::new(
        connection,
        NM_DEST,
        device_path.as_str(),
        NM_WIFI_DEVICE_IFACE,
    )
    .await
    .map_err(dbus_error)?;

    wifi_proxy
        .call("GetAllAccessPoints", &())
        .await
        .map_err(dbus_error)
}

async fn read_access_point(
    connection: &Connection,
    ap_path: &OwnedObjectPath,
) -> zbus::Result<RawObservation> {
    let ap_proxy = zbus::Proxy::new(connection, NM_DEST, ap_path.as_str(), NM_AP_IFACE).await?;

    let ssid: Vec<u8> = ap_proxy.get_property("Ssid").await?;
    let strength: Option<u8> = ap_proxy.get_property("Strength").await.ok();
    let flags: u32 = ap_proxy.get_property("Flags").await.unwrap_or(0);
    let wpa_flags: u32 = ap_proxy.get_property("WpaFlags").await.unwrap_or(0);
    let rsn_flags: u32 = ap_proxy.get_property("RsnFlags").await.unwrap_or(0);

    Ok(RawObservation {
        ssid,
        signal_dbm: strength.map(strength_to_dbm),
        akm: akm_codes(flags, wpa_flags, rsn_flags),
    })
}

async fn active_ssid(interface: &str) -> Result<Option<String>, ProviderError> {
    let connection = Connection::system().await.map_err(dbus_error)?;
    let device_path = get_wifi_device_path(&connection, interface).await?;

    let wifi_proxy = zbus::Proxy::new(
        &connection,
        NM_DEST,
        device_path.as_str(),
        NM_WIFI_DEVICE_IFACE,
    )
    .await
    .map_err(dbus_error)?;

    let ap_path: OwnedObjectPath = wifi_proxy
        .get_property("ActiveAccessPoint")
        .await
        .map_err(|e| dbus_error(e.into()))?;
    if ap_path.as_str() == "/" {
        return Ok(None);
    }

    let ap_proxy = zbus::Proxy::new(&connection, NM_DEST, ap_path.as_str(), NM_AP_IFACE)
        .await
        .map_err(dbus_error)?;
    let ssid: Vec<u8> = ap_proxy
        .get_property("Ssid")
        .await
        .map_err(|e| dbus_error(e.into()))?;

    if ssid.is_empty() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&ssid).into_owned()))
}

fn dbus_error(e: zbus::Error) -> ProviderError {
    let denied = match &e {
        zbus::Error::MethodError(name, _, _) => {
            let name = name.as_str();
            name == "org.freedesktop.DBus.Error.AccessDenied"
                || name == "org.freedesktop.NetworkManager.PermissionDenied"
                || name.ends_with(".NotAuthorized")
        }
        zbus::Error::FDO(fdo) => matches!(**fdo, zbus::fdo::Error::AccessDenied(_)),
        _ => false,
    };

    if denied {
        ProviderError::PermissionDenied
    } else {
        ProviderError::Provider(e.to_string())
    }
}

/// Map NetworkManager security flags to AKM codes, RSN suites first.
fn akm_codes(flags: u32, wpa_flags: u32, rsn_flags: u32) -> Vec<AkmCode> {
    let mut codes = Vec::new();

    if rsn_flags & NM_AP_SEC_KEY_MGMT_PSK != 0 {
        codes.push(AkmCode::WPA2_PSK);
    }
    if rsn_flags & NM_AP_SEC_KEY_MGMT_802_1X != 0 {
        codes.push(AkmCode::WPA2);
    }
    if rsn_flags & NM_AP_SEC_KEY_MGMT_SAE != 0 {
        codes.push(AKM_SAE);
    }
    if rsn_flags & NM_AP_SEC_KEY_MGMT_OWE != 0 {
        codes.push(AKM_OWE);
    }
    if wpa_flags & NM_AP_SEC_KEY_MGMT_PSK != 0 {
        codes.push(AkmCode::WPA_PSK);
    }
    if wpa_flags & NM_AP_SEC_KEY_MGMT_802_1X != 0 {
        codes.push(AkmCode::WPA);
    }

    if codes.is_empty() && (flags & NM_80211_AP_FLAGS_PRIVACY != 0 || wpa_flags | rsn_flags != 0) {
        // WEP or an encryption scheme without a recognizable key management suite
        codes.push(AkmCode::UNKNOWN);
    }

    codes
}

/// NetworkManager reports strength as a 0-100 percentage
fn strength_to_dbm(strength: u8) -> i32 {
    i32::from(strength.min(100)) / 2 - 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::security::{classify, SecurityLabel};
    use tempfile::tempdir;

    #[test]
    fn test_strength_to_dbm() {
        assert_eq!(strength_to_dbm(100), -50);
        assert_eq!(strength_to_dbm(70), -65);
        assert_eq!(strength_to_dbm(0), -100);
        assert_eq!(strength_to_dbm(255), -50);
    }

    #[test]
    fn test_open_network_has_no_suites() {
        assert!(akm_codes(0, 0, 0).is_empty());
    }

    #[test]
    fn test_rsn_suites_come_first() {
        let codes = akm_codes(
            NM_80211_AP_FLAGS_PRIVACY,
            NM_AP_SEC_KEY_MGMT_PSK,
            NM_AP_SEC_KEY_MGMT_PSK,
        );
        assert_eq!(codes, vec![AkmCode::WPA2_PSK, AkmCode::WPA_PSK]);
        assert_eq!(classify(codes.first().copied()), SecurityLabel::Wpa2Psk);
    }

    #[test]
    fn test_enterprise_and_wpa3() {
        assert_eq!(akm_codes(1, 0, NM_AP_SEC_KEY_MGMT_802_1X), vec![AkmCode::WPA2]);
        assert_eq!(akm_codes(1, NM_AP_SEC_KEY_MGMT_802_1X, 0), vec![AkmCode::WPA]);

        let wpa3 = akm_codes(1, 0, NM_AP_SEC_KEY_MGMT_SAE);
        assert_eq!(wpa3, vec![AKM_SAE]);
        assert_eq!(classify(wpa3.first().copied()), SecurityLabel::Other);
    }

    #[test]
    fn test_wep_is_unknown() {
        assert_eq!(akm_codes(NM_80211_AP_FLAGS_PRIVACY, 0, 0), vec![AkmCode::UNKNOWN]);
    }

    #[test]
    fn test_permission_errors_are_recognized() {
        let denied = zbus::Error::from(zbus::fdo::Error::AccessDenied("polkit".into()));
        assert_eq!(dbus_error(denied), ProviderError::PermissionDenied);

        let other = zbus::Error::Failure("socket closed".into());
        assert!(matches!(dbus_error(other), ProviderError::Provider(_)));
    }

    #[test]
    fn test_list_wireless_interfaces() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("wlan0/wireless")).unwrap();
        fs::create_dir_all(dir.path().join("wlan0/device/driver")).unwrap();
        fs::create_dir_all(dir.path().join("wlan1/wireless")).unwrap();
        fs::create_dir_all(dir.path().join("eth0")).unwrap();

        let mut interfaces = list_wireless_interfaces_in(dir.path());
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(interfaces.len(), 2);
        assert!(interfaces[0].driver_bound);
        assert!(!interfaces[1].driver_bound);
        assert_eq!(choose_auto_interface(&interfaces).unwrap(), "wlan0");
    }

    #[test]
    fn test_auto_without_driver_is_no_interface() {
        let interfaces = vec![WirelessInterface {
            name: "wlan0".into(),
            driver_bound: false,
            device_hint: "0000:02:00.0".into(),
        }];
        let err = choose_auto_interface(&interfaces).unwrap_err();
        assert!(matches!(err, ProviderError::NoInterface(msg) if msg.contains("0000:02:00.0")));
    }
}
