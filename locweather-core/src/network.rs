//! Connectivity check performed right before the weather request.

use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Wifi,
    Cellular,
    Ethernet,
    Bluetooth,
    Vpn,
    Other,
}

impl Transport {
    /// Transports that count as a usable network.
    pub fn is_recognized(&self) -> bool {
        matches!(self, Transport::Wifi | Transport::Cellular | Transport::Ethernet)
    }
}

/// Source of the platform's active network state.
pub trait ConnectivityProbe: Send + Sync + Debug {
    /// Transports of the active network, or `None` when there is no active
    /// network or the platform cannot tell.
    fn active_transports(&self) -> Option<Vec<Transport>>;
}

pub fn is_network_available(probe: &dyn ConnectivityProbe) -> bool {
    probe
        .active_transports()
        .is_some_and(|transports| transports.iter().any(Transport::is_recognized))
}

/// Reads interface state from `/sys/class/net`.
#[derive(Debug, Clone, Default)]
pub struct SystemConnectivity;

impl ConnectivityProbe for SystemConnectivity {
    #[cfg(target_os = "linux")]
    fn active_transports(&self) -> Option<Vec<Transport>> {
        let entries = std::fs::read_dir("/sys/class/net").ok()?;

        let transports: Vec<Transport> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name == "lo" {
                    return None;
                }

                let operstate = std::fs::read_to_string(entry.path().join("operstate")).ok()?;
                if operstate.trim() != "up" {
                    return None;
                }

                Some(classify_interface(&name, entry.path().join("wireless").exists()))
            })
            .collect();

        if transports.is_empty() { None } else { Some(transports) }
    }

    #[cfg(not(target_os = "linux"))]
    fn active_transports(&self) -> Option<Vec<Transport>> {
        None
    }
}

/// Treats the machine as wired and online.
#[derive(Debug, Clone, Default)]
pub struct AssumeOnline;

impl ConnectivityProbe for AssumeOnline {
    fn active_transports(&self) -> Option<Vec<Transport>> {
        Some(vec![Transport::Ethernet])
    }
}

#[derive(Debug, Clone, Default)]
pub struct Offline;

impl ConnectivityProbe for Offline {
    fn active_transports(&self) -> Option<Vec<Transport>> {
        None
    }
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn classify_interface(name: &str, has_wireless_dir: bool) -> Transport {
    if has_wireless_dir || name.starts_with("wl") {
        Transport::Wifi
    } else if name.starts_with("ww") {
        Transport::Cellular
    } else if name.starts_with("tun") || name.starts_with("wg") {
        Transport::Vpn
    } else if name.starts_with("bnep") {
        Transport::Bluetooth
    } else if name.starts_with("en") || name.starts_with("eth") {
        Transport::Ethernet
    } else {
        Transport::Other
    }
}
