use std::fs;
use std::path::Path;
use std::process::Command;

use pciid_parser::Database;
use tracing::debug;

use crate::error::CollectError;
use crate::hardware::types::{NetworkInfo, NicInfo};

const SYS_CLASS_NET: &str = "/sys/class/net";

/// Entry point: collect every interface under /sys/class/net.
///
/// Virtual interfaces (loopback, bridges, veth pairs, tunnels) are kept and
/// flagged; only physical NICs have a MAC reported in the table output.
pub fn collect_network_info() -> Result<NetworkInfo, CollectError> {
    let entries =
        fs::read_dir(SYS_CLASS_NET).map_err(|e| CollectError::unreadable(SYS_CLASS_NET, e))?;

    // The PCI id database is only needed for physical NICs; load it once per snapshot
    let pci_db = match Database::read() {
        Ok(db) => Some(db),
        Err(e) => {
            debug!("PCI id database unavailable: {:?}", e);
            None
        }
    };

    let mut nics = Vec::new();
    for entry in entries.flatten() {
        let name = match entry.file_name().into_string() {
            Ok(n) => n,
            Err(_) => continue,
        };
        nics.push(collect_single_nic(name, &entry.path(), pci_db.as_ref()));
    }
    nics.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(NetworkInfo { nics })
}

fn collect_single_nic(name: String, iface_sys_path: &Path, pci_db: Option<&Database>) -> NicInfo {
    let device_path = iface_sys_path.join("device");
    let is_virtual = !device_path.exists();

    let mac_address = read_to_string_trim(iface_sys_path.join("address"));
    let mtu = read_to_u32(iface_sys_path.join("mtu"));

    // Speed can be in sysfs or via ethtool as fallback; virtual links have none
    let speed_mbps = if is_virtual {
        None
    } else {
        read_to_u32(iface_sys_path.join("speed")).or_else(|| ethtool_speed(&name))
    };

    let (vendor_name, device_name) = match pci_db {
        Some(db) if !is_virtual => read_vendor_device_info(&device_path, db),
        _ => (None, None),
    };

    NicInfo {
        mac_address,
        mtu,
        speed_mbps,
        driver: read_driver(&device_path),
        pci_address: read_pci_address(&device_path),
        vendor_name,
        device_name,
        is_virtual,
        name,
    }
}

//
// Interfaces: /sys helpers
//

fn read_to_string_trim<P: AsRef<Path>>(path: P) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read_to_u32<P: AsRef<Path>>(path: P) -> Option<u32> {
    let s = read_to_string_trim(path)?;
    s.parse::<u32>().ok()
}

/// Get driver name via /sys/class/net/<iface>/device/driver -> symlink basename.
fn read_driver(device_path: &Path) -> Option<String> {
    let link = fs::read_link(device_path.join("driver")).ok()?;
    link.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
}

/// Read PCI address from /sys/class/net/<iface>/device symlink
fn read_pci_address(device_path: &Path) -> Option<String> {
    let link_target = fs::read_link(device_path).ok()?;
    link_target
        .components()
        .filter_map(|component| component.as_os_str().to_str())
        .find(|name| is_pci_address(name))
        .map(|name| name.to_string())
}

fn is_pci_address(s: &str) -> bool {
    // PCI address format: 0000:3b:00.0 (domain:bus:device.function)
    s.len() >= 12 && s.matches(':').count() == 2 && s.contains('.')
}

/// Read vendor/device ids from sysfs and resolve them to names
fn read_vendor_device_info(device_path: &Path, db: &Database) -> (Option<String>, Option<String>) {
    let vendor_id = read_to_string_trim(device_path.join("vendor"));
    let device_id = read_to_string_trim(device_path.join("device"));

    match (vendor_id, device_id) {
        (Some(vendor), Some(device)) => match lookup_pci_ids(db, &vendor, &device) {
            Some((vendor_name, device_name)) => (Some(vendor_name), Some(device_name)),
            None => (None, None),
        },
        _ => (None, None),
    }
}

/// Look up vendor and device names using PCI database
fn lookup_pci_ids(db: &Database, vendor_hex: &str, device_hex: &str) -> Option<(String, String)> {
    let vendor_id = parse_hex_id(vendor_hex)?;
    let device_id = parse_hex_id(device_hex)?;

    let vendor = db.vendors.get(&vendor_id)?;
    let device_name = vendor
        .devices
        .get(&device_id)
        .map(|d| d.name.clone())
        .unwrap_or_else(|| format!("Unknown Device [{}]", device_hex));

    Some((vendor.name.clone(), device_name))
}

fn parse_hex_id(hex: &str) -> Option<u16> {
    u16::from_str_radix(hex.strip_prefix("0x").unwrap_or(hex), 16).ok()
}

//
// ethtool fallback
//

fn ethtool_speed(iface: &str) -> Option<u32> {
    let output = Command::new("ethtool").arg(iface).output().ok()?;
    if !output.status.success() {
        return None;
    }

    parse_ethtool_speed(&String::from_utf8_lossy(&output.stdout))
}

fn parse_ethtool_speed(text: &str) -> Option<u32> {
    for line in text.lines() {
        // Example: "Speed: 25000Mb/s"
        if let Some(rest) = line.trim().strip_prefix("Speed:") {
            let digits: String = rest.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            if let Ok(speed) = digits.parse::<u32>() {
                return Some(speed);
            }
        }
    }
    None
}
