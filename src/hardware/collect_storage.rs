use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::CollectError;
use crate::hardware::types::{BlockInfo, DiskInfo, DriveType, StorageController};

const SYS_BLOCK: &str = "/sys/block";

/// Entry point: collect all block devices on this machine.
pub fn collect_block_info() -> Result<BlockInfo, CollectError> {
    let entries =
        fs::read_dir(SYS_BLOCK).map_err(|e| CollectError::unreadable(SYS_BLOCK, e))?;

    let mut disks = Vec::new();
    for entry in entries.flatten() {
        let name = match entry.file_name().into_string() {
            Ok(n) => n,
            Err(_) => continue,
        };

        if is_virtual_block_device(&name) {
            continue;
        }

        disks.push(collect_single_disk(&name, &entry.path()));
    }
    disks.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(BlockInfo {
        total_size_bytes: disks.iter().filter_map(|d| d.size_bytes).sum(),
        disks,
    })
}

fn is_virtual_block_device(name: &str) -> bool {
    name.starts_with("loop")
        || name.starts_with("ram")
        || name.starts_with("dm-")
        || name.starts_with("zram")
}

/// Collect detailed info for a single disk.
fn collect_single_disk(name: &str, sys_path: &Path) -> DiskInfo {
    let device_path = sys_path.join("device");
    let dev_path = format!("/dev/{}", name);

    let vendor = read_to_string_trim(device_path.join("vendor"));
    let model = read_to_string_trim(device_path.join("model"));

    // Serial:
    //  - For SCSI-like devices: /sys/block/<dev>/device/serial
    //  - For NVMe: /sys/class/nvme/<ctrl>/serial
    let mut serial = read_to_string_trim(device_path.join("serial"));
    if serial.is_none() && name.starts_with("nvme") {
        let nvme_ctrl_path = PathBuf::from("/sys/class/nvme").join(nvme_controller(name));
        serial = read_to_string_trim(nvme_ctrl_path.join("serial"));
    }

    let wwn = read_to_string_trim(device_path.join("wwid"))
        .or_else(|| read_to_string_trim(sys_path.join("wwid")))
        .or_else(|| read_udev_property(&dev_path, "ID_WWN"));

    // Capacity is reported in 512-byte sectors regardless of the logical block size
    let size_bytes = read_to_u64(sys_path.join("size")).map(|s| s * 512);
    let physical_block_size_bytes = read_to_u64(sys_path.join("queue/physical_block_size"));

    // -1 means the kernel has no NUMA affinity for the device
    let numa_node_id = read_to_string_trim(device_path.join("numa_node"))
        .and_then(|s| s.parse::<i32>().ok())
        .filter(|n| *n >= 0);

    // Rotational: 1 = HDD, 0 = SSD/NVMe
    let rotational = read_to_u64(sys_path.join("queue/rotational")).map(|v| v == 1);

    let bus_type = if name.starts_with("nvme") {
        Some("nvme".to_string())
    } else {
        detect_bus_type(&device_path).or_else(|| read_udev_property(&dev_path, "ID_BUS"))
    };

    if serial.is_none() {
        serial = get_serial_from_smartctl(&dev_path, bus_type.as_deref());
    }

    DiskInfo {
        name: name.to_string(),
        vendor,
        model,
        serial,
        wwn,
        storage_controller: storage_controller_for(name),
        size_bytes,
        physical_block_size_bytes,
        numa_node_id,
        drive_type: drive_type_for(name, rotational),
        bus_type,
        bus_path: read_udev_property(&dev_path, "ID_PATH"),
    }
}

/// NVMe namespace "nvme0n1" -> controller "nvme0".
fn nvme_controller(name: &str) -> &str {
    match name.rfind('n') {
        Some(idx) if idx > "nvme".len() => &name[..idx],
        _ => name,
    }
}

fn storage_controller_for(name: &str) -> StorageController {
    if name.starts_with("nvme") {
        StorageController::Nvme
    } else if name.starts_with("sd") || name.starts_with("sr") {
        StorageController::Scsi
    } else if name.starts_with("hd") {
        StorageController::Ide
    } else if name.starts_with("vd") || name.starts_with("xvd") {
        StorageController::Virtio
    } else if name.starts_with("mmcblk") {
        StorageController::Mmc
    } else {
        StorageController::Unknown
    }
}

fn drive_type_for(name: &str, rotational: Option<bool>) -> DriveType {
    if name.starts_with("sr") {
        return DriveType::Odd;
    }
    if name.starts_with("fd") {
        return DriveType::Fdd;
    }
    match rotational {
        Some(true) => DriveType::Hdd,
        Some(false) => DriveType::Ssd,
        None => DriveType::Unknown,
    }
}

//
// Helper functions
//

fn read_to_string_trim<P: AsRef<Path>>(path: P) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn read_to_u64<P: AsRef<Path>>(path: P) -> Option<u64> {
    let s = read_to_string_trim(path)?;
    s.parse::<u64>().ok()
}

/// Get serial number from `smartctl -i`. Requires smartmontools, might require root.
fn get_serial_from_smartctl(dev_path: &str, bus_type: Option<&str>) -> Option<String> {
    let mut args = vec!["-i"]; // info flag

    if let Some("nvme") = bus_type {
        args.extend_from_slice(&["-d", "nvme"]);
    }
    args.push(dev_path);

    let output = Command::new("smartctl").args(&args).output().ok()?;
    if !output.status.success() {
        return None;
    }

    parse_smartctl_serial(&String::from_utf8_lossy(&output.stdout))
}

fn parse_smartctl_serial(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with("Serial Number:") || line.starts_with("Serial number:"))
        .filter_map(|line| line.split_once(':').map(|(_, v)| v.trim().to_string()))
        .find(|serial| !serial.is_empty())
}

/// Try to detect bus type from the sysfs "subsystem" symlink, e.g. .../scsi, .../virtio
fn detect_bus_type(device_path: &Path) -> Option<String> {
    let link = fs::read_link(device_path.join("subsystem")).ok()?;
    link.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
}

/// Read a udev property for a device node, e.g. /dev/sda.
fn read_udev_property(dev_path: &str, key: &str) -> Option<String> {
    let output = Command::new("udevadm")
        .args(["info", "--query=property", "--name", dev_path])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    parse_udev_property(&String::from_utf8_lossy(&output.stdout), key)
}

fn parse_udev_property(text: &str, key: &str) -> Option<String> {
    text.lines()
        .filter_map(|line| line.strip_prefix(key)?.strip_prefix('='))
        .map(|val| val.trim().to_string())
        .find(|val| !val.is_empty())
}
