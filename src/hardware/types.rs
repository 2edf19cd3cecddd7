use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CollectError;

pub type CategoryResult<T> = Result<T, CollectError>;

/// One point-in-time capture of the four hardware categories.
#[derive(Debug, Clone)]
pub struct HardwareSnapshot {
    pub collected_at: DateTime<Utc>,
    pub cpu: CategoryResult<CpuInfo>,
    pub memory: CategoryResult<MemoryInfo>,
    pub storage: CategoryResult<BlockInfo>,
    pub network: CategoryResult<NetworkInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuInfo {
    pub total_cores: u32,
    pub total_threads: u32,
    pub processors: Vec<Processor>,
}

/// One physical package (socket).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Processor {
    pub id: u32,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub num_cores: u32,
    pub num_threads: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryInfo {
    pub total_physical_bytes: u64,
    pub total_usable_bytes: u64,
    pub supported_page_sizes: Vec<u64>,
    pub modules: Vec<DimmInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimmInfo {
    pub slot: Option<String>,
    pub size_bytes: Option<u64>,
    pub mem_type: Option<String>,
    pub speed_mt_s: Option<u32>,
    pub manufacturer: Option<String>,
    pub serial_number: Option<String>,
    pub part_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockInfo {
    pub total_size_bytes: u64,
    pub disks: Vec<DiskInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskInfo {
    pub name: String,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub wwn: Option<String>,
    pub storage_controller: StorageController,
    pub size_bytes: Option<u64>,
    pub physical_block_size_bytes: Option<u64>,
    pub numa_node_id: Option<i32>,
    pub drive_type: DriveType,
    pub bus_type: Option<String>, // "nvme", "scsi", "virtio", etc.
    pub bus_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DriveType {
    Hdd,
    Ssd,
    Odd,
    Fdd,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorageController {
    #[serde(rename = "NVMe")]
    Nvme,
    #[serde(rename = "SCSI")]
    Scsi,
    #[serde(rename = "IDE")]
    Ide,
    #[serde(rename = "virtio")]
    Virtio,
    #[serde(rename = "MMC")]
    Mmc,
    #[serde(rename = "unknown")]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInfo {
    pub nics: Vec<NicInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NicInfo {
    pub name: String,
    pub is_virtual: bool,
    pub mac_address: Option<String>,
    pub mtu: Option<u32>,
    pub speed_mbps: Option<u32>,
    pub driver: Option<String>,
    pub pci_address: Option<String>,
    pub vendor_name: Option<String>,
    pub device_name: Option<String>,
}

impl fmt::Display for DriveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DriveType::Hdd => "HDD",
            DriveType::Ssd => "SSD",
            DriveType::Odd => "ODD",
            DriveType::Fdd => "FDD",
            DriveType::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

impl fmt::Display for StorageController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StorageController::Nvme => "NVMe",
            StorageController::Scsi => "SCSI",
            StorageController::Ide => "IDE",
            StorageController::Virtio => "virtio",
            StorageController::Mmc => "MMC",
            StorageController::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

impl fmt::Display for CpuInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let packages = self.processors.len();
        write!(
            f,
            "cpu ({} physical package{}, {} cores, {} hardware threads)",
            packages,
            if packages == 1 { "" } else { "s" },
            self.total_cores,
            self.total_threads
        )
    }
}

impl fmt::Display for MemoryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "memory ({} physical, {} usable)",
            human_bytes(self.total_physical_bytes),
            human_bytes(self.total_usable_bytes)
        )
    }
}

impl fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let disks = self.disks.len();
        write!(
            f,
            "block storage ({} disk{}, {} physical storage)",
            disks,
            if disks == 1 { "" } else { "s" },
            human_bytes(self.total_size_bytes)
        )
    }
}

impl fmt::Display for NetworkInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "net ({} NICs)", self.nics.len())
    }
}

/// Whole binary units, rounded down: 17179869184 -> "16GB".
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024 && unit < UNITS.len() - 1 {
        value /= 1024;
        unit += 1;
    }
    format!("{}{}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(0), "0B");
        assert_eq!(human_bytes(1023), "1023B");
        assert_eq!(human_bytes(16 * 1024 * 1024 * 1024), "16GB");
        assert_eq!(human_bytes(16_500_000_000), "15GB");
    }

    #[test]
    fn test_cpu_summary_pluralises_packages() {
        let cpu = CpuInfo {
            total_cores: 8,
            total_threads: 16,
            processors: vec![Processor {
                id: 0,
                vendor: None,
                model: None,
                num_cores: 8,
                num_threads: 16,
            }],
        };
        assert_eq!(
            cpu.to_string(),
            "cpu (1 physical package, 8 cores, 16 hardware threads)"
        );
    }

    #[test]
    fn test_drive_type_serializes_uppercase() {
        let json = serde_json::to_string(&DriveType::Ssd).unwrap();
        assert_eq!(json, "\"SSD\"");
        assert_eq!(
            serde_json::to_string(&StorageController::Nvme).unwrap(),
            "\"NVMe\""
        );
    }
}
