//! Fixed snapshots shared by renderer and cycle tests.

use chrono::{TimeZone, Utc};

use crate::error::CollectError;
use crate::hardware::types::*;

pub fn cpu() -> CpuInfo {
    CpuInfo {
        total_cores: 4,
        total_threads: 8,
        processors: vec![Processor {
            id: 0,
            vendor: Some("GenuineIntel".to_string()),
            model: Some("Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz".to_string()),
            num_cores: 4,
            num_threads: 8,
        }],
    }
}

pub fn memory() -> MemoryInfo {
    MemoryInfo {
        total_physical_bytes: 16 * 1024 * 1024 * 1024,
        total_usable_bytes: 16_456_000_000,
        supported_page_sizes: vec![4096, 2 * 1024 * 1024],
        modules: Vec::new(),
    }
}

pub fn storage() -> BlockInfo {
    BlockInfo {
        total_size_bytes: 512_110_190_592,
        disks: vec![DiskInfo {
            name: "nvme0n1".to_string(),
            vendor: None,
            model: Some("Samsung SSD 970 EVO Plus 500GB".to_string()),
            serial: Some("S4EVNF0M123456".to_string()),
            wwn: Some("eui.0025385a91b0a1b2".to_string()),
            storage_controller: StorageController::Nvme,
            size_bytes: Some(512_110_190_592),
            physical_block_size_bytes: Some(512),
            numa_node_id: None,
            drive_type: DriveType::Ssd,
            bus_type: Some("nvme".to_string()),
            bus_path: Some("pci-0000:3d:00.0-nvme-1".to_string()),
        }],
    }
}

pub fn network() -> NetworkInfo {
    NetworkInfo {
        nics: vec![
            NicInfo {
                name: "enp0s31f6".to_string(),
                is_virtual: false,
                mac_address: Some("8c:16:45:12:34:56".to_string()),
                mtu: Some(1500),
                speed_mbps: Some(1000),
                driver: Some("e1000e".to_string()),
                pci_address: Some("0000:00:1f.6".to_string()),
                vendor_name: Some("Intel Corporation".to_string()),
                device_name: Some("Ethernet Connection (4) I219-V".to_string()),
            },
            NicInfo {
                name: "lo".to_string(),
                is_virtual: true,
                mac_address: Some("00:00:00:00:00:00".to_string()),
                mtu: Some(65536),
                speed_mbps: None,
                driver: None,
                pci_address: None,
                vendor_name: None,
                device_name: None,
            },
        ],
    }
}

/// Every category collected successfully.
pub fn complete_snapshot() -> HardwareSnapshot {
    HardwareSnapshot {
        collected_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        cpu: Ok(cpu()),
        memory: Ok(memory()),
        storage: Ok(storage()),
        network: Ok(network()),
    }
}

/// Storage collection failed; the other categories are intact.
pub fn snapshot_without_storage() -> HardwareSnapshot {
    HardwareSnapshot {
        storage: Err(CollectError::Unreadable {
            path: "/sys/block".to_string(),
            reason: "Permission denied (os error 13)".to_string(),
        }),
        ..complete_snapshot()
    }
}
