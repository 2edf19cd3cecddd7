use std::fs;
use std::path::Path;

use smbioslib::*;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use crate::error::CollectError;
use crate::hardware::types::{DimmInfo, MemoryInfo};

const DMI_TABLE: &str = "/sys/firmware/dmi/tables/DMI";
const HUGEPAGES_DIR: &str = "/sys/kernel/mm/hugepages";

pub fn collect_memory_info() -> Result<MemoryInfo, CollectError> {
    let sys = System::new_with_specifics(
        RefreshKind::new().with_memory(MemoryRefreshKind::everything()),
    );
    let total_usable_bytes = sys.total_memory();
    if total_usable_bytes == 0 {
        return Err(CollectError::Unavailable("memory"));
    }

    // DIMM sizes need DMI access (usually root); usable RAM is the fallback
    let modules = collect_memory_with_smbios();
    let installed: u64 = modules.iter().filter_map(|d| d.size_bytes).sum();
    let total_physical_bytes = if installed > 0 { installed } else { total_usable_bytes };

    Ok(MemoryInfo {
        total_physical_bytes,
        total_usable_bytes,
        supported_page_sizes: supported_page_sizes(),
        modules,
    })
}

/// Base page size plus every huge page size the kernel offers.
fn supported_page_sizes() -> Vec<u64> {
    let mut sizes = vec![procfs::page_size()];

    if let Ok(entries) = fs::read_dir(Path::new(HUGEPAGES_DIR)) {
        for entry in entries.flatten() {
            if let Some(size) = entry.file_name().to_str().and_then(parse_hugepage_dir) {
                sizes.push(size);
            }
        }
    }

    sizes.sort_unstable();
    sizes.dedup();
    sizes
}

/// "hugepages-2048kB" -> 2097152
fn parse_hugepage_dir(name: &str) -> Option<u64> {
    let kb = name.strip_prefix("hugepages-")?.strip_suffix("kB")?;
    kb.parse::<u64>().ok().map(|kb| kb * 1024)
}

fn collect_memory_with_smbios() -> Vec<DimmInfo> {
    // Try to load SMBIOS data from the system
    let smbios_data = match SMBiosData::try_load_from_file(DMI_TABLE, None) {
        Ok(data) => data,
        Err(_) => match fs::read(DMI_TABLE) {
            Ok(table_data) => SMBiosData::from_vec_and_version(table_data, None),
            Err(_) => return Vec::new(),
        },
    };

    smbios_data
        .iter()
        .filter_map(|structure| match structure.defined_struct() {
            DefinedStruct::MemoryDevice(device) => dimm_from_device(&device),
            _ => None,
        })
        .collect()
}

/// Empty slots report no size and are skipped.
fn dimm_from_device(device: &SMBiosMemoryDevice) -> Option<DimmInfo> {
    let size_bytes = match device.size()? {
        MemorySize::Kilobytes(kb) if kb > 0 => kb as u64 * 1024,
        MemorySize::Megabytes(mb) if mb > 0 => mb as u64 * 1024 * 1024,
        MemorySize::SeeExtendedSize => match device.extended_size()? {
            MemorySizeExtended::Megabytes(mb) if mb > 0 => mb as u64 * 1024 * 1024,
            _ => return None,
        },
        _ => return None,
    };

    let mem_type = device
        .memory_type()
        .map(|t| format!("{:?}", t.value).to_uppercase())
        .filter(|t| t != "UNKNOWN");

    // Configured speed first, rated speed otherwise
    let speed_mt_s = match device.configured_memory_speed() {
        Some(MemorySpeed::MTs(mts)) if mts > 0 => Some(mts as u32),
        _ => match device.speed() {
            Some(MemorySpeed::MTs(mts)) if mts > 0 => Some(mts as u32),
            _ => None,
        },
    };

    Some(DimmInfo {
        slot: smbios_text(device.device_locator()),
        size_bytes: Some(size_bytes),
        mem_type,
        speed_mt_s,
        manufacturer: smbios_text(device.manufacturer()),
        serial_number: smbios_text(device.serial_number()),
        part_number: smbios_text(device.part_number()),
    })
}

fn smbios_text(value: SMBiosString) -> Option<String> {
    value
        .to_utf8_lossy()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "Not Specified")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hugepage_dir() {
        assert_eq!(parse_hugepage_dir("hugepages-2048kB"), Some(2 * 1024 * 1024));
        assert_eq!(
            parse_hugepage_dir("hugepages-1048576kB"),
            Some(1024 * 1024 * 1024)
        );
        assert_eq!(parse_hugepage_dir("hugepages-xkB"), None);
        assert_eq!(parse_hugepage_dir("transparent_hugepage"), None);
    }

    #[test]
    fn test_supported_page_sizes_sorted_and_include_base_page() {
        let sizes = supported_page_sizes();
        assert!(sizes.contains(&procfs::page_size()));
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
    }
}
