use std::fmt::Display;

use crate::hardware::types::{
    BlockInfo, CategoryResult, CpuInfo, HardwareSnapshot, MemoryInfo, NetworkInfo,
};

pub const HEADER: [&str; 4] = ["TYPE", "ID", "DESCRIPTION", "VALUE"];

const UNKNOWN: &str = "unknown";

/// One TYPE / ID / DESCRIPTION / VALUE line of the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub kind: &'static str,
    pub id: String,
    pub description: &'static str,
    pub value: String,
}

impl Row {
    fn new(
        kind: &'static str,
        id: impl Into<String>,
        description: &'static str,
        value: impl Display,
    ) -> Self {
        Row {
            kind,
            id: id.into(),
            description,
            value: value.to_string(),
        }
    }

    pub fn cells(&self) -> [&str; 4] {
        [self.kind, &self.id, self.description, &self.value]
    }
}

/// Flatten a snapshot into rows: MEMORY, CPU, STORAGE, NETWORK in that order.
///
/// A failed category contributes a single ERROR row and leaves the others
/// untouched.
pub fn build_rows(snapshot: &HardwareSnapshot) -> Vec<Row> {
    let mut rows = Vec::new();
    category_rows(&mut rows, "MEMORY", &snapshot.memory, memory_rows);
    category_rows(&mut rows, "CPU", &snapshot.cpu, cpu_rows);
    category_rows(&mut rows, "STORAGE", &snapshot.storage, storage_rows);
    category_rows(&mut rows, "NETWORK", &snapshot.network, network_rows);
    rows
}

fn category_rows<T: Display>(
    rows: &mut Vec<Row>,
    kind: &'static str,
    result: &CategoryResult<T>,
    details: fn(&mut Vec<Row>, &T),
) {
    match result {
        Ok(info) => {
            rows.push(Row::new(kind, "", "INFO", info));
            details(rows, info);
        }
        Err(e) => rows.push(Row::new(kind, "", "ERROR", e)),
    }
}

fn memory_rows(rows: &mut Vec<Row>, memory: &MemoryInfo) {
    let page_sizes: Vec<String> = memory
        .supported_page_sizes
        .iter()
        .map(|s| s.to_string())
        .collect();

    rows.push(Row::new("MEMORY", "", "PHYSICAL_BYTES", memory.total_physical_bytes));
    rows.push(Row::new("MEMORY", "", "USABLE_BYTES", memory.total_usable_bytes));
    let page_sizes = format!("[{}]", page_sizes.join(" "));
    rows.push(Row::new("MEMORY", "", "SUPPORTED_PAGE_SIZES", page_sizes));
}

fn cpu_rows(rows: &mut Vec<Row>, cpu: &CpuInfo) {
    rows.push(Row::new("CPU", "", "TOTAL_CORES", cpu.total_cores));
    rows.push(Row::new("CPU", "", "TOTAL_THREADS", cpu.total_threads));

    for (index, proc) in cpu.processors.iter().enumerate() {
        let id = format!("CPU[{}]", index);
        rows.push(Row::new("CPU", id.clone(), "VENDOR", or_unknown(&proc.vendor)));
        rows.push(Row::new("CPU", id.clone(), "MODEL", or_unknown(&proc.model)));
        rows.push(Row::new("CPU", id, "THREADS", proc.num_threads));
    }
}

fn storage_rows(rows: &mut Vec<Row>, block: &BlockInfo) {
    for (index, disk) in block.disks.iter().enumerate() {
        let id = format!("DISK[{}]", index);
        let disk_row =
            |description, value: String| Row::new("STORAGE", id.clone(), description, value);

        rows.push(disk_row("VENDOR", or_unknown(&disk.vendor)));
        rows.push(disk_row("MODEL", or_unknown(&disk.model)));
        rows.push(disk_row("NAME", disk.name.clone()));
        rows.push(disk_row("SERIAL", or_unknown(&disk.serial)));
        rows.push(disk_row("WWN", or_unknown(&disk.wwn)));
        rows.push(disk_row("STORAGE_CONTROLLER", disk.storage_controller.to_string()));
        rows.push(disk_row("SIZE_BYTES", or_unknown(&disk.size_bytes)));
        let block_size = or_unknown(&disk.physical_block_size_bytes);
        rows.push(disk_row("PHYSICAL_BLOCK_SIZE_BYTES", block_size));
        rows.push(disk_row("NUMA_NODE_ID", or_unknown(&disk.numa_node_id)));
        rows.push(disk_row("DRIVE_TYPE", disk.drive_type.to_string()));
        rows.push(disk_row("BUS_TYPE", or_unknown(&disk.bus_type)));
        rows.push(disk_row("BUS_PATH", or_unknown(&disk.bus_path)));
    }
}

fn network_rows(rows: &mut Vec<Row>, net: &NetworkInfo) {
    for (index, nic) in net.nics.iter().enumerate() {
        let id = format!("INTERFACE[{}]", index);
        rows.push(Row::new("NETWORK", id.clone(), "NAME", &nic.name));
        rows.push(Row::new("NETWORK", id.clone(), "IS_VIRTUAL", nic.is_virtual));
        if !nic.is_virtual {
            rows.push(Row::new("NETWORK", id, "MAC", or_unknown(&nic.mac_address)));
        }
    }
}

fn or_unknown<T: Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => UNKNOWN.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectError;
    use crate::hardware::fixtures;

    fn rows_of<'a>(rows: &'a [Row], kind: &str) -> Vec<&'a Row> {
        rows.iter().filter(|r| r.kind == kind).collect()
    }

    #[test]
    fn test_categories_in_fixed_order() {
        let rows = build_rows(&fixtures::complete_snapshot());
        let infos: Vec<&str> = rows
            .iter()
            .filter(|r| r.description == "INFO")
            .map(|r| r.kind)
            .collect();
        assert_eq!(infos, vec!["MEMORY", "CPU", "STORAGE", "NETWORK"]);
    }

    #[test]
    fn test_memory_rows() {
        let rows = build_rows(&fixtures::complete_snapshot());
        let memory = rows_of(&rows, "MEMORY");

        assert_eq!(memory.len(), 4);
        assert_eq!(memory[0].value, "memory (16GB physical, 15GB usable)");
        assert_eq!(memory[1].value, "17179869184");
        assert_eq!(memory[3].description, "SUPPORTED_PAGE_SIZES");
        assert_eq!(memory[3].value, "[4096 2097152]");
    }

    #[test]
    fn test_cpu_rows_indexed_per_processor() {
        let rows = build_rows(&fixtures::complete_snapshot());
        let cpu = rows_of(&rows, "CPU");

        assert_eq!(cpu.len(), 6);
        assert_eq!(cpu[1].description, "TOTAL_CORES");
        assert_eq!(cpu[1].value, "4");
        assert_eq!(cpu[3].id, "CPU[0]");
        assert_eq!(cpu[3].description, "VENDOR");
        assert_eq!(cpu[5].description, "THREADS");
        assert_eq!(cpu[5].value, "8");
    }

    #[test]
    fn test_disk_rows_report_unknown_for_missing_values() {
        let rows = build_rows(&fixtures::complete_snapshot());
        let storage = rows_of(&rows, "STORAGE");

        // INFO + 12 per disk
        assert_eq!(storage.len(), 13);
        let vendor = storage.iter().find(|r| r.description == "VENDOR").unwrap();
        assert_eq!(vendor.value, "unknown");
        let controller = storage
            .iter()
            .find(|r| r.description == "STORAGE_CONTROLLER")
            .unwrap();
        assert_eq!(controller.value, "NVMe");
    }

    #[test]
    fn test_mac_only_for_physical_interfaces() {
        let rows = build_rows(&fixtures::complete_snapshot());
        let macs: Vec<&Row> = rows.iter().filter(|r| r.description == "MAC").collect();

        assert_eq!(macs.len(), 1);
        assert_eq!(macs[0].id, "INTERFACE[0]");
        assert_eq!(macs[0].value, "8c:16:45:12:34:56");

        let virtual_flag = rows
            .iter()
            .find(|r| r.id == "INTERFACE[1]" && r.description == "IS_VIRTUAL")
            .unwrap();
        assert_eq!(virtual_flag.value, "true");
    }

    #[test]
    fn test_failed_category_is_single_error_row() {
        let rows = build_rows(&fixtures::snapshot_without_storage());
        let storage = rows_of(&rows, "STORAGE");

        assert_eq!(storage.len(), 1);
        assert_eq!(storage[0].description, "ERROR");
        assert!(storage[0].value.contains("/sys/block"));

        // Other categories are still fully rendered
        assert_eq!(rows_of(&rows, "MEMORY").len(), 4);
        assert_eq!(rows_of(&rows, "CPU").len(), 6);
        assert_eq!(rows_of(&rows, "NETWORK").len(), 6);
    }

    #[test]
    fn test_every_category_can_fail_independently() {
        let mut snapshot = fixtures::complete_snapshot();
        snapshot.cpu = Err(CollectError::Unavailable("cpu"));
        snapshot.network = Err(CollectError::Unavailable("network"));

        let rows = build_rows(&snapshot);
        let errors: Vec<&str> = rows
            .iter()
            .filter(|r| r.description == "ERROR")
            .map(|r| r.kind)
            .collect();
        assert_eq!(errors, vec!["CPU", "NETWORK"]);
        assert_eq!(rows_of(&rows, "STORAGE").len(), 13);
    }
}
