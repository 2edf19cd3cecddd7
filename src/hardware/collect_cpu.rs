use std::collections::{BTreeMap, BTreeSet};

use procfs::Current;
use sysinfo::{CpuRefreshKind, RefreshKind, System};
use tracing::debug;

use crate::error::CollectError;
use crate::hardware::types::{CpuInfo, Processor};

/// One logical CPU entry as listed in /proc/cpuinfo.
#[derive(Debug, Clone, Default)]
struct LogicalCpu {
    physical_id: u32,
    core_id: Option<u32>,
    vendor: Option<String>,
    model: Option<String>,
}

pub fn collect_cpu_info() -> Result<CpuInfo, CollectError> {
    match procfs::CpuInfo::current() {
        Ok(info) => {
            let logical = logical_cpus_from_procfs(&info);
            if !logical.is_empty() {
                return Ok(group_by_package(&logical));
            }
            debug!("/proc/cpuinfo lists no processors, falling back to sysinfo");
        }
        Err(e) => debug!("unable to read /proc/cpuinfo ({}), falling back to sysinfo", e),
    }

    collect_with_sysinfo()
}

fn logical_cpus_from_procfs(info: &procfs::CpuInfo) -> Vec<LogicalCpu> {
    (0..info.num_cores())
        .map(|cpu| LogicalCpu {
            physical_id: parse_field(info.get_field(cpu, "physical id")).unwrap_or(0),
            core_id: parse_field(info.get_field(cpu, "core id")),
            vendor: non_empty(info.get_field(cpu, "vendor_id")),
            // ARM kernels report "Processor" or nothing instead of "model name"
            model: non_empty(info.get_field(cpu, "model name"))
                .or_else(|| non_empty(info.get_field(cpu, "Processor"))),
        })
        .collect()
}

fn parse_field(value: Option<&str>) -> Option<u32> {
    value?.trim().parse::<u32>().ok()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Fold logical CPUs into physical packages.
///
/// Cores are the distinct `core id` values inside a package; when the kernel
/// does not expose core ids every logical CPU counts as its own core.
fn group_by_package(logical: &[LogicalCpu]) -> CpuInfo {
    let mut packages: BTreeMap<u32, Vec<&LogicalCpu>> = BTreeMap::new();
    for cpu in logical {
        packages.entry(cpu.physical_id).or_default().push(cpu);
    }

    let processors: Vec<Processor> = packages
        .into_iter()
        .map(|(id, threads)| {
            let core_ids: BTreeSet<u32> = threads.iter().filter_map(|t| t.core_id).collect();
            let num_cores = if core_ids.is_empty() {
                threads.len() as u32
            } else {
                core_ids.len() as u32
            };
            Processor {
                id,
                vendor: threads.iter().find_map(|t| t.vendor.clone()),
                model: threads.iter().find_map(|t| t.model.clone()),
                num_cores,
                num_threads: threads.len() as u32,
            }
        })
        .collect();

    CpuInfo {
        total_cores: processors.iter().map(|p| p.num_cores).sum(),
        total_threads: processors.iter().map(|p| p.num_threads).sum(),
        processors,
    }
}

fn collect_with_sysinfo() -> Result<CpuInfo, CollectError> {
    let sys = System::new_with_specifics(RefreshKind::new().with_cpu(CpuRefreshKind::new()));
    let cpus = sys.cpus();
    let first = cpus.first().ok_or(CollectError::Unavailable("cpu"))?;

    let threads = cpus.len() as u32;
    let cores = sys
        .physical_core_count()
        .map(|c| c as u32)
        .unwrap_or(threads);

    let processor = Processor {
        id: 0,
        vendor: Some(first.vendor_id().to_string()).filter(|s| !s.is_empty()),
        model: Some(first.brand().trim().to_string()).filter(|s| !s.is_empty()),
        num_cores: cores,
        num_threads: threads,
    };

    Ok(CpuInfo {
        total_cores: cores,
        total_threads: threads,
        processors: vec![processor],
    })
}
