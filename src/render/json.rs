use serde::Serialize;

use crate::error::AppError;
use crate::hardware::types::{
    BlockInfo, CategoryResult, CpuInfo, HardwareSnapshot, MemoryInfo, NetworkInfo,
};

/// A category serialises as its collected value, or as `{"error": "..."}`.
#[derive(Serialize)]
#[serde(untagged)]
enum Section<'a, T> {
    Collected(&'a T),
    Failed { error: String },
}

impl<'a, T> From<&'a CategoryResult<T>> for Section<'a, T> {
    fn from(result: &'a CategoryResult<T>) -> Self {
        match result {
            Ok(info) => Section::Collected(info),
            Err(e) => Section::Failed {
                error: e.to_string(),
            },
        }
    }
}

#[derive(Serialize)]
struct InventoryDocument<'a> {
    cpu: Section<'a, CpuInfo>,
    memory: Section<'a, MemoryInfo>,
    disk: Section<'a, BlockInfo>,
    network: Section<'a, NetworkInfo>,
}

pub fn render_json(snapshot: &HardwareSnapshot) -> Result<String, AppError> {
    let document = InventoryDocument {
        cpu: Section::from(&snapshot.cpu),
        memory: Section::from(&snapshot.memory),
        disk: Section::from(&snapshot.storage),
        network: Section::from(&snapshot.network),
    };
    Ok(serde_json::to_string(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::fixtures;
    use serde_json::Value;

    fn parse(snapshot: &HardwareSnapshot) -> serde_json::Map<String, Value> {
        let json = render_json(snapshot).unwrap();
        match serde_json::from_str::<Value>(&json).unwrap() {
            Value::Object(map) => map,
            other => panic!("expected a JSON object, got {}", other),
        }
    }

    #[test]
    fn test_exactly_four_top_level_keys() {
        let map = parse(&fixtures::complete_snapshot());
        let mut keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["cpu", "disk", "memory", "network"]);
    }

    #[test]
    fn test_collected_sections_use_native_serialization() {
        let map = parse(&fixtures::complete_snapshot());
        assert_eq!(map["cpu"]["total_threads"], 8);
        assert_eq!(map["disk"]["disks"][0]["drive_type"], "SSD");
        assert_eq!(map["network"]["nics"][1]["is_virtual"], true);
        assert_eq!(map["memory"]["supported_page_sizes"][0], 4096);
    }

    #[test]
    fn test_failed_section_is_error_shaped() {
        let map = parse(&fixtures::snapshot_without_storage());
        assert_eq!(map.len(), 4);
        let error = map["disk"]["error"].as_str().unwrap();
        assert!(error.contains("Permission denied"));
        assert!(map["cpu"].get("error").is_none());
    }
}
