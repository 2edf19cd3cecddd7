// Hardware inventory collection modules
pub mod types;
pub mod collect_memory;
pub mod collect_cpu;
pub mod collect_network;
pub mod collect_storage;
pub mod collector;

#[cfg(test)]
pub mod fixtures;

// Re-export main collection functions
pub use collect_memory::collect_memory_info;
pub use collect_cpu::collect_cpu_info;
pub use collect_network::collect_network_info;
pub use collect_storage::collect_block_info;
pub use collector::{collect_snapshot, prepare_environment, verify_environment};
