pub mod daemon;
pub mod inventory;

pub use daemon::handle_daemon_command;
pub use inventory::handle_inventory_command;
