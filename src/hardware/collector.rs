use chrono::Utc;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::hardware;
use crate::hardware::types::{CategoryResult, HardwareSnapshot};

/// Process environment pinned before every cycle. The helper tools whose
/// output we parse (smartctl, udevadm, ethtool) must not localise it.
pub const ENVIRONMENT_TOGGLES: &[(&str, &str)] = &[("LC_ALL", "C")];

/// Collect all four categories exactly once.
pub fn collect_snapshot() -> HardwareSnapshot {
    let snapshot = HardwareSnapshot {
        collected_at: Utc::now(),
        cpu: logged("cpu", hardware::collect_cpu_info()),
        memory: logged("memory", hardware::collect_memory_info()),
        storage: logged("storage", hardware::collect_block_info()),
        network: logged("network", hardware::collect_network_info()),
    };
    debug!("hardware snapshot collected at {}", snapshot.collected_at);
    snapshot
}

fn logged<T>(category: &str, result: CategoryResult<T>) -> CategoryResult<T> {
    if let Err(e) = &result {
        warn!("{} collection failed: {}", category, e);
    }
    result
}

/// Sets the toggles process-wide. Call only while single-threaded.
pub fn prepare_environment() -> Result<(), AppError> {
    apply_toggles(ENVIRONMENT_TOGGLES)
}

/// Read-only counterpart of [`prepare_environment`] for cycles running on
/// runtime worker threads, where the environment must not be mutated.
pub fn verify_environment() -> Result<(), AppError> {
    verify_toggles(ENVIRONMENT_TOGGLES)
}

fn verify_toggles(toggles: &[(&str, &str)]) -> Result<(), AppError> {
    for (key, value) in toggles {
        if std::env::var(key).as_deref() != Ok(*value) {
            return Err(environment_error(key, value, "not set before the runtime started"));
        }
    }
    Ok(())
}

fn apply_toggles(toggles: &[(&str, &str)]) -> Result<(), AppError> {
    for (key, value) in toggles {
        validate_toggle(key, value)?;
        std::env::set_var(key, value);

        if std::env::var(key).as_deref() != Ok(*value) {
            return Err(environment_error(key, value, "value did not read back"));
        }
    }
    Ok(())
}

/// `set_var` panics on these instead of reporting them.
fn validate_toggle(key: &str, value: &str) -> Result<(), AppError> {
    if key.is_empty() {
        return Err(environment_error(key, value, "empty variable name"));
    }
    if key.contains('=') {
        return Err(environment_error(key, value, "variable name contains '='"));
    }
    if key.contains('\0') || value.contains('\0') {
        return Err(environment_error(key, value, "contains a NUL byte"));
    }
    Ok(())
}

fn environment_error(key: &str, value: &str, reason: &str) -> AppError {
    AppError::Environment {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_toggle_rejects_malformed_names() {
        assert!(validate_toggle("", "1").is_err());
        assert!(validate_toggle("A=B", "1").is_err());
        assert!(validate_toggle("NUL\0NAME", "1").is_err());
        assert!(validate_toggle("GOOD", "bad\0value").is_err());
        assert!(validate_toggle("LC_ALL", "C").is_ok());
    }

    #[test]
    fn test_apply_toggles_sets_variables() {
        apply_toggles(&[("HARDWARE_INVENTORY_TEST_TOGGLE", "1")]).unwrap();
        assert_eq!(
            std::env::var("HARDWARE_INVENTORY_TEST_TOGGLE").as_deref(),
            Ok("1")
        );
    }

    #[test]
    fn test_verify_toggles_never_sets_variables() {
        let key = "HARDWARE_INVENTORY_TEST_UNPINNED";
        let err = verify_toggles(&[(key, "C")]).unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert!(std::env::var(key).is_err());
    }

    #[test]
    fn test_verify_toggles_accepts_pinned_variables() {
        apply_toggles(&[("HARDWARE_INVENTORY_TEST_PINNED", "C")]).unwrap();
        assert!(verify_toggles(&[("HARDWARE_INVENTORY_TEST_PINNED", "C")]).is_ok());
    }

    #[test]
    fn test_apply_toggles_reports_fatal_error() {
        let err = apply_toggles(&[("BROKEN=NAME", "1")]).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.exit_code(), 2);
    }
}
