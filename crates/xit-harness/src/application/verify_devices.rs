//! Device presence checks against the server's XI2 device list.

use tracing::{debug, info};
use xit_core::domain::check::{
    check_device_count, check_named_device, LEGACY_EXPECTED_DEVICE_COUNT, TEST_DEVICE_NAME,
};

use super::session::{DisplayConnection, VerifyError};

/// Checks that exactly one device named `--device--` exists.
///
/// # Errors
///
/// [`VerifyError::Display`] if the device list cannot be queried, otherwise
/// the duplicate/missing assertion.
pub fn device_exists(display: &mut dyn DisplayConnection) -> Result<(), VerifyError> {
    let devices = display.query_devices()?;
    debug!(count = devices.len(), "queried devices");
    let device = check_named_device(&devices, TEST_DEVICE_NAME)?;
    info!(id = device.id, name = %device.name, "test device present");
    Ok(())
}

/// Checks the device count for a legacy driver, then the test device itself.
///
/// The count covers the two virtual core devices, the two XTEST devices, the
/// keyboard the server forces when no core keyboard is configured, and the
/// device of `driver`.  A missing driver module shows up as a short count, so
/// the failure names the drivers that must be installed.
///
/// # Errors
///
/// As [`device_exists`], plus the count assertion.
pub fn legacy_driver_device(
    display: &mut dyn DisplayConnection,
    driver: &str,
) -> Result<(), VerifyError> {
    let devices = display.query_devices()?;
    debug!(driver, count = devices.len(), "queried devices");
    check_device_count(
        &devices,
        LEGACY_EXPECTED_DEVICE_COUNT,
        &["mouse", "keyboard", driver],
    )?;
    let device = check_named_device(&devices, TEST_DEVICE_NAME)?;
    info!(driver, id = device.id, "legacy driver device present");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
