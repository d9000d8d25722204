//! The individual assertions behind every test case.
//!
//! Each check returns `Err(AssertionFailure)` with the message the test report
//! shows for that case.  None of them are retried; the first failure ends the
//! case.

use thiserror::Error;

use super::events::{DeviceInfo, DisplayEvent};
use crate::keymap::keysym::{describe, Keysym, NO_SYMBOL};

/// Name given to the driver-under-test's device in every generated config.
pub const TEST_DEVICE_NAME: &str = "--device--";

/// Devices present after configuring a legacy driver: the virtual core
/// pointer and keyboard, the two XTEST devices, the keyboard the server forces
/// when no core keyboard is configured, and the driver's own device.
pub const LEGACY_EXPECTED_DEVICE_COUNT: usize = 6;

/// Legacy tablet/touchscreen drivers checked by the enumeration test.
pub const LEGACY_DRIVERS: [&str; 7] = [
    "acecad",
    "aiptek",
    "elographics",
    "fpit",
    "hyperpen",
    "mutouch",
    "penmount",
];

/// Button the server emits for positive wheel motion.
pub const WHEEL_UP_BUTTON: u32 = 4;
/// Button the server emits for negative wheel motion.
pub const WHEEL_DOWN_BUTTON: u32 = 5;

/// A failed test assertion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssertionFailure {
    #[error("No event pending")]
    NoEventPending,

    #[error("No keysym for keycode {keycode}")]
    NoKeysym { keycode: u8 },

    #[error(
        "Keysym not matching for keycode {keycode}: expected {}, got {}",
        describe_ref(.expected),
        describe_ref(.actual)
    )]
    KeysymMismatch {
        keycode: u8,
        expected: Keysym,
        actual: Keysym,
    },

    #[error("Expected {expected}, got {}", describe_event(.actual))]
    UnexpectedEvent {
        expected: DisplayEvent,
        actual: Option<DisplayEvent>,
    },

    #[error("Expected {expected} click(s) on button {button}, observed {actual}")]
    ClickCountMismatch {
        button: u32,
        expected: u32,
        actual: u32,
    },

    #[error("Wheel motion of 0 produces no button events")]
    ZeroWheelMotion,

    #[error("Duplicate device \"{name}\"")]
    DuplicateDevice { name: String },

    #[error("Device \"{name}\" not found")]
    DeviceMissing { name: String },

    #[error("Expected {expected} devices, found {actual}. Drivers required for this test: {drivers}")]
    DeviceCountMismatch {
        expected: usize,
        actual: usize,
        drivers: String,
    },
}

fn describe_ref(sym: &Keysym) -> String {
    describe(*sym)
}

fn describe_event(event: &Option<DisplayEvent>) -> String {
    match event {
        Some(event) => event.to_string(),
        None => "no event".to_string(),
    }
}

/// Checks the keysym resolved for `keycode` against the expected one.
///
/// # Errors
///
/// [`AssertionFailure::NoKeysym`] if `actual` is `NoSymbol`,
/// [`AssertionFailure::KeysymMismatch`] if it differs from `expected`.
pub fn check_keysym(keycode: u8, expected: Keysym, actual: Keysym) -> Result<(), AssertionFailure> {
    if actual == NO_SYMBOL {
        return Err(AssertionFailure::NoKeysym { keycode });
    }
    if actual != expected {
        return Err(AssertionFailure::KeysymMismatch {
            keycode,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Maps signed wheel motion to the button the server should click.
///
/// Returns `None` for zero motion.
pub fn wheel_button(value: i32) -> Option<u32> {
    match value.signum() {
        1 => Some(WHEEL_UP_BUTTON),
        -1 => Some(WHEEL_DOWN_BUTTON),
        _ => None,
    }
}

/// Checks that `actual` is exactly `expected`.
///
/// # Errors
///
/// [`AssertionFailure::UnexpectedEvent`] on any difference, including a
/// missing event.
pub fn expect_event(
    expected: DisplayEvent,
    actual: Option<DisplayEvent>,
) -> Result<(), AssertionFailure> {
    if actual == Some(expected) {
        Ok(())
    } else {
        Err(AssertionFailure::UnexpectedEvent { expected, actual })
    }
}

/// Checks one wheel click: a press of `button` followed by its release.
///
/// # Errors
///
/// [`AssertionFailure::UnexpectedEvent`] naming the first event that does not
/// match.
pub fn expect_click_pair(
    button: u32,
    press: Option<DisplayEvent>,
    release: Option<DisplayEvent>,
) -> Result<(), AssertionFailure> {
    expect_event(DisplayEvent::ButtonPress { button }, press)?;
    expect_event(DisplayEvent::ButtonRelease { button }, release)
}

/// Checks that the number of observed clicks equals the wheel magnitude.
///
/// # Errors
///
/// [`AssertionFailure::ClickCountMismatch`] when the counts differ.
pub fn check_click_count(button: u32, value: i32, observed: u32) -> Result<(), AssertionFailure> {
    let expected = value.unsigned_abs();
    if observed == expected {
        Ok(())
    } else {
        Err(AssertionFailure::ClickCountMismatch {
            button,
            expected,
            actual: observed,
        })
    }
}

/// Checks that exactly one device called `name` is present and returns it.
///
/// # Errors
///
/// [`AssertionFailure::DuplicateDevice`] for a second match,
/// [`AssertionFailure::DeviceMissing`] for none.
pub fn check_named_device<'a>(
    devices: &'a [DeviceInfo],
    name: &str,
) -> Result<&'a DeviceInfo, AssertionFailure> {
    let mut found = None;
    for device in devices.iter().filter(|d| d.name == name) {
        if found.is_some() {
            return Err(AssertionFailure::DuplicateDevice {
                name: name.to_string(),
            });
        }
        found = Some(device);
    }
    found.ok_or_else(|| AssertionFailure::DeviceMissing {
        name: name.to_string(),
    })
}

/// Checks the total number of devices the server reports.
///
/// `drivers` names the drivers that must be installed for the count to hold
/// and is only used in the failure message.
///
/// # Errors
///
/// [`AssertionFailure::DeviceCountMismatch`] when the count differs.
pub fn check_device_count(
    devices: &[DeviceInfo],
    expected: usize,
    drivers: &[&str],
) -> Result<(), AssertionFailure> {
    if devices.len() == expected {
        Ok(())
    } else {
        Err(AssertionFailure::DeviceCountMismatch {
            expected,
            actual: devices.len(),
            drivers: drivers.join(", "),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::keysym::{XF86XK_AudioMute, XK_y, XK_z};

    fn devices(names: &[&str]) -> Vec<DeviceInfo> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| DeviceInfo::new(i as i32 + 2, *name))
            .collect()
    }

    // ── Keysyms ───────────────────────────────────────────────────────────────

    #[test]
    fn test_check_keysym_accepts_match() {
        assert_eq!(check_keysym(29, XK_z, XK_z), Ok(()));
    }

    #[test]
    fn test_check_keysym_rejects_no_symbol() {
        assert_eq!(
            check_keysym(29, XK_z, NO_SYMBOL),
            Err(AssertionFailure::NoKeysym { keycode: 29 })
        );
    }

    #[test]
    fn test_check_keysym_mismatch_message_names_both_keysyms() {
        // Act
        let err = check_keysym(29, XK_z, XK_y).unwrap_err();

        // Assert
        assert_eq!(
            err.to_string(),
            "Keysym not matching for keycode 29: expected z (0x007a), got y (0x0079)"
        );
    }

    #[test]
    fn test_check_keysym_multimedia_match() {
        assert!(check_keysym(121, XF86XK_AudioMute, XF86XK_AudioMute).is_ok());
    }

    // ── Wheel ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_wheel_button_direction() {
        assert_eq!(wheel_button(1), Some(WHEEL_UP_BUTTON));
        assert_eq!(wheel_button(3), Some(WHEEL_UP_BUTTON));
        assert_eq!(wheel_button(-2), Some(WHEEL_DOWN_BUTTON));
        assert_eq!(wheel_button(0), None);
    }

    #[test]
    fn test_expect_click_pair_accepts_press_then_release() {
        let result = expect_click_pair(
            4,
            Some(DisplayEvent::ButtonPress { button: 4 }),
            Some(DisplayEvent::ButtonRelease { button: 4 }),
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_expect_click_pair_rejects_wrong_button() {
        let result = expect_click_pair(
            4,
            Some(DisplayEvent::ButtonPress { button: 5 }),
            Some(DisplayEvent::ButtonRelease { button: 5 }),
        );
        assert_eq!(
            result,
            Err(AssertionFailure::UnexpectedEvent {
                expected: DisplayEvent::ButtonPress { button: 4 },
                actual: Some(DisplayEvent::ButtonPress { button: 5 }),
            })
        );
    }

    #[test]
    fn test_expect_click_pair_rejects_missing_release() {
        let err = expect_click_pair(5, Some(DisplayEvent::ButtonPress { button: 5 }), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Expected ButtonRelease(button 5), got no event");
    }

    #[test]
    fn test_check_click_count_uses_absolute_magnitude() {
        assert_eq!(check_click_count(5, -3, 3), Ok(()));
        assert_eq!(
            check_click_count(4, 2, 1),
            Err(AssertionFailure::ClickCountMismatch {
                button: 4,
                expected: 2,
                actual: 1
            })
        );
    }

    // ── Devices ───────────────────────────────────────────────────────────────

    #[test]
    fn test_check_named_device_finds_single_match() {
        let list = devices(&["Virtual core pointer", TEST_DEVICE_NAME, "Virtual core keyboard"]);
        let found = check_named_device(&list, TEST_DEVICE_NAME).expect("device present");
        assert_eq!(found.id, 3);
    }

    #[test]
    fn test_check_named_device_rejects_duplicates() {
        let list = devices(&[TEST_DEVICE_NAME, "other", TEST_DEVICE_NAME]);
        let err = check_named_device(&list, TEST_DEVICE_NAME).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate device \"--device--\"");
    }

    #[test]
    fn test_check_named_device_rejects_missing() {
        let list = devices(&["Virtual core pointer"]);
        assert_eq!(
            check_named_device(&list, TEST_DEVICE_NAME),
            Err(AssertionFailure::DeviceMissing {
                name: TEST_DEVICE_NAME.to_string()
            })
        );
    }

    #[test]
    fn test_check_device_count_for_legacy_layout() {
        // Arrange
        let list = devices(&[
            "Virtual core pointer",
            "Virtual core keyboard",
            "Virtual core XTEST pointer",
            "Virtual core XTEST keyboard",
            "<default keyboard>",
            TEST_DEVICE_NAME,
        ]);

        // Act / Assert
        assert_eq!(
            check_device_count(&list, LEGACY_EXPECTED_DEVICE_COUNT, &["mouse", "keyboard", "acecad"]),
            Ok(())
        );
    }

    #[test]
    fn test_check_device_count_mismatch_names_required_drivers() {
        let list = devices(&["Virtual core pointer", "Virtual core keyboard"]);
        let err = check_device_count(&list, 6, &["mouse", "keyboard", "fpit"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected 6 devices, found 2. Drivers required for this test: mouse, keyboard, fpit"
        );
    }

    #[test]
    fn test_legacy_driver_list_has_seven_entries() {
        assert_eq!(LEGACY_DRIVERS.len(), 7);
        assert!(LEGACY_DRIVERS.contains(&"elographics"));
    }
}
