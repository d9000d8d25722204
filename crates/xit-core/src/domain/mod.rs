//! Assertion logic for the input driver tests.
//!
//! This module holds the rules the tests check, with no dependency on Xlib or
//! device nodes:
//!
//! - A replayed key must resolve to exactly the keysym its layout predicts.
//! - Wheel motion of magnitude `N` must produce exactly `N` press/release
//!   pairs, on button 4 for positive motion and button 5 for negative.
//! - Exactly one device named `--device--` must exist after configuring the
//!   driver under test, and the legacy drivers must leave a fixed total count.
//!
//! The harness feeds observed X events and device lists into these checks;
//! the tests in this crate feed them hand-built values.

pub mod check;
pub mod events;

pub use check::{
    check_click_count, check_device_count, check_keysym, check_named_device, expect_click_pair,
    expect_event, wheel_button, AssertionFailure, LEGACY_DRIVERS, LEGACY_EXPECTED_DEVICE_COUNT,
    TEST_DEVICE_NAME, WHEEL_DOWN_BUTTON, WHEEL_UP_BUTTON,
};
pub use events::{DeviceInfo, DisplayEvent};
