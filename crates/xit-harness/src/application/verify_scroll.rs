//! Scroll-wheel verification.
//!
//! One `REL_WHEEL` event of magnitude N must come out of the mouse driver as
//! exactly N clicks of one button: 4 for positive motion, 5 for negative.
//! Each click is a `ButtonPress` immediately followed by its `ButtonRelease`.

use tracing::{debug, info};
use xit_core::{
    domain::check::{
        check_click_count, expect_click_pair, AssertionFailure, WHEEL_DOWN_BUTTON, WHEEL_UP_BUTTON,
    },
    keymap::linux_input::{EV_REL, REL_WHEEL},
};

use super::session::{DisplayConnection, EventMask, InputDevice, VerifyError};

/// Wheel values replayed by the scroll case, with the button each must click.
pub const SCROLL_SEQUENCE: [(i32, u32); 6] = [
    (1, WHEEL_UP_BUTTON),
    (2, WHEEL_UP_BUTTON),
    (3, WHEEL_UP_BUTTON),
    (-1, WHEEL_DOWN_BUTTON),
    (-2, WHEEL_DOWN_BUTTON),
    (-3, WHEEL_DOWN_BUTTON),
];

/// Replays one wheel event of `value` and counts the clicks of `button`.
///
/// # Errors
///
/// - [`AssertionFailure::ZeroWheelMotion`] for `value == 0`; nothing is replayed.
/// - [`AssertionFailure::NoEventPending`] if nothing arrives after the sync.
/// - [`AssertionFailure::UnexpectedEvent`] for any event that is not the next
///   half of a press/release pair on `button`.
/// - [`AssertionFailure::ClickCountMismatch`] if the number of pairs is not `|value|`.
pub fn scroll_wheel_event(
    device: &mut dyn InputDevice,
    display: &mut dyn DisplayConnection,
    value: i32,
    button: u32,
) -> Result<(), VerifyError> {
    if value == 0 {
        return Err(AssertionFailure::ZeroWheelMotion.into());
    }

    device.play_one(EV_REL, REL_WHEEL, value, true)?;

    display.sync();
    if display.pending() == 0 {
        return Err(AssertionFailure::NoEventPending.into());
    }

    let mut clicks = 0u32;
    while display.pending() > 0 {
        let press = display.next_event();
        let release = display.next_event();
        expect_click_pair(button, press, release)?;
        clicks += 1;
    }
    debug!(value, button, clicks, "wheel event replayed");

    check_click_count(button, value, clicks)?;
    Ok(())
}

/// Replays [`SCROLL_SEQUENCE`] on a configured mouse.
pub struct ScrollWheelVerifier<'a> {
    device: &'a mut dyn InputDevice,
    display: &'a mut dyn DisplayConnection,
}

impl<'a> ScrollWheelVerifier<'a> {
    pub fn new(device: &'a mut dyn InputDevice, display: &'a mut dyn DisplayConnection) -> Self {
        Self { device, display }
    }

    /// Selects button events on the root window and replays the sequence,
    /// stopping at the first failure.
    ///
    /// # Errors
    ///
    /// The first [`VerifyError`] returned by [`scroll_wheel_event`].
    pub fn run(&mut self) -> Result<(), VerifyError> {
        self.display
            .select_root_input(EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE);
        self.display.settle();

        info!(steps = SCROLL_SEQUENCE.len(), "checking scroll wheel");
        for (value, button) in SCROLL_SEQUENCE {
            scroll_wheel_event(&mut *self.device, &mut *self.display, value, button)?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
