//! Keyboard layout verification.
//!
//! For each `(key code, expected keysym)` pair the verifier presses and
//! releases the key on the synthetic keyboard, reads the first event the
//! server delivers and asks the server which keysym sits at index 0 of that
//! keycode.  With `XkbLayout "de"` the key labelled Y must come back as `z`;
//! a server that ignored the layout option would report `y`.
//!
//! # Event flow (for beginners)
//!
//! ```text
//! uinput KEY_Y down/up ──► evdev driver ──► XKB ──► KeyPress keycode 29
//!                                                        │
//!                 XKeycodeToKeysym(29, 0) ◄──────────────┘  == XK_z ?
//! ```

use tracing::{debug, info};
use xit_core::{
    domain::check::{check_keysym, AssertionFailure},
    keymap::{
        keysym::describe,
        linux_input::{x11_keycode, EV_KEY},
        multimedia_keys, KeyPair, LayoutTable,
    },
    DisplayEvent,
};

use super::session::{
    drain_events, DisplayConnection, EventMask, InputDevice, VerifyError,
};

/// Replays one key down/up and checks the keysym of the first event.
///
/// Whatever else is queued afterwards (the release, autorepeat) is drained
/// even when the check fails, so the next pair starts from an empty queue.
///
/// # Errors
///
/// - [`AssertionFailure::NoEventPending`] if nothing arrives after the sync.
/// - [`AssertionFailure::UnexpectedEvent`] if the first event is not a key event.
/// - [`AssertionFailure::NoKeysym`] / [`AssertionFailure::KeysymMismatch`]
///   from the keysym comparison.
/// - [`VerifyError::Device`] if the device cannot replay the events.
pub fn play_key_pair(
    device: &mut dyn InputDevice,
    display: &mut dyn DisplayConnection,
    pair: KeyPair,
) -> Result<(), VerifyError> {
    device.play_one(EV_KEY, pair.code, 1, true)?;
    device.play_one(EV_KEY, pair.code, 0, true)?;

    display.sync();
    if display.pending() == 0 {
        return Err(AssertionFailure::NoEventPending.into());
    }

    let result = match display.next_event() {
        Some(event) => match event.keycode() {
            Some(keycode) => {
                let actual = display.keycode_to_keysym(keycode, 0);
                debug!(
                    code = pair.code,
                    keycode,
                    keysym = %describe(actual),
                    "resolved key"
                );
                check_keysym(keycode, pair.keysym, actual)
            }
            None => Err(unexpected_key_event(pair, Some(event))),
        },
        None => Err(unexpected_key_event(pair, None)),
    };

    drain_events(display);
    result.map_err(VerifyError::from)
}

fn unexpected_key_event(pair: KeyPair, actual: Option<DisplayEvent>) -> AssertionFailure {
    AssertionFailure::UnexpectedEvent {
        expected: DisplayEvent::KeyPress {
            keycode: x11_keycode(pair.code).unwrap_or_default(),
        },
        actual,
    }
}

/// Checks every key of a layout, then the multimedia keys.
pub struct KeyboardLayoutVerifier<'a> {
    table: &'a LayoutTable,
    device: &'a mut dyn InputDevice,
    display: &'a mut dyn DisplayConnection,
}

impl<'a> KeyboardLayoutVerifier<'a> {
    pub fn new(
        table: &'a LayoutTable,
        device: &'a mut dyn InputDevice,
        display: &'a mut dyn DisplayConnection,
    ) -> Self {
        Self {
            table,
            device,
            display,
        }
    }

    /// Runs the layout's pairs in table order, then the multimedia pairs.
    ///
    /// Stops at the first failing pair.
    ///
    /// # Errors
    ///
    /// The first [`VerifyError`] returned by [`play_key_pair`].
    pub fn run(&mut self, layout: &str) -> Result<(), VerifyError> {
        self.display
            .select_root_input(EventMask::KEY_PRESS | EventMask::KEY_RELEASE);
        self.display.settle();

        let layout_pairs = self.table.pairs(layout);
        let media_pairs = multimedia_keys();
        info!(
            layout,
            keys = layout_pairs.len(),
            multimedia = media_pairs.len(),
            "checking keyboard layout"
        );

        for &pair in layout_pairs.iter().chain(media_pairs.iter()) {
            play_key_pair(&mut *self.device, &mut *self.display, pair)?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{
        display::scripted::ScriptedDisplay, input_device::mock::MockInputDevice,
    };
    use xit_core::keymap::{
        keysym::{XK_y, XK_z},
        linux_input::KEY_Y,
    };

    const KEYCODE_Y: u8 = 29;

    fn keyboard() -> MockInputDevice {
        MockInputDevice::new("/dev/input/event42")
    }

    /// A display with key events selected and `events` in flight.
    fn display_with(events: impl IntoIterator<Item = DisplayEvent>) -> ScriptedDisplay {
        let mut display = ScriptedDisplay::new();
        display.select_root_input(EventMask::KEY_PRESS | EventMask::KEY_RELEASE);
        display.wire().borrow_mut().extend(events);
        display
    }

    fn key_events(keycode: u8) -> [DisplayEvent; 2] {
        [
            DisplayEvent::KeyPress { keycode },
            DisplayEvent::KeyRelease { keycode },
        ]
    }

    #[test]
    fn test_play_key_pair_replays_down_then_up() {
        // Arrange
        let mut device = keyboard();
        let mut display = display_with(key_events(KEYCODE_Y));
        display.set_keysym(KEYCODE_Y, XK_z);

        // Act
        let result = play_key_pair(&mut device, &mut display, KeyPair::new(KEY_Y, XK_z));

        // Assert
        assert!(result.is_ok(), "{result:?}");
        let played: Vec<_> = device
            .events()
            .iter()
            .map(|e| (e.event_type, e.code, e.value, e.sync))
            .collect();
        assert_eq!(played, vec![(EV_KEY, KEY_Y, 1, true), (EV_KEY, KEY_Y, 0, true)]);
        assert_eq!(display.pending(), 0, "release must be drained");
        assert_eq!(display.syncs(), 2);
    }

    #[test]
    fn test_play_key_pair_reports_no_event_pending() {
        let mut device = keyboard();
        let mut display = display_with([]);

        let result = play_key_pair(&mut device, &mut display, KeyPair::new(KEY_Y, XK_y));

        assert!(matches!(
            result,
            Err(VerifyError::Assertion(AssertionFailure::NoEventPending))
        ));
    }

    #[test]
    fn test_play_key_pair_reports_mismatch_and_still_drains() {
        // Arrange: server stuck on the US layout
        let mut device = keyboard();
        let mut display = display_with(key_events(KEYCODE_Y));
        display.set_keysym(KEYCODE_Y, XK_y);

        // Act
        let result = play_key_pair(&mut device, &mut display, KeyPair::new(KEY_Y, XK_z));

        // Assert
        match result {
            Err(VerifyError::Assertion(failure)) => assert_eq!(
                failure,
                AssertionFailure::KeysymMismatch {
                    keycode: KEYCODE_Y,
                    expected: XK_z,
                    actual: XK_y,
                }
            ),
            other => panic!("expected a keysym mismatch, got {other:?}"),
        }
        assert_eq!(display.pending(), 0);
    }

    #[test]
    fn test_play_key_pair_reports_unmapped_keycode() {
        let mut device = keyboard();
        let mut display = display_with(key_events(KEYCODE_Y));

        let result = play_key_pair(&mut device, &mut display, KeyPair::new(KEY_Y, XK_y));

        assert!(matches!(
            result,
            Err(VerifyError::Assertion(AssertionFailure::NoKeysym { keycode: KEYCODE_Y }))
        ));
    }

    #[test]
    fn test_play_key_pair_rejects_non_key_event() {
        let mut device = keyboard();
        let mut display = ScriptedDisplay::new();
        display.select_root_input(EventMask::all());
        display
            .wire()
            .borrow_mut()
            .push_back(DisplayEvent::ButtonPress { button: 1 });

        let result = play_key_pair(&mut device, &mut display, KeyPair::new(KEY_Y, XK_y));

        assert!(matches!(
            result,
            Err(VerifyError::Assertion(AssertionFailure::UnexpectedEvent {
                expected: DisplayEvent::KeyPress { keycode: KEYCODE_Y },
                actual: Some(DisplayEvent::ButtonPress { button: 1 }),
            }))
        ));
    }

    #[test]
    fn test_play_key_pair_propagates_device_failure() {
        let mut device = keyboard();
        device.should_fail = true;
        let mut display = display_with([]);

        let result = play_key_pair(&mut device, &mut display, KeyPair::new(KEY_Y, XK_y));

        assert!(matches!(result, Err(VerifyError::Device(_))));
        assert_eq!(display.syncs(), 0);
    }

    #[test]
    fn test_run_selects_key_masks_and_settles_first() {
        // Arrange: nothing ever arrives, so the first pair fails
        let table = LayoutTable::builtin();
        let mut device = keyboard();
        let mut display = ScriptedDisplay::new();

        // Act
        let result = KeyboardLayoutVerifier::new(&table, &mut device, &mut display).run("us");

        // Assert
        assert!(result.is_err());
        assert_eq!(
            display.selected(),
            EventMask::KEY_PRESS | EventMask::KEY_RELEASE
        );
        assert_eq!(display.settles(), 1);
        // Only the first pair was attempted.
        assert_eq!(device.events().len(), 2);
    }
}
