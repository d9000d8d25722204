//! The seams between the test logic and the external runtime.
//!
//! The verifiers only ever talk to two things: a synthetic input device they
//! replay events through, and a display connection they read the resulting X
//! events from.  Both are traits so the same verifier code drives a real
//! uinput device + Xorg server in production and an in-process simulation in
//! tests.
//!
//! **Dependency rule**: implementations live in the infrastructure layer; this
//! module must not import it.

use std::path::Path;

use bitflags::bitflags;
use thiserror::Error;
use xit_core::{
    keymap::Keysym, AssertionFailure, ConfigWriteError, DeviceInfo, DisplayEvent,
};

use super::suites::CaseFixture;

/// Error type for synthetic device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to load device recording {path}: {reason}")]
    Recording { path: String, reason: String },
    #[error("uinput error: {0}")]
    Io(#[from] std::io::Error),
    #[error("device node for {0} did not appear")]
    NoDeviceNode(String),
    #[error("platform error: {0}")]
    Platform(String),
}

/// Error type for display connection operations.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("cannot open display {0}")]
    Open(String),
    #[error("XIQueryDevice failed")]
    QueryDevices,
    #[error("connection to display {0} lost")]
    ConnectionLost(String),
}

/// Error type for setting up one test case.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("device setup failed: {0}")]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Config(#[from] ConfigWriteError),
    #[error("server failed to start: {0}")]
    Server(String),
    #[error("display connection failed: {0}")]
    Display(#[from] DisplayError),
}

/// Error type for the verifiers.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Display(#[from] DisplayError),
}

bitflags! {
    /// Core event masks selected on the root window.
    ///
    /// The bit values are the X11 protocol masks so implementations can pass
    /// them straight to `XSelectInput`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventMask: u32 {
        const KEY_PRESS = 1 << 0;
        const KEY_RELEASE = 1 << 1;
        const BUTTON_PRESS = 1 << 2;
        const BUTTON_RELEASE = 1 << 3;
    }
}

impl Default for EventMask {
    fn default() -> Self {
        Self::empty()
    }
}

/// A synthetic hardware device events are replayed through.
///
/// Dropping the device destroys it.
pub trait InputDevice {
    /// Emits a single event, followed by a `SYN_REPORT` when `sync` is set.
    fn play_one(
        &mut self,
        event_type: u16,
        code: u16,
        value: i32,
        sync: bool,
    ) -> Result<(), DeviceError>;

    /// The `/dev/input/eventN` node the kernel created for this device.
    fn device_node(&self) -> &Path;
}

/// A client connection to the server under test.
#[cfg_attr(test, mockall::automock)]
pub trait DisplayConnection {
    /// Selects `mask` on the root window.
    fn select_root_input(&mut self, mask: EventMask);

    /// Issues a harmless round trip and flushes.
    ///
    /// The server accepts connections before its input devices respond, so
    /// the tests make one request before replaying anything.
    fn settle(&mut self);

    /// Waits until the server has processed every request sent so far.
    fn sync(&mut self);

    /// Number of events already queued on the client side.
    fn pending(&mut self) -> usize;

    /// Reads the next event, blocking until one arrives.
    ///
    /// Returns `None` only when the connection can never produce another
    /// event.
    fn next_event(&mut self) -> Option<DisplayEvent>;

    /// Resolves `keycode` at `index` of its keysym list; `NoSymbol` (0) when unmapped.
    fn keycode_to_keysym(&mut self, keycode: u8, index: i32) -> Keysym;

    /// Lists every input device (XI2 `XIAllDevices`).
    fn query_devices(&mut self) -> Result<Vec<DeviceInfo>, DisplayError>;

    /// Fails with [`DisplayError::ConnectionLost`] once the server has gone
    /// away; every other method then degrades to a no-op.
    fn check_connection(&self) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// Discards everything currently queued after a round trip.
pub fn drain_events(display: &mut dyn DisplayConnection) -> usize {
    display.sync();
    let mut drained = 0;
    while display.pending() > 0 {
        if display.next_event().is_none() {
            break;
        }
        drained += 1;
    }
    drained
}

/// A started server; dropping it shuts the server down.
pub trait RunningServer {
    fn display(&mut self) -> &mut dyn DisplayConnection;
}

/// Creates the per-case device and server.
pub trait TestEnvironment {
    /// Creates a synthetic device from the recording at `recording`
    /// (relative to the recordings directory).
    fn create_device(&mut self, recording: &str) -> Result<Box<dyn InputDevice>, SetupError>;

    /// Starts a server for `fixture`, whose config has already been written.
    fn launch(&mut self, fixture: &CaseFixture) -> Result<Box<dyn RunningServer>, SetupError>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_mask_bits_match_x11_masks() {
        // KeyPressMask, KeyReleaseMask, ButtonPressMask, ButtonReleaseMask
        assert_eq!(EventMask::KEY_PRESS.bits(), 0x1);
        assert_eq!(EventMask::KEY_RELEASE.bits(), 0x2);
        assert_eq!(EventMask::BUTTON_PRESS.bits(), 0x4);
        assert_eq!(EventMask::BUTTON_RELEASE.bits(), 0x8);
        assert_eq!((EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE).bits(), 0xC);
    }

    #[test]
    fn test_drain_events_consumes_all_pending() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        // Arrange: three queued events, counted down as they are read
        let queued = Arc::new(AtomicUsize::new(3));
        let mut display = MockDisplayConnection::new();
        display.expect_sync().times(1).return_const(());
        let left = Arc::clone(&queued);
        display
            .expect_pending()
            .returning(move || left.load(Ordering::SeqCst));
        let left = Arc::clone(&queued);
        display.expect_next_event().times(3).returning(move || {
            left.fetch_sub(1, Ordering::SeqCst);
            Some(DisplayEvent::KeyRelease { keycode: 24 })
        });

        // Act
        let drained = drain_events(&mut display);

        // Assert
        assert_eq!(drained, 3);
        assert_eq!(queued.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drain_events_stops_when_connection_ends() {
        let mut display = MockDisplayConnection::new();
        display.expect_sync().return_const(());
        display.expect_pending().return_const(1usize);
        display.expect_next_event().times(1).returning(|| None);

        assert_eq!(drain_events(&mut display), 0);
    }
}
