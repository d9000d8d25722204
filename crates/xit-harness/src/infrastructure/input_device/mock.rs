//! Mock input device for unit testing.
//!
//! Records every replayed event into a shared log instead of talking to
//! `/dev/uinput`, so tests can assert exactly what was replayed and in what
//! order.  The log is shared through an `Arc` because the device itself is
//! usually boxed and handed to the code under test.
//!
//! # `should_fail` flag
//!
//! Set `should_fail = true` to make every `play_one` return
//! [`DeviceError::Platform`], which exercises the error paths of the
//! verifiers without a broken kernel.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::application::session::{DeviceError, InputDevice};

/// One replayed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayedEvent {
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
    pub sync: bool,
}

/// Shared, ordered log of replayed events.
pub type EventLog = Arc<Mutex<Vec<PlayedEvent>>>;

/// A device that records instead of replaying.
#[derive(Debug)]
pub struct MockInputDevice {
    pub played: EventLog,
    pub should_fail: bool,
    node: PathBuf,
}

impl MockInputDevice {
    /// Creates a device reporting `node` as its device node.
    pub fn new(node: impl Into<PathBuf>) -> Self {
        Self {
            played: EventLog::default(),
            should_fail: false,
            node: node.into(),
        }
    }

    /// Creates a device that appends to an existing log.
    pub fn with_log(node: impl Into<PathBuf>, played: EventLog) -> Self {
        Self {
            played,
            should_fail: false,
            node: node.into(),
        }
    }

    /// Snapshot of the events replayed so far.
    pub fn events(&self) -> Vec<PlayedEvent> {
        self.played
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl InputDevice for MockInputDevice {
    fn play_one(
        &mut self,
        event_type: u16,
        code: u16,
        value: i32,
        sync: bool,
    ) -> Result<(), DeviceError> {
        if self.should_fail {
            return Err(DeviceError::Platform("injected failure".to_string()));
        }
        let mut played = self
            .played
            .lock()
            .map_err(|_| DeviceError::Platform("event log poisoned".to_string()))?;
        played.push(PlayedEvent {
            event_type,
            code,
            value,
            sync,
        });
        Ok(())
    }

    fn device_node(&self) -> &Path {
        &self.node
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
