//! uinput-backed synthetic devices via the `evdev` crate.
//!
//! # What is uinput? (for beginners)
//!
//! `/dev/uinput` lets a process create an input device in the kernel.  The
//! kernel then exposes a `/dev/input/eventN` node for it exactly as it would
//! for plugged-in hardware, and anything written to the uinput handle shows
//! up as events on that node.  Xorg's evdev driver opens the node named in
//! the config and cannot tell it apart from a real keyboard or mouse.
//!
//! # Frames
//!
//! The kernel delivers events in frames terminated by `SYN_REPORT`.
//! `VirtualDevice::emit` always appends one, so events replayed with
//! `sync = false` are held back and written together with the next synced
//! event as a single frame.
//!
//! # Permissions
//!
//! Creating devices needs write access to `/dev/uinput` (usually root or the
//! `input` group).  Without it construction fails with an I/O error.

use std::path::{Path, PathBuf};

use evdev::{
    uinput::VirtualDevice, AbsInfo, AbsoluteAxisCode, AttributeSet, BusType, InputEvent, InputId,
    KeyCode, MiscCode, PropType, RelativeAxisCode, UinputAbsSetup,
};
use tracing::{debug, info, warn};
use xit_core::keymap::linux_input::{EV_ABS, EV_KEY, EV_MSC, EV_REL, EV_SYN};

use super::evemu::DeviceDescriptor;
use crate::application::session::{DeviceError, InputDevice};

/// A kernel input device created from a recorded description.
///
/// Dropping it closes the uinput handle, which destroys the device.
pub struct UinputDevice {
    device: VirtualDevice,
    node: PathBuf,
    name: String,
    unsynced: Vec<InputEvent>,
}

impl UinputDevice {
    /// Creates the device described by `descriptor` and waits for its node.
    ///
    /// # Errors
    ///
    /// [`DeviceError::Io`] if uinput refuses the device,
    /// [`DeviceError::NoDeviceNode`] if no event node appears.
    pub fn create(descriptor: &DeviceDescriptor) -> Result<Self, DeviceError> {
        let id = InputId::new(
            BusType(descriptor.bus),
            descriptor.vendor,
            descriptor.product,
            descriptor.version,
        );
        let mut builder = VirtualDevice::builder()?
            .name(&descriptor.name)
            .input_id(id);

        let properties: AttributeSet<PropType> = descriptor.properties().map(PropType).collect();
        if properties.iter().next().is_some() {
            builder = builder.with_properties(&properties)?;
        }

        for event_type in descriptor.codes(EV_SYN) {
            match event_type {
                EV_SYN => {}
                EV_KEY => {
                    let keys: AttributeSet<KeyCode> =
                        descriptor.codes(EV_KEY).map(KeyCode::new).collect();
                    builder = builder.with_keys(&keys)?;
                }
                EV_REL => {
                    let axes: AttributeSet<RelativeAxisCode> =
                        descriptor.codes(EV_REL).map(RelativeAxisCode).collect();
                    builder = builder.with_relative_axes(&axes)?;
                }
                EV_ABS => {
                    for axis in &descriptor.abs_axes {
                        let setup = UinputAbsSetup::new(
                            AbsoluteAxisCode(axis.code),
                            AbsInfo::new(
                                0,
                                axis.minimum,
                                axis.maximum,
                                axis.fuzz,
                                axis.flat,
                                axis.resolution,
                            ),
                        );
                        builder = builder.with_absolute_axis(&setup)?;
                    }
                }
                EV_MSC => {
                    let codes: AttributeSet<MiscCode> =
                        descriptor.codes(EV_MSC).map(MiscCode).collect();
                    builder = builder.with_msc(&codes)?;
                }
                other => {
                    debug!(
                        name = %descriptor.name,
                        event_type = other,
                        "event type not replicated on the uinput device"
                    );
                }
            }
        }

        let mut device = builder.build()?;
        let node = device
            .enumerate_dev_nodes_blocking()?
            .filter_map(Result::ok)
            .find(|path| is_event_node(path))
            .ok_or_else(|| DeviceError::NoDeviceNode(descriptor.name.clone()))?;

        info!(name = %descriptor.name, node = %node.display(), "created uinput device");
        Ok(Self {
            device,
            node,
            name: descriptor.name.clone(),
            unsynced: Vec::new(),
        })
    }

    /// Loads the description at `path` and creates its device.
    ///
    /// # Errors
    ///
    /// [`DeviceError::Recording`] if the description cannot be read or
    /// parsed, otherwise as [`UinputDevice::create`].
    pub fn from_recording(path: &Path) -> Result<Self, DeviceError> {
        let descriptor =
            DeviceDescriptor::load(path).map_err(|e| DeviceError::Recording {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Self::create(&descriptor)
    }
}

fn is_event_node(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("event"))
}

impl InputDevice for UinputDevice {
    fn play_one(
        &mut self,
        event_type: u16,
        code: u16,
        value: i32,
        sync: bool,
    ) -> Result<(), DeviceError> {
        self.unsynced.push(InputEvent::new(event_type, code, value));
        if !sync {
            return Ok(());
        }
        let frame = std::mem::take(&mut self.unsynced);
        self.device.emit(&frame)?;
        Ok(())
    }

    fn device_node(&self) -> &Path {
        &self.node
    }
}

impl Drop for UinputDevice {
    fn drop(&mut self) {
        if !self.unsynced.is_empty() {
            warn!(
                name = %self.name,
                events = self.unsynced.len(),
                "destroying device with unsynced events"
            );
        }
        debug!(name = %self.name, node = %self.node.display(), "destroying uinput device");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_event_nodes_are_accepted() {
        assert!(is_event_node(Path::new("/dev/input/event12")));
        assert!(!is_event_node(Path::new("/dev/input/mouse2")));
        assert!(!is_event_node(Path::new("/dev/input/js0")));
    }

    #[test]
    fn test_missing_recording_is_a_recording_error() {
        let dir = tempfile::tempdir().expect("tempdir");

        let result = UinputDevice::from_recording(&dir.path().join("absent.desc"));

        assert!(matches!(result, Err(DeviceError::Recording { .. })));
    }
}
