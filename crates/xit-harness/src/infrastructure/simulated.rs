//! An in-process stand-in for uinput + Xorg.
//!
//! [`SimulatedEnvironment`] behaves like a correctly installed server with
//! working drivers: key events come back as keycodes offset by 8 and resolve
//! through the configured `XkbLayout`, wheel motion turns into one button
//! 4/5 click per unit, and the device list holds the core devices plus one
//! entry per configured input section.  It lets the runner and verifiers be
//! exercised end to end without `/dev/uinput` or an X server.
//!
//! Faults can be injected to check that the verifiers notice them:
//! [`SimulatedEnvironment::without_driver`] drops a driver's device from the
//! list, [`SimulatedEnvironment::ignoring_layout`] resolves every key through
//! the `us` layout regardless of the config.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use xit_core::{
    domain::check::wheel_button,
    keymap::{
        linux_input::{
            x11_keycode, BTN_LEFT, BTN_MIDDLE, BTN_RIGHT, EV_KEY, EV_REL, REL_HWHEEL, REL_WHEEL,
        },
        multimedia_keys, LayoutTable,
    },
    DeviceInfo, DisplayEvent,
};

use super::{
    display::scripted::{EventWire, ScriptedDisplay},
    input_device::{
        evemu::DeviceDescriptor,
        mock::{EventLog, MockInputDevice, PlayedEvent},
    },
};
use crate::application::{
    session::{
        DeviceError, DisplayConnection, InputDevice, RunningServer, SetupError, TestEnvironment,
    },
    suites::CaseFixture,
};

/// Devices every server reports before any configured input.
const CORE_DEVICES: [&str; 4] = [
    "Virtual core pointer",
    "Virtual core keyboard",
    "Virtual core XTEST pointer",
    "Virtual core XTEST keyboard",
];

/// Layout XKB falls back to.
const FALLBACK_LAYOUT: &str = "us";

/// xorg.conf boolean spelling for "enabled".
fn is_on(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "on" | "true" | "yes" | "1"
    )
}

/// Translates one kernel event into the core events a server would emit.
fn core_events(event: &PlayedEvent) -> Vec<DisplayEvent> {
    match (event.event_type, event.code) {
        (EV_KEY, BTN_LEFT | BTN_MIDDLE | BTN_RIGHT) => {
            let button = match event.code {
                BTN_LEFT => 1,
                BTN_MIDDLE => 2,
                _ => 3,
            };
            if event.value == 0 {
                vec![DisplayEvent::ButtonRelease { button }]
            } else {
                vec![DisplayEvent::ButtonPress { button }]
            }
        }
        (EV_KEY, code) => match x11_keycode(code) {
            Some(keycode) if event.value == 0 => vec![DisplayEvent::KeyRelease { keycode }],
            Some(keycode) => vec![DisplayEvent::KeyPress { keycode }],
            None => Vec::new(),
        },
        (EV_REL, REL_WHEEL) => clicks(wheel_button(event.value), event.value),
        (EV_REL, REL_HWHEEL) => {
            let button = match event.value.signum() {
                1 => Some(7),
                -1 => Some(6),
                _ => None,
            };
            clicks(button, event.value)
        }
        _ => Vec::new(),
    }
}

fn clicks(button: Option<u32>, value: i32) -> Vec<DisplayEvent> {
    let Some(button) = button else {
        return Vec::new();
    };
    (0..value.unsigned_abs())
        .flat_map(|_| {
            [
                DisplayEvent::ButtonPress { button },
                DisplayEvent::ButtonRelease { button },
            ]
        })
        .collect()
}

/// A device whose synced frames arrive on an [`EventWire`] as core events.
pub struct SimulatedDevice {
    recorder: MockInputDevice,
    wire: EventWire,
    frame: Vec<PlayedEvent>,
}

impl InputDevice for SimulatedDevice {
    fn play_one(
        &mut self,
        event_type: u16,
        code: u16,
        value: i32,
        sync: bool,
    ) -> Result<(), DeviceError> {
        self.recorder.play_one(event_type, code, value, sync)?;
        self.frame.push(PlayedEvent {
            event_type,
            code,
            value,
            sync,
        });
        if sync {
            let mut wire = self.wire.borrow_mut();
            for event in self.frame.drain(..) {
                wire.extend(core_events(&event));
            }
        }
        Ok(())
    }

    fn device_node(&self) -> &Path {
        self.recorder.device_node()
    }
}

/// A started simulated server.
pub struct SimulatedServer {
    display: ScriptedDisplay,
    log_path: PathBuf,
}

impl RunningServer for SimulatedServer {
    fn display(&mut self) -> &mut dyn DisplayConnection {
        &mut self.display
    }
}

impl Drop for SimulatedServer {
    fn drop(&mut self) {
        debug!(log = %self.log_path.display(), "simulated server stopped");
    }
}

/// [`TestEnvironment`] backed by [`SimulatedDevice`] and [`ScriptedDisplay`].
pub struct SimulatedEnvironment {
    table: LayoutTable,
    recordings_dir: Option<PathBuf>,
    missing_drivers: Vec<String>,
    ignore_layout: bool,
    wire: Option<EventWire>,
    next_node: u32,
    played: EventLog,
}

impl SimulatedEnvironment {
    /// Resolves keys through `table`, the same table the verifiers expect.
    pub fn new(table: LayoutTable) -> Self {
        Self {
            table,
            recordings_dir: None,
            missing_drivers: Vec::new(),
            ignore_layout: false,
            wire: None,
            next_node: 20,
            played: EventLog::default(),
        }
    }

    /// Parses each requested recording from `dir` before creating a device.
    pub fn with_recordings(mut self, dir: impl Into<PathBuf>) -> Self {
        self.recordings_dir = Some(dir.into());
        self
    }

    /// Behaves as if the `driver` module were not installed.
    pub fn without_driver(mut self, driver: &str) -> Self {
        self.missing_drivers.push(driver.to_string());
        self
    }

    /// Resolves every key through the fallback layout.
    pub fn ignoring_layout(mut self) -> Self {
        self.ignore_layout = true;
        self
    }

    /// Every event replayed by any device so far.
    pub fn played(&self) -> Vec<PlayedEvent> {
        self.played
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn device_list(&self, fixture: &CaseFixture) -> Vec<DeviceInfo> {
        let mut names: Vec<String> = CORE_DEVICES.iter().map(|n| n.to_string()).collect();
        let (mut core_keyboard, mut core_pointer) = (false, false);

        for (driver, identifier) in fixture.config.input_sections() {
            if self.missing_drivers.iter().any(|d| d == driver) {
                warn!(driver, "driver not installed, device skipped");
                continue;
            }
            let option_on = |name: &str| {
                fixture
                    .config
                    .input_option(identifier, name)
                    .is_some_and(is_on)
            };
            core_keyboard |= option_on("CoreKeyboard");
            core_pointer |= option_on("CorePointer");
            names.push(identifier.to_string());
        }
        if !core_keyboard {
            names.push("<default keyboard>".to_string());
        }
        if !core_pointer {
            names.push("<default pointer>".to_string());
        }

        names
            .into_iter()
            .zip(2..)
            .map(|(name, id)| DeviceInfo::new(id, name))
            .collect()
    }

    fn install_keymap(&self, fixture: &CaseFixture, display: &mut ScriptedDisplay) {
        for (_, identifier) in fixture.config.input_sections() {
            let Some(configured) = fixture.config.input_option(identifier, "XkbLayout") else {
                continue;
            };
            let layout = if self.ignore_layout || self.table.pairs(configured).is_empty() {
                FALLBACK_LAYOUT
            } else {
                configured
            };
            debug!(configured, layout, "installing keymap");

            let codes = self
                .table
                .pairs(layout)
                .iter()
                .chain(multimedia_keys().iter())
                .map(|pair| pair.code)
                .collect::<Vec<_>>();
            for code in codes {
                let keysym = self.table.keysym_for(layout, code).or_else(|| {
                    multimedia_keys()
                        .into_iter()
                        .find(|pair| pair.code == code)
                        .map(|pair| pair.keysym)
                });
                if let (Some(keycode), Some(keysym)) = (x11_keycode(code), keysym) {
                    display.set_keysym(keycode, keysym);
                }
            }
        }
    }
}

impl TestEnvironment for SimulatedEnvironment {
    fn create_device(&mut self, recording: &str) -> Result<Box<dyn InputDevice>, SetupError> {
        if let Some(dir) = &self.recordings_dir {
            let path = dir.join(recording);
            let descriptor =
                DeviceDescriptor::load(&path).map_err(|e| DeviceError::Recording {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            debug!(name = %descriptor.name, "simulating recorded device");
        }

        let node = PathBuf::from(format!("/dev/input/event{}", self.next_node));
        self.next_node += 1;
        let wire = EventWire::default();
        self.wire = Some(wire.clone());

        Ok(Box::new(SimulatedDevice {
            recorder: MockInputDevice::with_log(node, self.played.clone()),
            wire,
            frame: Vec::new(),
        }))
    }

    fn launch(&mut self, fixture: &CaseFixture) -> Result<Box<dyn RunningServer>, SetupError> {
        if !fixture.config_path.is_file() {
            return Err(SetupError::Server(format!(
                "config {} was not written",
                fixture.config_path.display()
            )));
        }

        let mut display = ScriptedDisplay::with_wire(self.wire.take().unwrap_or_default());
        display.set_devices(self.device_list(fixture));
        self.install_keymap(fixture, &mut display);

        Ok(Box::new(SimulatedServer {
            display,
            log_path: fixture.log_path.clone(),
        }))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
