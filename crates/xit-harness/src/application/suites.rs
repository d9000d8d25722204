//! The registered test cases and the fixture each one runs against.
//!
//! Case names follow the gtest convention the results registry keys on:
//! `Suite.Case` for plain cases and `Suite.Case/param` for parameterised
//! ones, with the parameter value (layout or driver name) as the suffix.
//!
//! | Suite                   | Case             | Params                    |
//! |-------------------------|------------------|---------------------------|
//! | `EvdevDriverXKBTest`    | `DeviceExists`   | every layout in the table |
//! | `EvdevDriverXKBTest`    | `KeyboardLayout` | every layout in the table |
//! | `EvdevDriverMouseTest`  | `ScrollWheel`    | none                      |
//! | `LegacyInputDriverTest` | `DriverDevice`   | the seven legacy drivers  |
//!
//! Config and log paths are fixed per test family and overwritten by each
//! case; only one case runs at a time.

use std::path::{Path, PathBuf};

use xit_core::{
    domain::check::{LEGACY_DRIVERS, TEST_DEVICE_NAME},
    fixture::InputOption,
    LayoutTable, XorgConfig,
};

pub const XKB_SUITE: &str = "EvdevDriverXKBTest";
pub const MOUSE_SUITE: &str = "EvdevDriverMouseTest";
pub const LEGACY_SUITE: &str = "LegacyInputDriverTest";

/// Recording replayed by the keyboard cases, relative to the recordings dir.
pub const KEYBOARD_RECORDING: &str = "keyboards/AT Translated Set 2 Keyboard.desc";
/// Recording replayed by the mouse case, relative to the recordings dir.
pub const MOUSE_RECORDING: &str = "mice/PIXART USB OPTICAL MOUSE.desc";

/// XKB model configured for every keyboard case.
const XKB_MODEL: &str = "dellusbmm";

/// What a case checks once its server is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseKind {
    /// Exactly one `--device--` exists with the keyboard configured for `layout`.
    DeviceExists { layout: String },
    /// Every key of `layout` plus the multimedia keys resolve to their keysyms.
    KeyboardLayout { layout: String },
    /// Wheel motion turns into the matching number of button 4/5 clicks.
    ScrollWheel,
    /// A legacy `driver` yields the expected device count and one `--device--`.
    LegacyDriverDevice { driver: String },
}

/// One registered case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub suite: &'static str,
    pub name: String,
    pub kind: CaseKind,
}

/// Everything the server needs for one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFixture {
    pub config: XorgConfig,
    pub config_path: PathBuf,
    pub log_path: PathBuf,
}

impl TestCase {
    fn new(suite: &'static str, name: impl Into<String>, kind: CaseKind) -> Self {
        Self {
            suite,
            name: name.into(),
            kind,
        }
    }

    /// `Suite.Name`, the string filters and the registry match against.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.suite, self.name)
    }

    /// The device recording this case replays, if it needs a synthetic device.
    ///
    /// Legacy driver cases configure a driver without a device node and need
    /// none.
    pub fn recording(&self) -> Option<&'static str> {
        match self.kind {
            CaseKind::DeviceExists { .. } | CaseKind::KeyboardLayout { .. } => {
                Some(KEYBOARD_RECORDING)
            }
            CaseKind::ScrollWheel => Some(MOUSE_RECORDING),
            CaseKind::LegacyDriverDevice { .. } => None,
        }
    }

    /// Base name of the config file; the log is `Xorg-<stem>.log`.
    fn file_stem(&self) -> String {
        match &self.kind {
            CaseKind::DeviceExists { .. } | CaseKind::KeyboardLayout { .. } => {
                "evdev-driver-xkb".to_string()
            }
            CaseKind::ScrollWheel => "evdev-driver-mouse".to_string(),
            CaseKind::LegacyDriverDevice { driver } => driver.clone(),
        }
    }

    /// Builds the configuration for this case.
    ///
    /// `device_node` is the node of the synthetic device created from
    /// [`TestCase::recording`]; it is ignored by cases that need no device.
    pub fn fixture(
        &self,
        work_dir: &Path,
        video_driver: &str,
        device_node: Option<&Path>,
    ) -> CaseFixture {
        let stem = self.file_stem();
        let device_option =
            device_node.map(|node| InputOption::new("Device", node.display().to_string()));

        let (driver, options): (&str, Vec<InputOption>) = match &self.kind {
            CaseKind::DeviceExists { layout } | CaseKind::KeyboardLayout { layout } => (
                "evdev",
                [
                    InputOption::new("CoreKeyboard", "on"),
                    InputOption::new("XkbRules", "xorg"),
                    InputOption::new("XkbModel", XKB_MODEL),
                    InputOption::new("XkbLayout", layout.as_str()),
                ]
                .into_iter()
                .chain(device_option)
                .collect(),
            ),
            CaseKind::ScrollWheel => (
                "evdev",
                std::iter::once(InputOption::new("CorePointer", "on"))
                    .chain(device_option)
                    .collect(),
            ),
            CaseKind::LegacyDriverDevice { driver } => {
                (driver.as_str(), vec![InputOption::new("CorePointer", "on")])
            }
        };

        let mut config = XorgConfig::new();
        config
            .add_default_screen_with_driver(video_driver, video_driver)
            .add_input_section(driver, TEST_DEVICE_NAME, options);

        CaseFixture {
            config,
            config_path: work_dir.join(format!("{stem}.conf")),
            log_path: work_dir.join(format!("Xorg-{stem}.log")),
        }
    }
}

/// Every case, in registration order: keyboard cases per layout of `table`,
/// the mouse case, then one case per legacy driver.
pub fn registered_cases(table: &LayoutTable) -> Vec<TestCase> {
    let layouts: Vec<&str> = table.layouts().collect();
    let mut cases = Vec::new();

    for layout in &layouts {
        cases.push(TestCase::new(
            XKB_SUITE,
            format!("DeviceExists/{layout}"),
            CaseKind::DeviceExists {
                layout: layout.to_string(),
            },
        ));
    }
    for layout in &layouts {
        cases.push(TestCase::new(
            XKB_SUITE,
            format!("KeyboardLayout/{layout}"),
            CaseKind::KeyboardLayout {
                layout: layout.to_string(),
            },
        ));
    }

    cases.push(TestCase::new(MOUSE_SUITE, "ScrollWheel", CaseKind::ScrollWheel));

    for driver in LEGACY_DRIVERS {
        cases.push(TestCase::new(
            LEGACY_SUITE,
            format!("DriverDevice/{driver}"),
            CaseKind::LegacyDriverDevice {
                driver: driver.to_string(),
            },
        ));
    }

    cases
}

// ── Tests ─────────────────────────────────────────────────────────────────────
