//! xorg.conf generation for a single test case.
//!
//! Each test writes a fresh configuration naming exactly one input driver and
//! one device node, then starts the server with `-config <path>`.  The
//! generated file looks like this:
//!
//! ```text
//! Section "Device"
//!     Identifier "Device dummy"
//!     Driver "dummy"
//! EndSection
//!
//! Section "Screen"
//!     Identifier "Screen dummy"
//!     Device "Device dummy"
//! EndSection
//!
//! Section "InputDevice"
//!     Identifier "--device--"
//!     Driver "evdev"
//!     Option "CorePointer" "on"
//!     Option "Device" "/dev/input/event7"
//! EndSection
//!
//! Section "ServerLayout"
//!     Identifier "Test Layout"
//!     Screen 0 "Screen dummy"
//!     InputDevice "--device--"
//!     Option "AutoAddDevices" "off"
//! EndSection
//! ```
//!
//! `AutoAddDevices` is switched off so hotplugged devices (including the
//! synthetic one) are not added twice; the only input devices are the ones
//! listed in the layout plus whatever core fallbacks the server forces.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Error type for writing a generated configuration.
#[derive(Debug, Error)]
pub enum ConfigWriteError {
    #[error("I/O error writing xorg.conf at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single `Option "Name" "Value"` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputOption {
    pub name: String,
    pub value: String,
}

impl InputOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for InputOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Option \"{}\" \"{}\"", self.name, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScreenSection {
    driver: String,
    identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InputSection {
    driver: String,
    identifier: String,
    options: Vec<InputOption>,
}

impl fmt::Display for ScreenSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = &self.identifier;
        writeln!(f, "Section \"Device\"")?;
        writeln!(f, "    Identifier \"Device {id}\"")?;
        writeln!(f, "    Driver \"{}\"", self.driver)?;
        writeln!(f, "EndSection\n")?;
        writeln!(f, "Section \"Screen\"")?;
        writeln!(f, "    Identifier \"Screen {id}\"")?;
        writeln!(f, "    Device \"Device {id}\"")?;
        writeln!(f, "EndSection\n")
    }
}

impl fmt::Display for InputSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Section \"InputDevice\"")?;
        writeln!(f, "    Identifier \"{}\"", self.identifier)?;
        writeln!(f, "    Driver \"{}\"", self.driver)?;
        for option in &self.options {
            writeln!(f, "    {option}")?;
        }
        writeln!(f, "EndSection\n")
    }
}

/// Builder for a test-case xorg.conf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XorgConfig {
    screens: Vec<ScreenSection>,
    inputs: Vec<InputSection>,
}

impl XorgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `Device` section for the video `driver` and a `Screen` using it.
    ///
    /// The sections are named `Device <identifier>` and `Screen <identifier>`.
    pub fn add_default_screen_with_driver(&mut self, driver: &str, identifier: &str) -> &mut Self {
        self.screens.push(ScreenSection {
            driver: driver.to_string(),
            identifier: identifier.to_string(),
        });
        self
    }

    /// Adds an `InputDevice` section and lists it in the server layout.
    pub fn add_input_section(
        &mut self,
        driver: &str,
        identifier: &str,
        options: impl IntoIterator<Item = InputOption>,
    ) -> &mut Self {
        self.inputs.push(InputSection {
            driver: driver.to_string(),
            identifier: identifier.to_string(),
            options: options.into_iter().collect(),
        });
        self
    }

    /// Returns the driver names of all input sections, in order.
    pub fn input_drivers(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|s| s.driver.as_str())
    }

    /// Returns `(driver, identifier)` of every input section, in order.
    pub fn input_sections(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inputs
            .iter()
            .map(|s| (s.driver.as_str(), s.identifier.as_str()))
    }

    /// Value of option `name` in the input section called `identifier`.
    ///
    /// Option names compare case-insensitively, as the server does.
    pub fn input_option(&self, identifier: &str, name: &str) -> Option<&str> {
        self.inputs
            .iter()
            .find(|s| s.identifier == identifier)?
            .options
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
            .map(|o| o.value.as_str())
    }

    /// Renders the full configuration text.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Writes the rendered configuration to `path`, replacing any previous file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigWriteError::Io`] if the parent directory cannot be
    /// created or the file cannot be written.
    pub fn write_config(&self, path: &Path) -> Result<(), ConfigWriteError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| ConfigWriteError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, self.render()).map_err(|source| ConfigWriteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "wrote xorg.conf");
        Ok(())
    }
}

impl fmt::Display for XorgConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for screen in &self.screens {
            write!(f, "{screen}")?;
        }
        for input in &self.inputs {
            write!(f, "{input}")?;
        }

        writeln!(f, "Section \"ServerLayout\"")?;
        writeln!(f, "    Identifier \"Test Layout\"")?;
        for (index, screen) in self.screens.iter().enumerate() {
            writeln!(f, "    Screen {index} \"Screen {}\"", screen.identifier)?;
        }
        for input in &self.inputs {
            writeln!(f, "    InputDevice \"{}\"", input.identifier)?;
        }
        writeln!(f, "    {}", InputOption::new("AutoAddDevices", "off"))?;
        writeln!(f, "EndSection")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
