//! TOML settings for the harness.
//!
//! The file is optional; every field falls back to a default so a bare
//! `xit-input` run works on a machine with Xorg in `PATH`, the dummy video
//! driver installed and the recordings checked out next to the binary.
//!
//! ```toml
//! [server]
//! binary = "Xorg"
//! display = 133
//! startup_timeout_ms = 10000
//! video_driver = "dummy"
//! extra_args = ["-verbose", "7"]
//!
//! [paths]
//! recordings_dir = "recordings"
//! work_dir = "/tmp"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! The path comes from `--config` or the `XIT_CONFIG` environment variable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "XIT_CONFIG";

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Settings schema types ─────────────────────────────────────────────────────

/// Top-level harness settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarnessSettings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// How the server under test is started.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerSettings {
    /// Server executable, looked up in `PATH` when not absolute.
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Display number the server listens on (`:N`).
    #[serde(default = "default_display")]
    pub display: u32,
    /// How long to wait for the server to accept connections.
    #[serde(default = "default_startup_timeout_ms")]
    pub startup_timeout_ms: u64,
    /// Video driver of the single screen every config declares.
    #[serde(default = "default_video_driver")]
    pub video_driver: String,
    /// Appended to the server command line.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// Where inputs are read from and artifacts are written to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathSettings {
    /// Root of the `keyboards/` and `mice/` evemu recordings.
    #[serde(default = "default_recordings_dir")]
    pub recordings_dir: PathBuf,
    /// Receives the generated configs and server logs.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_binary() -> String {
    "Xorg".to_string()
}
fn default_display() -> u32 {
    133
}
fn default_startup_timeout_ms() -> u64 {
    10_000
}
fn default_video_driver() -> String {
    "dummy".to_string()
}
fn default_recordings_dir() -> PathBuf {
    PathBuf::from("recordings")
}
fn default_work_dir() -> PathBuf {
    PathBuf::from("/tmp")
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            display: default_display(),
            startup_timeout_ms: default_startup_timeout_ms(),
            video_driver: default_video_driver(),
            extra_args: Vec::new(),
        }
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            recordings_dir: default_recordings_dir(),
            work_dir: default_work_dir(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ServerSettings {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    /// The display name clients connect to, e.g. `:133`.
    pub fn display_name(&self) -> String {
        format!(":{}", self.display)
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads settings from `path`, returning the defaults if the file does not
/// exist.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] for file-system errors other than "not
/// found", and [`SettingsError::Parse`] if the TOML is malformed.
pub fn load_settings(path: &Path) -> Result<HarnessSettings, SettingsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HarnessSettings::default()),
        Err(e) => Err(SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Loads settings from `path`, or returns the defaults when no file is named.
///
/// The binary fills `path` from `--config` or [`CONFIG_ENV`].
///
/// # Errors
///
/// As [`load_settings`].
pub fn resolve_settings(path: Option<&Path>) -> Result<HarnessSettings, SettingsError> {
    match path {
        Some(path) => load_settings(path),
        None => Ok(HarnessSettings::default()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
