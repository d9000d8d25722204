//! Synthetic input devices.
//!
//! The uinput implementation is selected at compile time via
//! `#[cfg(target_os = "linux")]`; the evemu parser and the mock build
//! everywhere.

pub mod evemu;
pub mod mock;

#[cfg(target_os = "linux")]
pub mod uinput;

pub use evemu::{DescriptorError, DeviceDescriptor};
