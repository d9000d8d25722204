//! Display connections to the server under test.
//!
//! The Xlib implementation is selected at compile time via
//! `#[cfg(target_os = "linux")]`; the scripted display builds everywhere.

pub mod scripted;

#[cfg(target_os = "linux")]
pub mod xlib;
