//! Infrastructure layer for the harness.
//!
//! Contains the OS-facing adapters behind the application-layer traits.
//!
//! **Dependency rule**: this layer may depend on `application` and `xit_core`,
//! but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`input_device`** – evemu recording parser, the uinput-backed
//!   [`crate::application::session::InputDevice`] (Linux only) and a recording
//!   mock for tests.
//!
//! - **`display`** – The Xlib/XInput2 [`crate::application::session::DisplayConnection`]
//!   (Linux only) and a queue-backed scripted display for tests.
//!
//! - **`server`** – Starts Xorg against a generated config, waits until it
//!   accepts connections and stops it again on drop.
//!
//! - **`environment`** – Ties device, server and display together into the
//!   [`crate::application::session::TestEnvironment`] the runner uses.
//!
//! - **`simulated`** – An in-process environment that behaves like a
//!   correctly configured server, used by the integration tests.
//!
//! - **`settings`** – The harness settings file.

pub mod display;
pub mod input_device;
pub mod settings;
pub mod simulated;

#[cfg(target_os = "linux")]
pub mod environment;
#[cfg(target_os = "linux")]
pub mod server;
