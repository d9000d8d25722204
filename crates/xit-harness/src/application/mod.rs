//! Application layer of the harness.
//!
//! - **`session`** – The seams to the outside world: the [`session::InputDevice`]
//!   the test replays events through, the [`session::DisplayConnection`] it
//!   reads X events from, and the [`session::TestEnvironment`] that creates
//!   both for each case.
//!
//! - **`verify_keyboard`**, **`verify_scroll`**, **`verify_devices`** – The
//!   three checks the test programs perform.
//!
//! - **`suites`** – The registered test cases and the per-case fixture
//!   (config file, log file, xorg.conf input section).
//!
//! - **`runner`** – Runs the selected cases one after another and collects a
//!   [`xit_core::RunReport`].

pub mod runner;
pub mod session;
pub mod suites;
pub mod verify_devices;
pub mod verify_keyboard;
pub mod verify_scroll;
