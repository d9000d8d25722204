//! xit-harness library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the harness do?
//!
//! Every test case follows the same four steps:
//!
//! 1. Create a synthetic input device (uinput) from a recorded evemu
//!    descriptor, so the kernel exposes a `/dev/input/eventN` node that looks
//!    like real hardware.
//! 2. Write an xorg.conf naming one input driver and that device node.
//! 3. Start Xorg against the config and connect to it with Xlib.
//! 4. Replay events through the device and check what the server delivers:
//!    keysyms for keyboards, button clicks for wheels, and the XI2 device list
//!    for driver enumeration.
//!
//! The server, drivers and XKB are external; the harness only configures
//! and observes them.

/// Application layer: verifiers, registered test cases and the runner.
pub mod application;

/// Infrastructure layer: uinput devices, Xlib connection, Xorg process, settings.
pub mod infrastructure;
