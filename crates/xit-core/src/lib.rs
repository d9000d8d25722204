//! # xit-core
//!
//! Shared library for the X input driver tests containing the key tables,
//! xorg.conf generation, assertion checks and result report types.
//!
//! This crate is used by both the test harness and the results registry.
//! It has zero dependencies on OS APIs, X libraries, or device nodes.
//!
//! # Architecture overview
//!
//! The harness replays recorded device events through a synthetic input
//! device into a real Xorg server and checks what the server reports back.
//! Everything that does not need the server lives here:
//!
//! - **`keymap`** – Linux input event codes, X11 KeySym values and the
//!   per-layout tables of `(key code, expected keysym)` pairs.
//!
//! - **`fixture`** – The xorg.conf generator that names one driver and one
//!   device node per test case.
//!
//! - **`domain`** – The assertion logic: keysym comparison, wheel-to-button
//!   click counting and device presence/uniqueness.
//!
//! - **`report`** – Per-case outcomes, the run report written after a run and
//!   the gtest-style case filter.

pub mod domain;
pub mod fixture;
pub mod keymap;
pub mod report;

pub use domain::check::AssertionFailure;
pub use domain::events::{DeviceInfo, DisplayEvent};
pub use fixture::xorg_conf::{ConfigWriteError, XorgConfig};
pub use keymap::layout::{KeyPair, LayoutTable};
pub use report::{RunReport, TestFilter, TestOutcome};
