//! Test-case fixture artifacts that do not need a running server.
//!
//! - **`xorg_conf`** – Generates the xorg.conf each test case hands to the
//!   server via `-config`: one dummy screen and one `InputDevice` section for
//!   the driver under test.

pub mod xorg_conf;

pub use xorg_conf::{ConfigWriteError, InputOption, XorgConfig};
