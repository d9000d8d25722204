//! Key code and KeySym tables used by the keyboard tests.
//!
//! The harness speaks two vocabularies: Linux input-event codes on the device
//! side (what the synthetic keyboard emits) and X11 KeySyms on the display side
//! (what the server resolves a key press to under the active XKB layout).

pub mod keysym;
pub mod layout;
pub mod linux_input;

pub use keysym::Keysym;
pub use layout::{multimedia_keys, KeyPair, LayoutTable};
