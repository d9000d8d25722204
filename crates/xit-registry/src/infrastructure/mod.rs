//! Infrastructure layer for the registry tool.
//!
//! **Dependency rule**: this layer may depend on `application` and `domain`,
//! but MUST NOT be imported by them.
//!
//! # Sub-modules
//!
//! - **`store`** – Loads and saves registry files, in place or through
//!   stdin/stdout.
//!
//! - **`printer`** – Renders command tables as aligned, optionally coloured
//!   text.

pub mod printer;
pub mod store;
