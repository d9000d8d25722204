//! Application layer: the registry commands.
//!
//! # Sub-modules
//!
//! - **`commands`** – `list`, `info`, `verify`, `compare`, `create`, `merge`,
//!   `edit` and `meta` over parsed registries.
//!
//! - **`table`** – The printable tables those commands produce.

pub mod commands;
pub mod table;
