//! xit-registry library entry point.
//!
//! The registry records which driver tests are expected to pass and which
//! are known to fail, together with the bugs and fixes behind each known
//! failure.  Comparing a harness run against it separates regressions from
//! failures everyone already knows about.
//!
//! Layers:
//!
//! - **`domain`** – The registry model, outcome comparison and edits.
//! - **`application`** – One function per command, producing tables or the
//!   registry file to write back.
//! - **`infrastructure`** – Registry file I/O and the text printer.

pub mod application;
pub mod domain;
pub mod infrastructure;
