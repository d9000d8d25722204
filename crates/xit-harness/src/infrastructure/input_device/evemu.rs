//! Parser for evemu device descriptions (`.desc` files).
//!
//! A description lists what a piece of hardware claims to be: its name, bus
//! and ids, input properties, the event codes it supports per event type, and
//! the ranges of its absolute axes.  The harness builds a uinput device from
//! it so the kernel exposes a node indistinguishable from the real hardware.
//!
//! # File format (for beginners)
//!
//! ```text
//! # EVEMU 1.0
//! N: PIXART USB OPTICAL MOUSE          name
//! I: 0003 093a 2510 0110               bus vendor product version (hex)
//! P: 00 00 00 00 00 00 00 00           input property bitmask bytes
//! B: 00 17 00 00 00 00 00 00 00        event type 0x00: supported types
//! B: 02 03 01 00 00 00 00 00 00        event type 0x02: REL_X REL_Y REL_WHEEL
//! A: 00 0 1023 0 0 0                   abs code min max fuzz flat [resolution]
//! ```
//!
//! Bitmask bytes are little-endian: bit `j` of byte `i` stands for code
//! `i * 8 + j`.  A type's mask may span several `B:` lines, which are
//! concatenated in order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use xit_core::keymap::linux_input::{EV_MAX, EV_SYN};

/// Error type for reading a device description.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    #[error("description has no N: line")]
    MissingName,
}

/// Range information of one absolute axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsAxis {
    pub code: u16,
    pub minimum: i32,
    pub maximum: i32,
    pub fuzz: i32,
    pub flat: i32,
    pub resolution: i32,
}

/// A parsed device description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub name: String,
    pub bus: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
    properties: Vec<u8>,
    masks: BTreeMap<u16, Vec<u8>>,
    pub abs_axes: Vec<AbsAxis>,
}

impl DeviceDescriptor {
    /// Reads and parses the description at `path`.
    ///
    /// # Errors
    ///
    /// [`DescriptorError::Io`] if the file cannot be read, otherwise as
    /// [`DeviceDescriptor::parse`].
    pub fn load(path: &Path) -> Result<Self, DescriptorError> {
        let text = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let descriptor = Self::parse(&text)?;
        debug!(path = %path.display(), name = %descriptor.name, "loaded device description");
        Ok(descriptor)
    }

    /// Parses description text.
    ///
    /// # Errors
    ///
    /// [`DescriptorError::Syntax`] for a malformed or unknown line,
    /// [`DescriptorError::MissingName`] if no `N:` line is present.
    pub fn parse(text: &str) -> Result<Self, DescriptorError> {
        let mut descriptor = Self::default();
        let mut has_name = false;

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let syntax = |reason: String| DescriptorError::Syntax { line, reason };

            let (tag, rest) = trimmed
                .split_once(':')
                .ok_or_else(|| syntax(format!("expected `X: ...`, got {trimmed:?}")))?;
            let rest = rest.trim();

            match tag {
                "N" => {
                    descriptor.name = rest.to_string();
                    has_name = true;
                }
                "I" => {
                    let ids = parse_hex_words(rest).map_err(syntax)?;
                    let [bus, vendor, product, version] = ids[..] else {
                        return Err(syntax(format!("I: needs 4 ids, got {}", ids.len())));
                    };
                    descriptor.bus = bus;
                    descriptor.vendor = vendor;
                    descriptor.product = product;
                    descriptor.version = version;
                }
                "P" => {
                    let bytes = parse_hex_bytes(rest).map_err(syntax)?;
                    descriptor.properties.extend(bytes);
                }
                "B" => {
                    let (event_type, bytes) = rest
                        .split_once(char::is_whitespace)
                        .ok_or_else(|| syntax("B: needs a type and mask bytes".to_string()))?;
                    let event_type = u16::from_str_radix(event_type, 16)
                        .map_err(|e| syntax(format!("bad event type {event_type:?}: {e}")))?;
                    if event_type > EV_MAX {
                        return Err(syntax(format!("event type {event_type:#x} out of range")));
                    }
                    let bytes = parse_hex_bytes(bytes).map_err(syntax)?;
                    descriptor.masks.entry(event_type).or_default().extend(bytes);
                }
                "A" => {
                    let axis = parse_abs_axis(rest).map_err(syntax)?;
                    descriptor.abs_axes.push(axis);
                }
                other => return Err(syntax(format!("unknown line type {other:?}"))),
            }
        }

        if !has_name {
            return Err(DescriptorError::MissingName);
        }
        Ok(descriptor)
    }

    /// Codes set in the mask of `event_type`, in ascending order.
    ///
    /// `codes(EV_SYN)` yields the supported event types.
    pub fn codes(&self, event_type: u16) -> impl Iterator<Item = u16> + '_ {
        let mask = self.masks.get(&event_type).map(Vec::as_slice).unwrap_or(&[]);
        set_bits(mask)
    }

    /// Whether the device reports events of `event_type`.
    pub fn has_event_type(&self, event_type: u16) -> bool {
        self.codes(EV_SYN).any(|t| t == event_type)
    }

    /// Input properties (`INPUT_PROP_*`) the device declares.
    pub fn properties(&self) -> impl Iterator<Item = u16> + '_ {
        set_bits(&self.properties)
    }
}

fn set_bits(mask: &[u8]) -> impl Iterator<Item = u16> + '_ {
    mask.iter().enumerate().flat_map(|(byte_index, &byte)| {
        (0..8u16)
            .filter(move |&bit| byte & (1u8 << bit) != 0)
            .map(move |bit| byte_index as u16 * 8 + bit)
    })
}

fn parse_hex_bytes(text: &str) -> Result<Vec<u8>, String> {
    text.split_whitespace()
        .map(|b| u8::from_str_radix(b, 16).map_err(|e| format!("bad byte {b:?}: {e}")))
        .collect()
}

fn parse_hex_words(text: &str) -> Result<Vec<u16>, String> {
    text.split_whitespace()
        .map(|w| u16::from_str_radix(w, 16).map_err(|e| format!("bad id {w:?}: {e}")))
        .collect()
}

fn parse_abs_axis(text: &str) -> Result<AbsAxis, String> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if !(5..=6).contains(&fields.len()) {
        return Err(format!("A: needs 5 or 6 fields, got {}", fields.len()));
    }
    let code =
        u16::from_str_radix(fields[0], 16).map_err(|e| format!("bad axis {:?}: {e}", fields[0]))?;
    let number = |i: usize| -> Result<i32, String> {
        fields[i]
            .parse::<i32>()
            .map_err(|e| format!("bad value {:?}: {e}", fields[i]))
    };
    Ok(AbsAxis {
        code,
        minimum: number(1)?,
        maximum: number(2)?,
        fuzz: number(3)?,
        flat: number(4)?,
        resolution: if fields.len() == 6 { number(5)? } else { 0 },
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
