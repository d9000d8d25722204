//! Linux input-event constants from `linux/input-event-codes.h`.
//!
//! Only the codes the harness actually replays or needs to describe a
//! recording are listed here.
//! Reference: https://github.com/torvalds/linux/blob/master/include/uapi/linux/input-event-codes.h
//!
//! # Event codes vs. X keycodes
//!
//! The kernel numbers keys from 1 (`KEY_ESC`).  The X server's evdev driver
//! shifts every kernel key code up by 8 because the core protocol reserves
//! keycodes 0–7.  [`x11_keycode`] performs that translation.

// ── Event types ───────────────────────────────────────────────────────────────

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;
pub const EV_MSC: u16 = 0x04;
pub const EV_SW: u16 = 0x05;
pub const EV_LED: u16 = 0x11;
pub const EV_SND: u16 = 0x12;
pub const EV_REP: u16 = 0x14;
pub const EV_FF: u16 = 0x15;
/// Highest event type number (`EV_MAX`).
pub const EV_MAX: u16 = 0x1f;

pub const SYN_REPORT: u16 = 0;

// ── Relative axes ─────────────────────────────────────────────────────────────

pub const REL_X: u16 = 0x00;
pub const REL_Y: u16 = 0x01;
pub const REL_HWHEEL: u16 = 0x06;
pub const REL_WHEEL: u16 = 0x08;

// ── Keys ──────────────────────────────────────────────────────────────────────

pub const KEY_ESC: u16 = 1;
pub const KEY_Q: u16 = 16;
pub const KEY_W: u16 = 17;
pub const KEY_E: u16 = 18;
pub const KEY_R: u16 = 19;
pub const KEY_T: u16 = 20;
pub const KEY_Y: u16 = 21;
pub const KEY_A: u16 = 30;
pub const KEY_Z: u16 = 44;

pub const KEY_MUTE: u16 = 113;
pub const KEY_VOLUMEDOWN: u16 = 114;
pub const KEY_VOLUMEUP: u16 = 115;
pub const KEY_NEXTSONG: u16 = 163;
pub const KEY_PLAYPAUSE: u16 = 164;
pub const KEY_PREVIOUSSONG: u16 = 165;

// ── Buttons ───────────────────────────────────────────────────────────────────

pub const BTN_LEFT: u16 = 0x110;
pub const BTN_RIGHT: u16 = 0x111;
pub const BTN_MIDDLE: u16 = 0x112;

/// Offset between kernel key codes and X11 keycodes.
pub const X11_KEYCODE_OFFSET: u16 = 8;

/// Translates a kernel key code to the keycode the X server reports for it.
///
/// Returns `None` when the result does not fit the core protocol's 8-bit
/// keycode range.
pub fn x11_keycode(code: u16) -> Option<u8> {
    u8::try_from(code.checked_add(X11_KEYCODE_OFFSET)?).ok()
}

/// Returns the `KEY_*` name for the codes listed in this module.
pub fn key_name(code: u16) -> Option<&'static str> {
    let name = match code {
        KEY_ESC => "KEY_ESC",
        KEY_Q => "KEY_Q",
        KEY_W => "KEY_W",
        KEY_E => "KEY_E",
        KEY_R => "KEY_R",
        KEY_T => "KEY_T",
        KEY_Y => "KEY_Y",
        KEY_A => "KEY_A",
        KEY_Z => "KEY_Z",
        KEY_MUTE => "KEY_MUTE",
        KEY_VOLUMEDOWN => "KEY_VOLUMEDOWN",
        KEY_VOLUMEUP => "KEY_VOLUMEUP",
        KEY_NEXTSONG => "KEY_NEXTSONG",
        KEY_PLAYPAUSE => "KEY_PLAYPAUSE",
        KEY_PREVIOUSSONG => "KEY_PREVIOUSSONG",
        BTN_LEFT => "BTN_LEFT",
        BTN_RIGHT => "BTN_RIGHT",
        BTN_MIDDLE => "BTN_MIDDLE",
        _ => return None,
    };
    Some(name)
}
