//! X11 KeySym values checked by the keyboard tests.
//!
//! Values come from `X11/keysymdef.h` and `X11/XF86keysym.h`.
//! Reference: https://gitlab.freedesktop.org/xorg/proto/xorgproto/-/blob/master/include/X11/keysymdef.h
//!
//! Letters use their lowercase ASCII value; the tests always resolve the
//! keysym at index 0 of the keycode's mapping, which is the unshifted level.
//! Vendor (XF86) keysyms live in the `0x1008_xxxx` range.
//!
//! Constants keep the header names (`XK_a`, `XF86XK_AudioMute`), as the
//! `x11` crate does.

#![allow(non_upper_case_globals)]

/// An X11 KeySym value.
pub type Keysym = u32;

/// `NoSymbol`: the keycode has no keysym at the requested index.
pub const NO_SYMBOL: Keysym = 0;

pub const XK_a: Keysym = 0x0061;
pub const XK_e: Keysym = 0x0065;
pub const XK_q: Keysym = 0x0071;
pub const XK_r: Keysym = 0x0072;
pub const XK_t: Keysym = 0x0074;
pub const XK_w: Keysym = 0x0077;
pub const XK_y: Keysym = 0x0079;
pub const XK_z: Keysym = 0x007A;

pub const XF86XK_AudioLowerVolume: Keysym = 0x1008_FF11;
pub const XF86XK_AudioMute: Keysym = 0x1008_FF12;
pub const XF86XK_AudioRaiseVolume: Keysym = 0x1008_FF13;
pub const XF86XK_AudioPlay: Keysym = 0x1008_FF14;
pub const XF86XK_AudioPrev: Keysym = 0x1008_FF16;
pub const XF86XK_AudioNext: Keysym = 0x1008_FF17;

/// Returns the `keysymdef.h` name of a keysym from this table.
///
/// Used to make assertion messages readable; unknown values return `None`
/// and are printed in hex by the caller.
pub fn keysym_name(sym: Keysym) -> Option<&'static str> {
    let name = match sym {
        NO_SYMBOL => "NoSymbol",
        XK_a => "a",
        XK_e => "e",
        XK_q => "q",
        XK_r => "r",
        XK_t => "t",
        XK_w => "w",
        XK_y => "y",
        XK_z => "z",
        XF86XK_AudioLowerVolume => "XF86AudioLowerVolume",
        XF86XK_AudioMute => "XF86AudioMute",
        XF86XK_AudioRaiseVolume => "XF86AudioRaiseVolume",
        XF86XK_AudioPlay => "XF86AudioPlay",
        XF86XK_AudioPrev => "XF86AudioPrev",
        XF86XK_AudioNext => "XF86AudioNext",
        _ => return None,
    };
    Some(name)
}

/// Formats a keysym as `name (0xNNNN)`, or just the hex value when unnamed.
pub fn describe(sym: Keysym) -> String {
    match keysym_name(sym) {
        Some(name) => format!("{name} ({sym:#06x})"),
        None => format!("{sym:#06x}"),
    }
}
