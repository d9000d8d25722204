//! Observable display-side values: X events and input devices.

use std::fmt;

/// An event read from the display's event queue, reduced to the fields the
/// tests inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    KeyPress { keycode: u8 },
    KeyRelease { keycode: u8 },
    ButtonPress { button: u32 },
    ButtonRelease { button: u32 },
    /// Any other core event, identified by its protocol type code.
    Other { type_code: i32 },
}

impl DisplayEvent {
    /// Core protocol event type code (`KeyPress` = 2 … `ButtonRelease` = 5).
    pub fn type_code(&self) -> i32 {
        match self {
            Self::KeyPress { .. } => 2,
            Self::KeyRelease { .. } => 3,
            Self::ButtonPress { .. } => 4,
            Self::ButtonRelease { .. } => 5,
            Self::Other { type_code } => *type_code,
        }
    }

    /// The keycode carried by key events.
    pub fn keycode(&self) -> Option<u8> {
        match self {
            Self::KeyPress { keycode } | Self::KeyRelease { keycode } => Some(*keycode),
            _ => None,
        }
    }
}

impl fmt::Display for DisplayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyPress { keycode } => write!(f, "KeyPress(keycode {keycode})"),
            Self::KeyRelease { keycode } => write!(f, "KeyRelease(keycode {keycode})"),
            Self::ButtonPress { button } => write!(f, "ButtonPress(button {button})"),
            Self::ButtonRelease { button } => write!(f, "ButtonRelease(button {button})"),
            Self::Other { type_code } => write!(f, "event type {type_code}"),
        }
    }
}

/// One entry of the server's XI2 device list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: i32,
    pub name: String,
}

impl DeviceInfo {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes_match_core_protocol() {
        assert_eq!(DisplayEvent::KeyPress { keycode: 24 }.type_code(), 2);
        assert_eq!(DisplayEvent::KeyRelease { keycode: 24 }.type_code(), 3);
        assert_eq!(DisplayEvent::ButtonPress { button: 4 }.type_code(), 4);
        assert_eq!(DisplayEvent::ButtonRelease { button: 4 }.type_code(), 5);
        assert_eq!(DisplayEvent::Other { type_code: 6 }.type_code(), 6);
    }

    #[test]
    fn test_keycode_only_for_key_events() {
        assert_eq!(DisplayEvent::KeyRelease { keycode: 29 }.keycode(), Some(29));
        assert_eq!(DisplayEvent::ButtonPress { button: 5 }.keycode(), None);
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(
            DisplayEvent::ButtonRelease { button: 5 }.to_string(),
            "ButtonRelease(button 5)"
        );
    }
}
