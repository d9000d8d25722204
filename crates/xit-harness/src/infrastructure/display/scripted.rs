//! Queue-backed display for tests.
//!
//! Models the one property of a real connection the verifiers depend on:
//! events produced by a device are in flight until the client syncs (or
//! blocks in `next_event`), and only then become pending.  Producers push
//! into an [`EventWire`]; the display moves the wire's contents into its
//! client-side queue on every `sync`, dropping events whose type was not
//! selected on the root window.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use xit_core::{
    keymap::{keysym::NO_SYMBOL, Keysym},
    DeviceInfo, DisplayEvent,
};

use crate::application::session::{DisplayConnection, DisplayError, EventMask};

/// Events sent towards a [`ScriptedDisplay`] but not yet delivered.
pub type EventWire = Rc<RefCell<VecDeque<DisplayEvent>>>;

/// A display whose events, keymap and device list are set up by the test.
#[derive(Debug, Default)]
pub struct ScriptedDisplay {
    wire: EventWire,
    queue: VecDeque<DisplayEvent>,
    selected: EventMask,
    keysyms: HashMap<u8, Keysym>,
    devices: Option<Vec<DeviceInfo>>,
    settles: usize,
    syncs: usize,
    lost: bool,
}

fn selected_by(mask: EventMask, event: &DisplayEvent) -> bool {
    match event {
        DisplayEvent::KeyPress { .. } => mask.contains(EventMask::KEY_PRESS),
        DisplayEvent::KeyRelease { .. } => mask.contains(EventMask::KEY_RELEASE),
        DisplayEvent::ButtonPress { .. } => mask.contains(EventMask::BUTTON_PRESS),
        DisplayEvent::ButtonRelease { .. } => mask.contains(EventMask::BUTTON_RELEASE),
        DisplayEvent::Other { .. } => true,
    }
}

impl ScriptedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// A display fed through `wire`.
    pub fn with_wire(wire: EventWire) -> Self {
        Self {
            wire,
            ..Self::default()
        }
    }

    /// A handle producers push events into.
    pub fn wire(&self) -> EventWire {
        Rc::clone(&self.wire)
    }

    /// Maps `keycode` to `keysym` at index 0.
    pub fn set_keysym(&mut self, keycode: u8, keysym: Keysym) {
        self.keysyms.insert(keycode, keysym);
    }

    /// Sets the list returned by `query_devices`; unset, the query fails.
    pub fn set_devices(&mut self, devices: Vec<DeviceInfo>) {
        self.devices = Some(devices);
    }

    pub fn selected(&self) -> EventMask {
        self.selected
    }

    pub fn settles(&self) -> usize {
        self.settles
    }

    pub fn syncs(&self) -> usize {
        self.syncs
    }

    /// Behaves from now on like a connection whose server has died.
    pub fn disconnect(&mut self) {
        self.lost = true;
        self.queue.clear();
    }

    fn deliver(&mut self) {
        if self.lost {
            return;
        }
        let arrived: Vec<DisplayEvent> = self.wire.borrow_mut().drain(..).collect();
        let mask = self.selected;
        self.queue
            .extend(arrived.into_iter().filter(|event| selected_by(mask, event)));
    }
}

impl DisplayConnection for ScriptedDisplay {
    fn select_root_input(&mut self, mask: EventMask) {
        self.selected = mask;
    }

    fn settle(&mut self) {
        self.settles += 1;
    }

    fn sync(&mut self) {
        self.syncs += 1;
        self.deliver();
    }

    fn pending(&mut self) -> usize {
        self.queue.len()
    }

    fn next_event(&mut self) -> Option<DisplayEvent> {
        if self.queue.is_empty() {
            self.deliver();
        }
        self.queue.pop_front()
    }

    fn keycode_to_keysym(&mut self, keycode: u8, index: i32) -> Keysym {
        if index != 0 {
            return NO_SYMBOL;
        }
        self.keysyms.get(&keycode).copied().unwrap_or(NO_SYMBOL)
    }

    fn query_devices(&mut self) -> Result<Vec<DeviceInfo>, DisplayError> {
        self.check_connection()?;
        self.devices.clone().ok_or(DisplayError::QueryDevices)
    }

    fn check_connection(&self) -> Result<(), DisplayError> {
        if self.lost {
            return Err(DisplayError::ConnectionLost("scripted".to_string()));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
