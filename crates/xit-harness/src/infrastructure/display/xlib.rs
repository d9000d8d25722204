//! Xlib + XInput2 display connection.
//!
//! # The calls involved (for beginners)
//!
//! | Trait method        | Xlib call                                   |
//! |---------------------|---------------------------------------------|
//! | `select_root_input` | `XSelectInput(DefaultRootWindow, mask)`     |
//! | `settle`            | `XInternAtom("foo", only_if_exists)` + `XFlush` |
//! | `sync`              | `XSync(discard = False)`                    |
//! | `pending`           | `XPending`                                  |
//! | `next_event`        | `XNextEvent` (blocks)                       |
//! | `keycode_to_keysym` | `XKeycodeToKeysym`                          |
//! | `query_devices`     | `XIQueryDevice(XIAllDevices)`               |
//!
//! `XSync` is the synchronisation point the verifiers rely on: once it
//! returns, the server has processed every request sent so far and any
//! events it generated in the meantime sit in the client-side queue.
//!
//! # Losing the server
//!
//! Xlib's default I/O error handler calls `exit(1)`, which would take the
//! whole run down with a crashing server.  Every connection installs a
//! logging handler plus an exit handler (`XSetIOErrorExitHandler`, libX11
//! 1.7+) that returns instead of exiting.  The connection is then marked
//! lost: its methods stop talking to the server and
//! [`DisplayConnection::check_connection`] fails the current case.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_long, c_void};
use std::sync::{Mutex, Once};

use tracing::{debug, error, warn};
use x11::{xinput2, xlib};
use xit_core::{
    keymap::{keysym::NO_SYMBOL, Keysym},
    DeviceInfo, DisplayEvent,
};

use crate::application::session::{DisplayConnection, DisplayError, EventMask};

/// Atom looked up (never created) by `settle`.
const SETTLE_ATOM: &[u8] = b"foo\0";

type IoErrorExitHandler = unsafe extern "C" fn(*mut xlib::Display, *mut c_void);

#[link(name = "X11")]
extern "C" {
    fn XSetIOErrorExitHandler(
        display: *mut xlib::Display,
        handler: Option<IoErrorExitHandler>,
        user_data: *mut c_void,
    );
}

/// Addresses of connections whose server went away.
static LOST: Mutex<Vec<usize>> = Mutex::new(Vec::new());
static IO_ERROR_HANDLER: Once = Once::new();

fn lost_set() -> std::sync::MutexGuard<'static, Vec<usize>> {
    LOST.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn mark_lost(display: usize) {
    let mut lost = lost_set();
    if !lost.contains(&display) {
        lost.push(display);
    }
}

fn is_lost(display: usize) -> bool {
    lost_set().contains(&display)
}

fn forget(display: usize) {
    lost_set().retain(|&d| d != display);
}

unsafe extern "C" fn log_io_error(display: *mut xlib::Display) -> c_int {
    // Rebound: tracing's macro expansion shadows the name `display`.
    let conn = display;
    error!(display = ?conn, "X server connection lost");
    mark_lost(display as usize);
    0
}

unsafe extern "C" fn keep_running(display: *mut xlib::Display, _user_data: *mut c_void) {
    mark_lost(display as usize);
}

/// An open client connection.  Closed on drop.
pub struct XlibDisplay {
    display: *mut xlib::Display,
    name: String,
}

impl XlibDisplay {
    /// Connects to the display called `name` (e.g. `:133`).
    ///
    /// # Errors
    ///
    /// [`DisplayError::Open`] if `XOpenDisplay` fails.
    pub fn open(name: &str) -> Result<Self, DisplayError> {
        let c_name = CString::new(name).map_err(|_| DisplayError::Open(name.to_string()))?;

        // SAFETY: `c_name` is a valid NUL-terminated string that outlives the call.
        let display = unsafe { xlib::XOpenDisplay(c_name.as_ptr()) };
        if display.is_null() {
            return Err(DisplayError::Open(name.to_string()));
        }

        IO_ERROR_HANDLER.call_once(|| {
            // SAFETY: the handler only logs and records the address.
            unsafe { xlib::XSetIOErrorHandler(Some(log_io_error)) };
        });
        // A previous connection may have lived at the same address.
        forget(display as usize);
        // SAFETY: `display` is non-null; the exit handler ignores its user data.
        unsafe { XSetIOErrorExitHandler(display, Some(keep_running), std::ptr::null_mut()) };

        let (mut major, mut minor): (c_int, c_int) = (2, 0);
        // SAFETY: `display` is non-null; major/minor are valid out-pointers.
        let status = unsafe { xinput2::XIQueryVersion(display, &mut major, &mut minor) };
        if status != 0 {
            warn!(display = name, "server does not support XInput 2.0");
        } else {
            debug!(display = name, major, minor, "connected");
        }

        Ok(Self {
            display,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lost(&self) -> bool {
        is_lost(self.display as usize)
    }
}

impl Drop for XlibDisplay {
    fn drop(&mut self) {
        // SAFETY: `display` came from XOpenDisplay and is not used after this.
        // Closing a lost connection only frees client-side state.
        unsafe { xlib::XCloseDisplay(self.display) };
        forget(self.display as usize);
        debug!(display = %self.name, "disconnected");
    }
}

fn translate(event: &xlib::XEvent) -> DisplayEvent {
    let type_code = event.get_type();
    // SAFETY: each union field is only read for the event types it belongs to.
    unsafe {
        match type_code {
            xlib::KeyPress | xlib::KeyRelease => {
                let Ok(keycode) = u8::try_from(event.key.keycode) else {
                    return DisplayEvent::Other { type_code };
                };
                if type_code == xlib::KeyPress {
                    DisplayEvent::KeyPress { keycode }
                } else {
                    DisplayEvent::KeyRelease { keycode }
                }
            }
            xlib::ButtonPress => DisplayEvent::ButtonPress {
                button: event.button.button,
            },
            xlib::ButtonRelease => DisplayEvent::ButtonRelease {
                button: event.button.button,
            },
            _ => DisplayEvent::Other { type_code },
        }
    }
}

impl DisplayConnection for XlibDisplay {
    fn select_root_input(&mut self, mask: EventMask) {
        if self.lost() {
            return;
        }
        // SAFETY: `display` is a valid open connection for the lifetime of self.
        unsafe {
            let root = xlib::XDefaultRootWindow(self.display);
            xlib::XSelectInput(self.display, root, mask.bits() as c_long);
        }
    }

    fn settle(&mut self) {
        if self.lost() {
            return;
        }
        // SAFETY: SETTLE_ATOM is NUL-terminated; `display` is valid.
        unsafe {
            xlib::XInternAtom(
                self.display,
                SETTLE_ATOM.as_ptr() as *const c_char,
                xlib::True,
            );
            xlib::XFlush(self.display);
        }
    }

    fn sync(&mut self) {
        if self.lost() {
            return;
        }
        // SAFETY: `display` is valid.
        unsafe { xlib::XSync(self.display, xlib::False) };
    }

    fn pending(&mut self) -> usize {
        if self.lost() {
            return 0;
        }
        // SAFETY: `display` is valid.
        let pending = unsafe { xlib::XPending(self.display) };
        usize::try_from(pending).unwrap_or(0)
    }

    fn next_event(&mut self) -> Option<DisplayEvent> {
        if self.lost() {
            return None;
        }
        // SAFETY: XEvent is a plain C union; XNextEvent fills it completely.
        let mut event: xlib::XEvent = unsafe { std::mem::zeroed() };
        unsafe { xlib::XNextEvent(self.display, &mut event) };
        // XNextEvent returns without an event when the connection dies.
        if self.lost() {
            return None;
        }
        Some(translate(&event))
    }

    fn keycode_to_keysym(&mut self, keycode: u8, index: i32) -> Keysym {
        if self.lost() {
            return NO_SYMBOL;
        }
        // SAFETY: `display` is valid; out-of-range keycodes yield NoSymbol.
        let sym = unsafe { xlib::XKeycodeToKeysym(self.display, keycode, index) };
        Keysym::try_from(sym).unwrap_or(NO_SYMBOL)
    }

    fn query_devices(&mut self) -> Result<Vec<DeviceInfo>, DisplayError> {
        self.check_connection()?;
        let mut count: c_int = 0;
        // SAFETY: `display` is valid; `count` is a valid out-pointer.
        let info = unsafe { xinput2::XIQueryDevice(self.display, xinput2::XIAllDevices, &mut count) };
        if info.is_null() {
            self.check_connection()?;
            return Err(DisplayError::QueryDevices);
        }

        let len = usize::try_from(count).unwrap_or(0);
        // SAFETY: XIQueryDevice returned `count` contiguous entries at `info`,
        // each with a NUL-terminated name; the array is freed right after.
        let devices = unsafe {
            std::slice::from_raw_parts(info, len)
                .iter()
                .map(|d| DeviceInfo::new(d.deviceid, CStr::from_ptr(d.name).to_string_lossy()))
                .collect()
        };
        unsafe { xinput2::XIFreeDeviceInfo(info) };
        Ok(devices)
    }

    fn check_connection(&self) -> Result<(), DisplayError> {
        if self.lost() {
            return Err(DisplayError::ConnectionLost(self.name.clone()));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
