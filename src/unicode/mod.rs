//! Per-platform typed-character resolution (C6).
//!
//! `KEY_TYPED` events need a resolved Unicode character, but "what character
//! does this keycode produce" depends on the active keyboard layout and
//! pending dead-key state, both of which are platform APIs. A
//! [`UnicodeResolver`] hides that behind one trait so the dispatcher never
//! needs a per-platform branch.

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod x11;

pub mod mock;

use crate::event::{ModifierMask, VirtualCode};

/// Resolves a keycode plus the live modifier mask into a typed UTF-16 code
/// unit, consuming any pending dead-key state along the way.
///
/// Returns `None` when the key produces no visible character (function
/// keys, pure modifiers, navigation keys) or when the dead-key sequence is
/// not yet complete (the resolver is expected to hold that state internally
/// and emit the combined character only once the base key arrives).
pub trait UnicodeResolver: Send {
    fn resolve(&mut self, vc: VirtualCode, mask: ModifierMask) -> Option<u16>;

    /// Clears any pending dead-key state. Called when a session stops, so a
    /// stray combining accent from a previous session can never leak into
    /// the first keystroke of the next one.
    fn reset(&mut self) {}
}
