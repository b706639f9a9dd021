//! Windows `ToUnicodeEx`-based character resolution.
//!
//! The layout used is the foreground window's, resolved via
//! `GetKeyboardLayout(GetWindowThreadProcessId(GetForegroundWindow()))`, with
//! a fallback to `GetKeyboardLayout(0)` (the calling thread's own layout) for
//! the console/no-foreground-window case. `ToUnicodeEx` itself owns dead-key
//! state internally (keyed by thread), so a dead key followed by its base
//! character naturally resolves across two calls; this resolver does not
//! need to track that state itself; it forwards the live modifier mask into
//! a synthetic key-state array each call.

use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyboardLayout, ToUnicodeEx, VK_CONTROL, VK_MENU, VK_SHIFT,
};
use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowThreadProcessId};

use crate::event::{ModifierMask, VirtualCode};
use crate::keymap::windows_vk::vc_to_vk;

use super::UnicodeResolver;

/// Resolves typed characters using the active Windows keyboard layout.
pub struct WindowsUnicodeResolver;

impl WindowsUnicodeResolver {
    pub fn new() -> Self {
        Self
    }

    fn active_layout(&self) -> isize {
        unsafe {
            let fg = GetForegroundWindow();
            if fg.0 != 0 {
                let tid = GetWindowThreadProcessId(fg, None);
                if tid != 0 {
                    return GetKeyboardLayout(tid).0;
                }
            }
            GetKeyboardLayout(0).0
        }
    }
}

impl Default for WindowsUnicodeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl UnicodeResolver for WindowsUnicodeResolver {
    fn resolve(&mut self, vc: VirtualCode, mask: ModifierMask) -> Option<u16> {
        let vk = vc_to_vk(vc)?;
        let layout = windows::Win32::UI::WindowsAndMessaging::HKL(self.active_layout());

        let mut key_state = [0u8; 256];
        if mask.contains(ModifierMask::MASK_SHIFT) {
            key_state[VK_SHIFT.0 as usize] = 0x80;
        }
        if mask.contains(ModifierMask::MASK_CTRL) {
            key_state[VK_CONTROL.0 as usize] = 0x80;
        }
        if mask.contains(ModifierMask::MASK_ALT) {
            key_state[VK_MENU.0 as usize] = 0x80;
        }

        // Bit 2 of wFlags tells ToUnicodeEx not to modify the calling
        // thread's dead-key state, so resolving a character is a read-only
        // operation rather than something that consumes a pending dead key.
        const DONT_CHANGE_KERNEL_KEYBOARD_STATE: u32 = 0x4;

        let mut buffer = [0u16; 4];
        let result = unsafe {
            ToUnicodeEx(
                vk as u32,
                0,
                &key_state,
                &mut buffer,
                DONT_CHANGE_KERNEL_KEYBOARD_STATE,
                layout,
            )
        };

        if result >= 1 {
            Some(buffer[0])
        } else {
            None
        }
    }

    fn reset(&mut self) {
        // ToUnicodeEx's dead-key state lives inside the OS keyed by thread;
        // a zero-length call with VK_PACKET-style clearing isn't exposed, so
        // there is nothing for this resolver to clear locally.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_vc_returns_none() {
        let mut resolver = WindowsUnicodeResolver::new();
        assert_eq!(resolver.resolve(VirtualCode::ImeKatakanaHiragana, ModifierMask(0)), None);
    }
}
