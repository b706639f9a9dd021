//! macOS Text Input Source (TIS) character resolution via `UCKeyTranslate`.
//!
//! `UCKeyTranslate` takes and returns dead-key state explicitly (a
//! `UInt32`), so this resolver holds that state across calls itself rather
//! than relying on OS-owned state the way the Windows resolver does. All
//! calls are marshaled to the main thread through [`crate::mainthread::run_on_main`]
//! since the TIS APIs are not safe to call off it.

use crate::event::{ModifierMask, VirtualCode};
use crate::keymap::macos_vk::vc_to_cgkeycode;

use super::UnicodeResolver;

/// Resolves typed characters using the active macOS input source, tracking
/// dead-key state across keystrokes.
pub struct MacosUnicodeResolver {
    dead_key_state: u32,
}

impl MacosUnicodeResolver {
    pub fn new() -> Self {
        Self { dead_key_state: 0 }
    }
}

impl Default for MacosUnicodeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl UnicodeResolver for MacosUnicodeResolver {
    fn resolve(&mut self, vc: VirtualCode, mask: ModifierMask) -> Option<u16> {
        let keycode = vc_to_cgkeycode(vc)?;
        let modifier_flags = mac_modifier_flags(mask);

        let mut result: Option<u16> = None;
        let mut dead_key_state = self.dead_key_state;

        #[cfg(target_os = "macos")]
        {
            crate::mainthread::run_on_main(|| {
                result = translate_key(keycode, modifier_flags, &mut dead_key_state);
            });
        }

        self.dead_key_state = dead_key_state;

        if mask.contains(ModifierMask::CAPS_LOCK) {
            // UCKeyTranslate has no CapsLock bit in modifierKeyState; the
            // caller is expected to uppercase the result itself when the
            // CapsLock flag is set.
            result = result.and_then(|ch| char::from_u32(ch as u32)).map(|ch| {
                ch.to_uppercase().next().map(|u| u as u16).unwrap_or(ch as u16)
            }).or(result);
        }

        result
    }

    fn reset(&mut self) {
        self.dead_key_state = 0;
    }
}

fn mac_modifier_flags(mask: ModifierMask) -> u32 {
    // UCKeyTranslate's modifierKeyState takes the carbon-style shift bit
    // only; Control/Option/Command bits are deliberately left unset so e.g.
    // Ctrl-A and Option-A still resolve to the same character plain 'a'
    // would, matching what a caller expects a "typed character" to mean.
    let mut flags = 0u32;
    if mask.contains(ModifierMask::MASK_SHIFT) {
        flags |= 1 << 1;
    }
    (flags >> 8) & 0xFF
}

#[cfg(target_os = "macos")]
fn translate_key(keycode: u16, modifier_flags: u32, dead_key_state: &mut u32) -> Option<u16> {
    use core_foundation::base::TCFType;
    use core_foundation::data::CFData;

    extern "C" {
        fn TISCopyCurrentKeyboardInputSource() -> *mut c_void;
        fn TISGetInputSourceProperty(source: *mut c_void, property: *const c_void) -> *mut c_void;
        static kTISPropertyUnicodeKeyLayoutData: *const c_void;
        fn UCKeyTranslate(
            layout: *const u8,
            virtual_key: u16,
            key_action: u16,
            modifier_key_state: u32,
            keyboard_type: u32,
            key_translate_options: u32,
            dead_key_state: *mut u32,
            max_string_length: u32,
            actual_string_length: *mut u32,
            unicode_string: *mut u16,
        ) -> i32;
    }

    use std::os::raw::c_void;

    const K_UC_KEY_ACTION_DOWN: u16 = 0;
    const K_UC_KEY_TRANSLATE_NO_DEAD_KEYS_BIT: u32 = 0;

    unsafe {
        let source = TISCopyCurrentKeyboardInputSource();
        if source.is_null() {
            return None;
        }
        let layout_data_ref = TISGetInputSourceProperty(source, kTISPropertyUnicodeKeyLayoutData);
        if layout_data_ref.is_null() {
            return None;
        }
        let layout_data = CFData::wrap_under_get_rule(layout_data_ref as *mut _);
        let layout_ptr = layout_data.bytes().as_ptr();

        let mut chars = [0u16; 4];
        let mut length: u32 = 0;
        let status = UCKeyTranslate(
            layout_ptr,
            keycode,
            K_UC_KEY_ACTION_DOWN,
            modifier_flags,
            0,
            K_UC_KEY_TRANSLATE_NO_DEAD_KEYS_BIT,
            dead_key_state,
            chars.len() as u32,
            &mut length,
            chars.as_mut_ptr(),
        );

        if status == 0 && length > 0 {
            Some(chars[0])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_resolver_has_no_dead_key_state() {
        let resolver = MacosUnicodeResolver::new();
        assert_eq!(resolver.dead_key_state, 0);
    }

    #[test]
    fn test_unmapped_vc_returns_none() {
        let mut resolver = MacosUnicodeResolver::new();
        assert_eq!(resolver.resolve(VirtualCode::ImeKatakanaHiragana, ModifierMask(0)), None);
    }

    #[test]
    fn test_reset_clears_dead_key_state() {
        let mut resolver = MacosUnicodeResolver::new();
        resolver.dead_key_state = 7;
        resolver.reset();
        assert_eq!(resolver.dead_key_state, 0);
    }

    #[test]
    fn test_modifier_flags_encode_shift() {
        let flags = mac_modifier_flags(ModifierMask(ModifierMask::SHIFT_L));
        assert_ne!(flags, 0);
    }

    #[test]
    fn test_modifier_flags_never_set_control_or_option() {
        let flags = mac_modifier_flags(ModifierMask(ModifierMask::MASK_CTRL | ModifierMask::MASK_ALT));
        assert_eq!(flags, 0);
    }

    #[test]
    fn test_unmapped_vc_ignores_caps_lock() {
        let mut resolver = MacosUnicodeResolver::new();
        assert_eq!(resolver.resolve(VirtualCode::ImeKatakanaHiragana, ModifierMask(ModifierMask::CAPS_LOCK)), None);
    }
}
