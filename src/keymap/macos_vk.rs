//! macOS `kVK_*` CGKeyCode ↔ [`VirtualCode`] lookup tables.
//!
//! CGKeyCodes are not contiguous with ANSI key position, so this is a match
//! table in both directions rather than an indexed array.

use crate::event::VirtualCode;

/// Translates a macOS CGKeyCode into a [`VirtualCode`].
pub fn cgkeycode_to_vc(code: u16) -> VirtualCode {
    use VirtualCode::*;
    match code {
        0x00 => KeyA,
        0x0B => KeyB,
        0x08 => KeyC,
        0x02 => KeyD,
        0x0E => KeyE,
        0x03 => KeyF,
        0x05 => KeyG,
        0x04 => KeyH,
        0x22 => KeyI,
        0x26 => KeyJ,
        0x28 => KeyK,
        0x25 => KeyL,
        0x2E => KeyM,
        0x2D => KeyN,
        0x1F => KeyO,
        0x23 => KeyP,
        0x0C => KeyQ,
        0x0F => KeyR,
        0x01 => KeyS,
        0x11 => KeyT,
        0x20 => KeyU,
        0x09 => KeyV,
        0x0D => KeyW,
        0x07 => KeyX,
        0x10 => KeyY,
        0x06 => KeyZ,

        0x1D => Digit0,
        0x12 => Digit1,
        0x13 => Digit2,
        0x14 => Digit3,
        0x15 => Digit4,
        0x17 => Digit5,
        0x16 => Digit6,
        0x1A => Digit7,
        0x1C => Digit8,
        0x19 => Digit9,

        0x24 => Enter,
        0x35 => Escape,
        0x33 => Backspace,
        0x30 => Tab,
        0x31 => Space,
        0x1B => Minus,
        0x18 => Equal,
        0x21 => BracketLeft,
        0x1E => BracketRight,
        0x2A => Backslash,
        0x29 => Semicolon,
        0x27 => Quote,
        0x32 => Backquote,
        0x2B => Comma,
        0x2F => Period,
        0x2C => Slash,

        0x39 => CapsLock,

        0x7A => F1,
        0x78 => F2,
        0x63 => F3,
        0x76 => F4,
        0x60 => F5,
        0x61 => F6,
        0x62 => F7,
        0x64 => F8,
        0x65 => F9,
        0x6D => F10,
        0x67 => F11,
        0x6F => F12,

        0x72 => Insert, // kVK_Help on ANSI, closest analogue
        0x73 => Home,
        0x74 => PageUp,
        0x75 => Delete,
        0x77 => End,
        0x79 => PageDown,
        0x7C => ArrowRight,
        0x7B => ArrowLeft,
        0x7D => ArrowDown,
        0x7E => ArrowUp,

        0x47 => NumLock, // kVK_ANSI_KeypadClear
        0x4B => NumpadDivide,
        0x43 => NumpadMultiply,
        0x4E => NumpadSubtract,
        0x45 => NumpadAdd,
        0x4C => NumpadEnter,
        0x52 => Numpad0,
        0x53 => Numpad1,
        0x54 => Numpad2,
        0x55 => Numpad3,
        0x56 => Numpad4,
        0x57 => Numpad5,
        0x58 => Numpad6,
        0x59 => Numpad7,
        0x5B => Numpad8,
        0x5C => Numpad9,
        0x41 => NumpadDecimal,

        0x3B => ControlLeft,
        0x38 => ShiftLeft,
        0x3A => AltLeft,
        0x37 => MetaLeft,
        0x3E => ControlRight,
        0x3C => ShiftRight,
        0x3D => AltRight,
        0x36 => MetaRight,

        0x6E => ContextMenu,

        0x6A => VolumeMute, // function-row F-key media caps (fn-dependent)
        0x49 => VolumeUp,
        0x4A => VolumeDown,

        0x66 => ImeKana,
        0x68 => ImeHangul,

        _ => Undefined,
    }
}

/// Translates a [`VirtualCode`] into a macOS CGKeyCode, if one exists.
pub fn vc_to_cgkeycode(vc: VirtualCode) -> Option<u16> {
    (0u16..128).find(|&code| cgkeycode_to_vc(code) == vc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_mappings_resolve_correctly() {
        assert_eq!(cgkeycode_to_vc(0x00), VirtualCode::KeyA);
        assert_eq!(cgkeycode_to_vc(0x24), VirtualCode::Enter);
        assert_eq!(cgkeycode_to_vc(0x35), VirtualCode::Escape);
        assert_eq!(cgkeycode_to_vc(0x7A), VirtualCode::F1);
    }

    #[test]
    fn test_unmapped_code_returns_undefined() {
        assert_eq!(cgkeycode_to_vc(0x7F), VirtualCode::Undefined);
    }

    #[test]
    fn test_vc_to_cgkeycode_round_trips() {
        assert_eq!(vc_to_cgkeycode(VirtualCode::KeyA), Some(0x00));
        assert_eq!(vc_to_cgkeycode(VirtualCode::F12), Some(0x6F));
    }

    #[test]
    fn test_vc_to_cgkeycode_none_for_unrepresented() {
        assert_eq!(vc_to_cgkeycode(VirtualCode::ImeHenkan), None);
    }

    #[test]
    fn test_never_panics_across_known_keycode_range() {
        for code in 0u16..128 {
            let _ = cgkeycode_to_vc(code);
        }
    }
}
