//! Windows virtual-key ↔ [`VirtualCode`] lookup tables.
//!
//! `native → VC` is a 256-entry array indexed directly by the VK byte
//! (O(1)); several VK codes alias onto the same VC (`VK_SHIFT`/`VK_LSHIFT`
//! both become `ShiftLeft`, refined by the caller using `GetKeyState` when
//! the side needs disambiguating). `VC → native` is a linear scan since it
//! runs far less often (only during synthesis).

use crate::event::VirtualCode;

/// Translates a raw Windows virtual-key code into a [`VirtualCode`].
///
/// `VK_RETURN` always resolves to [`VirtualCode::Enter`]; callers must apply
/// the extended-key-flag refinement to promote it to
/// [`VirtualCode::NumpadEnter`] when `KBDLLHOOKSTRUCT::flags` carries
/// `LLKHF_EXTENDED`.
pub fn vk_to_vc(vk: u8) -> VirtualCode {
    VK_TO_VC_TABLE[vk as usize]
}

/// Translates a [`VirtualCode`] into a Windows virtual-key code, if one
/// exists. Returns `None` for codes with no native Windows representation
/// (e.g. the IME/Asian extension band members not present on this table).
pub fn vc_to_vk(vc: VirtualCode) -> Option<u8> {
    (0u16..256).map(|v| v as u8).find(|&vk| VK_TO_VC_TABLE[vk as usize] == vc)
}

/// VK codes that require `KEYEVENTF_EXTENDEDKEY` when synthesized, per
/// the Windows `SendInput` documentation.
pub fn is_extended_vk(vk: u8) -> bool {
    matches!(
        vk,
        0x21..=0x28 // Page Up/Down, End, Home, arrows
            | 0x2D | 0x2E // Insert, Delete
            | 0x5B | 0x5C // L/R Win
            | 0xA3 | 0xA5 // R-Ctrl, R-Alt
            | 0x6F // numpad divide
    )
}

const U: VirtualCode = VirtualCode::Undefined;

static VK_TO_VC_TABLE: [VirtualCode; 256] = build_table();

const fn build_table() -> [VirtualCode; 256] {
    let mut t = [U; 256];

    t[0x08] = VirtualCode::Backspace;
    t[0x09] = VirtualCode::Tab;
    t[0x0D] = VirtualCode::Enter;
    t[0x13] = VirtualCode::Pause;
    t[0x14] = VirtualCode::CapsLock;
    t[0x1B] = VirtualCode::Escape;
    t[0x20] = VirtualCode::Space;
    t[0x21] = VirtualCode::PageUp;
    t[0x22] = VirtualCode::PageDown;
    t[0x23] = VirtualCode::End;
    t[0x24] = VirtualCode::Home;
    t[0x25] = VirtualCode::ArrowLeft;
    t[0x26] = VirtualCode::ArrowUp;
    t[0x27] = VirtualCode::ArrowRight;
    t[0x28] = VirtualCode::ArrowDown;
    t[0x2C] = VirtualCode::PrintScreen;
    t[0x2D] = VirtualCode::Insert;
    t[0x2E] = VirtualCode::Delete;

    // Digits 0-9
    t[0x30] = VirtualCode::Digit0;
    t[0x31] = VirtualCode::Digit1;
    t[0x32] = VirtualCode::Digit2;
    t[0x33] = VirtualCode::Digit3;
    t[0x34] = VirtualCode::Digit4;
    t[0x35] = VirtualCode::Digit5;
    t[0x36] = VirtualCode::Digit6;
    t[0x37] = VirtualCode::Digit7;
    t[0x38] = VirtualCode::Digit8;
    t[0x39] = VirtualCode::Digit9;

    // Letters A-Z
    t[0x41] = VirtualCode::KeyA;
    t[0x42] = VirtualCode::KeyB;
    t[0x43] = VirtualCode::KeyC;
    t[0x44] = VirtualCode::KeyD;
    t[0x45] = VirtualCode::KeyE;
    t[0x46] = VirtualCode::KeyF;
    t[0x47] = VirtualCode::KeyG;
    t[0x48] = VirtualCode::KeyH;
    t[0x49] = VirtualCode::KeyI;
    t[0x4A] = VirtualCode::KeyJ;
    t[0x4B] = VirtualCode::KeyK;
    t[0x4C] = VirtualCode::KeyL;
    t[0x4D] = VirtualCode::KeyM;
    t[0x4E] = VirtualCode::KeyN;
    t[0x4F] = VirtualCode::KeyO;
    t[0x50] = VirtualCode::KeyP;
    t[0x51] = VirtualCode::KeyQ;
    t[0x52] = VirtualCode::KeyR;
    t[0x53] = VirtualCode::KeyS;
    t[0x54] = VirtualCode::KeyT;
    t[0x55] = VirtualCode::KeyU;
    t[0x56] = VirtualCode::KeyV;
    t[0x57] = VirtualCode::KeyW;
    t[0x58] = VirtualCode::KeyX;
    t[0x59] = VirtualCode::KeyY;
    t[0x5A] = VirtualCode::KeyZ;

    t[0x5B] = VirtualCode::MetaLeft;
    t[0x5C] = VirtualCode::MetaRight;
    t[0x5D] = VirtualCode::ContextMenu;

    // Numpad
    t[0x60] = VirtualCode::Numpad0;
    t[0x61] = VirtualCode::Numpad1;
    t[0x62] = VirtualCode::Numpad2;
    t[0x63] = VirtualCode::Numpad3;
    t[0x64] = VirtualCode::Numpad4;
    t[0x65] = VirtualCode::Numpad5;
    t[0x66] = VirtualCode::Numpad6;
    t[0x67] = VirtualCode::Numpad7;
    t[0x68] = VirtualCode::Numpad8;
    t[0x69] = VirtualCode::Numpad9;
    t[0x6A] = VirtualCode::NumpadMultiply;
    t[0x6B] = VirtualCode::NumpadAdd;
    t[0x6D] = VirtualCode::NumpadSubtract;
    t[0x6E] = VirtualCode::NumpadDecimal;
    t[0x6F] = VirtualCode::NumpadDivide;

    // Function keys F1-F12
    t[0x70] = VirtualCode::F1;
    t[0x71] = VirtualCode::F2;
    t[0x72] = VirtualCode::F3;
    t[0x73] = VirtualCode::F4;
    t[0x74] = VirtualCode::F5;
    t[0x75] = VirtualCode::F6;
    t[0x76] = VirtualCode::F7;
    t[0x77] = VirtualCode::F8;
    t[0x78] = VirtualCode::F9;
    t[0x79] = VirtualCode::F10;
    t[0x7A] = VirtualCode::F11;
    t[0x7B] = VirtualCode::F12;

    t[0x90] = VirtualCode::NumLock;
    t[0x91] = VirtualCode::ScrollLock;

    // L/R modifier pairs alias to the same-side VC; VK_SHIFT/VK_CONTROL/VK_MENU
    // (the non-sided generic codes) resolve to the left-hand VC by convention.
    t[0x10] = VirtualCode::ShiftLeft;
    t[0x11] = VirtualCode::ControlLeft;
    t[0x12] = VirtualCode::AltLeft;
    t[0xA0] = VirtualCode::ShiftLeft;
    t[0xA1] = VirtualCode::ShiftRight;
    t[0xA2] = VirtualCode::ControlLeft;
    t[0xA3] = VirtualCode::ControlRight;
    t[0xA4] = VirtualCode::AltLeft;
    t[0xA5] = VirtualCode::AltRight;

    // Volume / media keys
    t[0xAD] = VirtualCode::VolumeMute;
    t[0xAE] = VirtualCode::VolumeDown;
    t[0xAF] = VirtualCode::VolumeUp;
    t[0xB0] = VirtualCode::MediaNextTrack;
    t[0xB1] = VirtualCode::MediaPrevTrack;
    t[0xB2] = VirtualCode::MediaStop;
    t[0xB3] = VirtualCode::MediaPlayPause;

    // Browser keys
    t[0xA6] = VirtualCode::BrowserBack;
    t[0xA7] = VirtualCode::BrowserForward;
    t[0xA8] = VirtualCode::BrowserRefresh;
    t[0xAA] = VirtualCode::BrowserSearch;
    t[0xAB] = VirtualCode::BrowserFavorites;
    t[0xAC] = VirtualCode::BrowserHome;

    // OEM punctuation (US layout)
    t[0xBA] = VirtualCode::Semicolon;
    t[0xBB] = VirtualCode::Equal;
    t[0xBC] = VirtualCode::Comma;
    t[0xBD] = VirtualCode::Minus;
    t[0xBE] = VirtualCode::Period;
    t[0xBF] = VirtualCode::Slash;
    t[0xC0] = VirtualCode::Backquote;
    t[0xDB] = VirtualCode::BracketLeft;
    t[0xDC] = VirtualCode::Backslash;
    t[0xDD] = VirtualCode::BracketRight;
    t[0xDE] = VirtualCode::Quote;

    // IME keys (Windows VK constants for the extension band)
    t[0x15] = VirtualCode::ImeKana;
    t[0x19] = VirtualCode::ImeKanji;
    t[0x1A] = VirtualCode::ImeHenkan;

    t
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD_MAPPINGS: &[(u8, VirtualCode)] = &[
        (0x41, VirtualCode::KeyA),
        (0x0D, VirtualCode::Enter),
        (0x1B, VirtualCode::Escape),
        (0x70, VirtualCode::F1),
        (0xA0, VirtualCode::ShiftLeft),
        (0xA1, VirtualCode::ShiftRight),
        (0x6F, VirtualCode::NumpadDivide),
    ];

    #[test]
    fn test_standard_mappings_resolve_correctly() {
        for &(vk, expected) in STANDARD_MAPPINGS {
            assert_eq!(vk_to_vc(vk), expected, "vk=0x{vk:02X}");
        }
    }

    #[test]
    fn test_unmapped_vk_returns_undefined() {
        assert_eq!(vk_to_vc(0x07), VirtualCode::Undefined);
    }

    #[test]
    fn test_generic_and_sided_shift_vk_alias_to_left() {
        assert_eq!(vk_to_vc(0x10), VirtualCode::ShiftLeft);
        assert_eq!(vk_to_vc(0xA0), VirtualCode::ShiftLeft);
    }

    #[test]
    fn test_vc_to_vk_round_trips_for_unambiguous_codes() {
        assert_eq!(vc_to_vk(VirtualCode::KeyA), Some(0x41));
        assert_eq!(vc_to_vk(VirtualCode::F12), Some(0x7B));
    }

    #[test]
    fn test_vc_to_vk_returns_none_for_unrepresented_codes() {
        assert_eq!(vc_to_vk(VirtualCode::ImeKatakanaHiragana), None);
    }

    #[test]
    fn test_is_extended_vk_covers_nav_cluster_and_right_modifiers() {
        assert!(is_extended_vk(0x21));
        assert!(is_extended_vk(0x5B));
        assert!(is_extended_vk(0xA5));
        assert!(!is_extended_vk(0x41));
    }

    #[test]
    fn test_never_panics_across_full_byte_range() {
        for vk in 0u16..256 {
            let _ = vk_to_vc(vk as u8);
        }
    }
}
