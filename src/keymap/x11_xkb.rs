//! Runtime-discovered X11 Xkb keycode ↔ [`VirtualCode`] table.
//!
//! Unlike the Windows and macOS tables, an Xkb keycode is not a stable
//! compile-time constant: it depends on the server's keyboard description
//! and can shift when the user switches layout. At hook start (and again on
//! `XkbNewKeyboardNotify`) the capture backend walks the server's
//! `min_keycode..=max_keycode` range, reads each keycode's 4-character Xkb
//! symbolic name, and resolves it against [`symbolic_name_to_vc`] to build a
//! fresh table.
//!
//! The symbolic names below follow the standard `xkeyboard-config` base
//! layout naming (`AE01`, `AD01`, `AC01`, `AB01`, ... for the four QWERTY
//! rows, `FK01..FK12` for function keys). Several VCs accept more than one
//! alias, mirroring the Windows/macOS tables' multi-valued native side
//! (e.g. both `BKSL` and `AC12` resolve to `Backslash`).

use std::collections::HashMap;

use crate::event::VirtualCode;

/// Resolves a 4-character Xkb symbolic key name to a [`VirtualCode`].
///
/// Returns `VirtualCode::Undefined` for names this table does not recognize;
/// callers should still record the raw keycode for diagnostics.
pub fn symbolic_name_to_vc(name: &str) -> VirtualCode {
    use VirtualCode::*;
    match name {
        "AE01" => Digit1,
        "AE02" => Digit2,
        "AE03" => Digit3,
        "AE04" => Digit4,
        "AE05" => Digit5,
        "AE06" => Digit6,
        "AE07" => Digit7,
        "AE08" => Digit8,
        "AE09" => Digit9,
        "AE10" => Digit0,
        "AE11" => Minus,
        "AE12" => Equal,

        "AD01" => KeyQ,
        "AD02" => KeyW,
        "AD03" => KeyE,
        "AD04" => KeyR,
        "AD05" => KeyT,
        "AD06" => KeyY,
        "AD07" => KeyU,
        "AD08" => KeyI,
        "AD09" => KeyO,
        "AD10" => KeyP,
        "AD11" => BracketLeft,
        "AD12" => BracketRight,

        "AC01" => KeyA,
        "AC02" => KeyS,
        "AC03" => KeyD,
        "AC04" => KeyF,
        "AC05" => KeyG,
        "AC06" => KeyH,
        "AC07" => KeyJ,
        "AC08" => KeyK,
        "AC09" => KeyL,
        "AC10" => Semicolon,
        "AC11" => Quote,
        "AC12" | "BKSL" => Backslash,

        "AB01" => KeyZ,
        "AB02" => KeyX,
        "AB03" => KeyC,
        "AB04" => KeyV,
        "AB05" => KeyB,
        "AB06" => KeyN,
        "AB07" => KeyM,
        "AB08" => Comma,
        "AB09" => Period,
        "AB10" => Slash,

        "TLDE" => Backquote,
        "SPCE" => Space,
        "TAB" => Tab,
        "RTRN" => Enter,
        "ESC" => Escape,
        "BKSP" => Backspace,
        "CAPS" => CapsLock,

        "FK01" => F1,
        "FK02" => F2,
        "FK03" => F3,
        "FK04" => F4,
        "FK05" => F5,
        "FK06" => F6,
        "FK07" => F7,
        "FK08" => F8,
        "FK09" => F9,
        "FK10" => F10,
        "FK11" => F11,
        "FK12" => F12,

        "PRSC" => PrintScreen,
        "SCLK" => ScrollLock,
        "PAUS" => Pause,
        "INS" => Insert,
        "HOME" => Home,
        "PGUP" => PageUp,
        "DELE" => Delete,
        "END" => End,
        "PGDN" => PageDown,
        "UP" => ArrowUp,
        "DOWN" => ArrowDown,
        "LEFT" => ArrowLeft,
        "RGHT" => ArrowRight,

        "NMLK" => NumLock,
        "KPDV" => NumpadDivide,
        "KPMU" => NumpadMultiply,
        "KPSU" => NumpadSubtract,
        "KPAD" => NumpadAdd,
        "KPEN" => NumpadEnter,
        "KP0" => Numpad0,
        "KP1" => Numpad1,
        "KP2" => Numpad2,
        "KP3" => Numpad3,
        "KP4" => Numpad4,
        "KP5" => Numpad5,
        "KP6" => Numpad6,
        "KP7" => Numpad7,
        "KP8" => Numpad8,
        "KP9" => Numpad9,
        "KPDL" => NumpadDecimal,

        "LCTL" => ControlLeft,
        "RCTL" => ControlRight,
        "LFSH" => ShiftLeft,
        "RTSH" => ShiftRight,
        "LALT" => AltLeft,
        "RALT" => AltRight,
        "LWIN" => MetaLeft,
        "RWIN" => MetaRight,
        "MENU" | "COMP" => ContextMenu,

        "MUTE" => VolumeMute,
        "VOL+" => VolumeUp,
        "VOL-" => VolumeDown,
        "PLAY" => MediaPlayPause,
        "STOP" => MediaStop,
        "PRSP" => MediaNextTrack,
        "PRIO" => MediaPrevTrack,

        "HKTG" => ImeKatakanaHiragana,
        "HNGL" => ImeHangul,
        "HJCV" => ImeHanja,
        "HENK" => ImeHenkan,
        "MUHE" => ImeMuhenkan,
        "AE13" => Yen,

        _ => Undefined,
    }
}

/// A keycode table built by walking the server's declared keycode range at
/// hook start (or on layout change) and resolving each position's symbolic
/// name.
#[derive(Debug, Default, Clone)]
pub struct XkbKeycodeTable {
    native_to_vc: HashMap<u8, VirtualCode>,
    vc_to_native: HashMap<VirtualCode, u8>,
}

impl XkbKeycodeTable {
    /// Builds a table from an iterator of `(keycode, symbolic_name)` pairs,
    /// as produced by walking `min_keycode..=max_keycode` and reading each
    /// position's Xkb name via `XkbGetNames`.
    ///
    /// When more than one keycode resolves to the same VC, the
    /// `vc_to_native` side keeps the first one seen, matching the
    /// multi-valued-native-side convention used by the Windows/macOS tables.
    pub fn build<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u8, &'a str)>,
    {
        let mut table = XkbKeycodeTable::default();
        for (keycode, name) in entries {
            let vc = symbolic_name_to_vc(name);
            if vc == VirtualCode::Undefined {
                continue;
            }
            table.native_to_vc.insert(keycode, vc);
            table.vc_to_native.entry(vc).or_insert(keycode);
        }
        table
    }

    pub fn native_to_vc(&self, keycode: u8) -> VirtualCode {
        self.native_to_vc.get(&keycode).copied().unwrap_or(VirtualCode::Undefined)
    }

    pub fn vc_to_native(&self, vc: VirtualCode) -> Option<u8> {
        self.vc_to_native.get(&vc).copied()
    }

    pub fn len(&self) -> usize {
        self.native_to_vc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.native_to_vc.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LAYOUT: &[(u8, &str)] = &[
        (38, "AC01"), // a
        (24, "AD01"), // q
        (36, "RTRN"), // enter
        (66, "CAPS"),
        (110, "BKSL"),
        (51, "AC12"),
        (37, "LCTL"),
        (105, "RCTL"),
    ];

    #[test]
    fn test_symbolic_name_resolves_known_names() {
        assert_eq!(symbolic_name_to_vc("AC01"), VirtualCode::KeyA);
        assert_eq!(symbolic_name_to_vc("RTRN"), VirtualCode::Enter);
        assert_eq!(symbolic_name_to_vc("FK01"), VirtualCode::F1);
    }

    #[test]
    fn test_unknown_name_returns_undefined() {
        assert_eq!(symbolic_name_to_vc("ZZZZ"), VirtualCode::Undefined);
    }

    #[test]
    fn test_aliases_both_resolve_to_the_same_vc() {
        assert_eq!(symbolic_name_to_vc("BKSL"), VirtualCode::Backslash);
        assert_eq!(symbolic_name_to_vc("AC12"), VirtualCode::Backslash);
    }

    #[test]
    fn test_build_table_round_trips_unambiguous_entries() {
        let table = XkbKeycodeTable::build(SAMPLE_LAYOUT.iter().copied());
        assert_eq!(table.native_to_vc(38), VirtualCode::KeyA);
        assert_eq!(table.vc_to_native(VirtualCode::KeyA), Some(38));
        assert_eq!(table.native_to_vc(36), VirtualCode::Enter);
    }

    #[test]
    fn test_build_table_keeps_first_keycode_for_aliased_vc() {
        let table = XkbKeycodeTable::build(SAMPLE_LAYOUT.iter().copied());
        // both 110 (BKSL) and 51 (AC12) resolve to Backslash; first one wins.
        assert_eq!(table.vc_to_native(VirtualCode::Backslash), Some(110));
    }

    #[test]
    fn test_unresolved_keycodes_are_not_inserted() {
        let entries = [(200u8, "ZZZZ")];
        let table = XkbKeycodeTable::build(entries);
        assert!(table.is_empty());
        assert_eq!(table.native_to_vc(200), VirtualCode::Undefined);
    }

    #[test]
    fn test_len_counts_resolved_entries() {
        let table = XkbKeycodeTable::build(SAMPLE_LAYOUT.iter().copied());
        assert_eq!(table.len(), SAMPLE_LAYOUT.len());
    }
}
