//! The cross-platform virtual event model: [`VirtualCode`], [`ModifierMask`],
//! and [`VirtualEvent`].
//!
//! The alphanumeric/edit/cursor/numpad/modifier bands reuse USB HID Usage
//! Tables 1.3 page 0x07 numbering directly, since that numbering is already a
//! stable, platform-neutral convention. Media/browser and IME/Asian keys live
//! in two extension bands private to this crate (0x0100.. and 0x0200..) so
//! they can never collide with the HID modifier band at 0xE0..=0xE7.

/// A stable 16-bit identifier for a physical key or logical input action.
///
/// `VC_UNDEFINED` (0) means "no mapping on this platform."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum VirtualCode {
    Undefined = 0x0000,

    // Letters (HID 0x04-0x1D)
    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    // Digits (HID 0x1E-0x27)
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    // Control keys (HID 0x28-0x38)
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    BracketLeft = 0x2F,
    BracketRight = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Backquote = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,

    CapsLock = 0x39,

    // Function keys (HID 0x3A-0x45)
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    // Navigation cluster (HID 0x46-0x52)
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    ArrowRight = 0x4F,
    ArrowLeft = 0x50,
    ArrowDown = 0x51,
    ArrowUp = 0x52,

    // Numpad (HID 0x53-0x63)
    NumLock = 0x53,
    NumpadDivide = 0x54,
    NumpadMultiply = 0x55,
    NumpadSubtract = 0x56,
    NumpadAdd = 0x57,
    NumpadEnter = 0x58,
    Numpad1 = 0x59,
    Numpad2 = 0x5A,
    Numpad3 = 0x5B,
    Numpad4 = 0x5C,
    Numpad5 = 0x5D,
    Numpad6 = 0x5E,
    Numpad7 = 0x5F,
    Numpad8 = 0x60,
    Numpad9 = 0x61,
    Numpad0 = 0x62,
    NumpadDecimal = 0x63,

    ContextMenu = 0x65,

    // Modifier keys (HID 0xE0-0xE7)
    ControlLeft = 0xE0,
    ShiftLeft = 0xE1,
    AltLeft = 0xE2,
    MetaLeft = 0xE3,
    ControlRight = 0xE4,
    ShiftRight = 0xE5,
    AltRight = 0xE6,
    MetaRight = 0xE7,

    // Media/browser extension band (0x0100..=0x011F), private to this crate.
    VolumeMute = 0x0100,
    VolumeUp = 0x0101,
    VolumeDown = 0x0102,
    MediaPlayPause = 0x0103,
    MediaStop = 0x0104,
    MediaNextTrack = 0x0105,
    MediaPrevTrack = 0x0106,
    BrowserBack = 0x0107,
    BrowserForward = 0x0108,
    BrowserRefresh = 0x0109,
    BrowserHome = 0x010A,
    BrowserSearch = 0x010B,
    BrowserFavorites = 0x010C,

    // IME/Asian extension band (0x0200..=0x021F), private to this crate.
    ImeKana = 0x0200,
    ImeHangul = 0x0201,
    ImeHanja = 0x0202,
    ImeKanji = 0x0203,
    ImeHenkan = 0x0204,
    ImeMuhenkan = 0x0205,
    ImeKatakanaHiragana = 0x0206,
    Yen = 0x0207,
}

impl VirtualCode {
    /// Converts a raw 16-bit value to a [`VirtualCode`].
    ///
    /// Returns [`VirtualCode::Undefined`] for values that do not correspond
    /// to a known variant.
    pub fn from_u16(value: u16) -> Self {
        use VirtualCode::*;
        match value {
            0x04 => KeyA,
            0x05 => KeyB,
            0x06 => KeyC,
            0x07 => KeyD,
            0x08 => KeyE,
            0x09 => KeyF,
            0x0A => KeyG,
            0x0B => KeyH,
            0x0C => KeyI,
            0x0D => KeyJ,
            0x0E => KeyK,
            0x0F => KeyL,
            0x10 => KeyM,
            0x11 => KeyN,
            0x12 => KeyO,
            0x13 => KeyP,
            0x14 => KeyQ,
            0x15 => KeyR,
            0x16 => KeyS,
            0x17 => KeyT,
            0x18 => KeyU,
            0x19 => KeyV,
            0x1A => KeyW,
            0x1B => KeyX,
            0x1C => KeyY,
            0x1D => KeyZ,
            0x1E => Digit1,
            0x1F => Digit2,
            0x20 => Digit3,
            0x21 => Digit4,
            0x22 => Digit5,
            0x23 => Digit6,
            0x24 => Digit7,
            0x25 => Digit8,
            0x26 => Digit9,
            0x27 => Digit0,
            0x28 => Enter,
            0x29 => Escape,
            0x2A => Backspace,
            0x2B => Tab,
            0x2C => Space,
            0x2D => Minus,
            0x2E => Equal,
            0x2F => BracketLeft,
            0x30 => BracketRight,
            0x31 => Backslash,
            0x33 => Semicolon,
            0x34 => Quote,
            0x35 => Backquote,
            0x36 => Comma,
            0x37 => Period,
            0x38 => Slash,
            0x39 => CapsLock,
            0x3A => F1,
            0x3B => F2,
            0x3C => F3,
            0x3D => F4,
            0x3E => F5,
            0x3F => F6,
            0x40 => F7,
            0x41 => F8,
            0x42 => F9,
            0x43 => F10,
            0x44 => F11,
            0x45 => F12,
            0x46 => PrintScreen,
            0x47 => ScrollLock,
            0x48 => Pause,
            0x49 => Insert,
            0x4A => Home,
            0x4B => PageUp,
            0x4C => Delete,
            0x4D => End,
            0x4E => PageDown,
            0x4F => ArrowRight,
            0x50 => ArrowLeft,
            0x51 => ArrowDown,
            0x52 => ArrowUp,
            0x53 => NumLock,
            0x54 => NumpadDivide,
            0x55 => NumpadMultiply,
            0x56 => NumpadSubtract,
            0x57 => NumpadAdd,
            0x58 => NumpadEnter,
            0x59 => Numpad1,
            0x5A => Numpad2,
            0x5B => Numpad3,
            0x5C => Numpad4,
            0x5D => Numpad5,
            0x5E => Numpad6,
            0x5F => Numpad7,
            0x60 => Numpad8,
            0x61 => Numpad9,
            0x62 => Numpad0,
            0x63 => NumpadDecimal,
            0x65 => ContextMenu,
            0xE0 => ControlLeft,
            0xE1 => ShiftLeft,
            0xE2 => AltLeft,
            0xE3 => MetaLeft,
            0xE4 => ControlRight,
            0xE5 => ShiftRight,
            0xE6 => AltRight,
            0xE7 => MetaRight,
            0x0100 => VolumeMute,
            0x0101 => VolumeUp,
            0x0102 => VolumeDown,
            0x0103 => MediaPlayPause,
            0x0104 => MediaStop,
            0x0105 => MediaNextTrack,
            0x0106 => MediaPrevTrack,
            0x0107 => BrowserBack,
            0x0108 => BrowserForward,
            0x0109 => BrowserRefresh,
            0x010A => BrowserHome,
            0x010B => BrowserSearch,
            0x010C => BrowserFavorites,
            0x0200 => ImeKana,
            0x0201 => ImeHangul,
            0x0202 => ImeHanja,
            0x0203 => ImeKanji,
            0x0204 => ImeHenkan,
            0x0205 => ImeMuhenkan,
            0x0206 => ImeKatakanaHiragana,
            0x0207 => Yen,
            _ => Undefined,
        }
    }

    /// Returns the raw 16-bit value for this virtual code.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns `true` if this code represents a modifier key.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            VirtualCode::ControlLeft
                | VirtualCode::ControlRight
                | VirtualCode::ShiftLeft
                | VirtualCode::ShiftRight
                | VirtualCode::AltLeft
                | VirtualCode::AltRight
                | VirtualCode::MetaLeft
                | VirtualCode::MetaRight
        )
    }

    /// Returns a stable diagnostic name for this virtual code, in the style
    /// of the DOM `KeyboardEvent.code` string (e.g. `"KeyA"`, `"ShiftLeft"`).
    ///
    /// This is for logging/diagnostics only, not a wire format.
    pub fn name(self) -> &'static str {
        use VirtualCode::*;
        match self {
            Undefined => "Undefined",
            KeyA => "KeyA",
            KeyB => "KeyB",
            KeyC => "KeyC",
            KeyD => "KeyD",
            KeyE => "KeyE",
            KeyF => "KeyF",
            KeyG => "KeyG",
            KeyH => "KeyH",
            KeyI => "KeyI",
            KeyJ => "KeyJ",
            KeyK => "KeyK",
            KeyL => "KeyL",
            KeyM => "KeyM",
            KeyN => "KeyN",
            KeyO => "KeyO",
            KeyP => "KeyP",
            KeyQ => "KeyQ",
            KeyR => "KeyR",
            KeyS => "KeyS",
            KeyT => "KeyT",
            KeyU => "KeyU",
            KeyV => "KeyV",
            KeyW => "KeyW",
            KeyX => "KeyX",
            KeyY => "KeyY",
            KeyZ => "KeyZ",
            Digit0 => "Digit0",
            Digit1 => "Digit1",
            Digit2 => "Digit2",
            Digit3 => "Digit3",
            Digit4 => "Digit4",
            Digit5 => "Digit5",
            Digit6 => "Digit6",
            Digit7 => "Digit7",
            Digit8 => "Digit8",
            Digit9 => "Digit9",
            Enter => "Enter",
            Escape => "Escape",
            Backspace => "Backspace",
            Tab => "Tab",
            Space => "Space",
            Minus => "Minus",
            Equal => "Equal",
            BracketLeft => "BracketLeft",
            BracketRight => "BracketRight",
            Backslash => "Backslash",
            Semicolon => "Semicolon",
            Quote => "Quote",
            Backquote => "Backquote",
            Comma => "Comma",
            Period => "Period",
            Slash => "Slash",
            CapsLock => "CapsLock",
            F1 => "F1",
            F2 => "F2",
            F3 => "F3",
            F4 => "F4",
            F5 => "F5",
            F6 => "F6",
            F7 => "F7",
            F8 => "F8",
            F9 => "F9",
            F10 => "F10",
            F11 => "F11",
            F12 => "F12",
            PrintScreen => "PrintScreen",
            ScrollLock => "ScrollLock",
            Pause => "Pause",
            Insert => "Insert",
            Home => "Home",
            PageUp => "PageUp",
            Delete => "Delete",
            End => "End",
            PageDown => "PageDown",
            ArrowRight => "ArrowRight",
            ArrowLeft => "ArrowLeft",
            ArrowDown => "ArrowDown",
            ArrowUp => "ArrowUp",
            NumLock => "NumLock",
            NumpadDivide => "NumpadDivide",
            NumpadMultiply => "NumpadMultiply",
            NumpadSubtract => "NumpadSubtract",
            NumpadAdd => "NumpadAdd",
            NumpadEnter => "NumpadEnter",
            Numpad0 => "Numpad0",
            Numpad1 => "Numpad1",
            Numpad2 => "Numpad2",
            Numpad3 => "Numpad3",
            Numpad4 => "Numpad4",
            Numpad5 => "Numpad5",
            Numpad6 => "Numpad6",
            Numpad7 => "Numpad7",
            Numpad8 => "Numpad8",
            Numpad9 => "Numpad9",
            NumpadDecimal => "NumpadDecimal",
            ContextMenu => "ContextMenu",
            ControlLeft => "ControlLeft",
            ShiftLeft => "ShiftLeft",
            AltLeft => "AltLeft",
            MetaLeft => "MetaLeft",
            ControlRight => "ControlRight",
            ShiftRight => "ShiftRight",
            AltRight => "AltRight",
            MetaRight => "MetaRight",
            VolumeMute => "VolumeMute",
            VolumeUp => "VolumeUp",
            VolumeDown => "VolumeDown",
            MediaPlayPause => "MediaPlayPause",
            MediaStop => "MediaStop",
            MediaNextTrack => "MediaNextTrack",
            MediaPrevTrack => "MediaPrevTrack",
            BrowserBack => "BrowserBack",
            BrowserForward => "BrowserForward",
            BrowserRefresh => "BrowserRefresh",
            BrowserHome => "BrowserHome",
            BrowserSearch => "BrowserSearch",
            BrowserFavorites => "BrowserFavorites",
            ImeKana => "ImeKana",
            ImeHangul => "ImeHangul",
            ImeHanja => "ImeHanja",
            ImeKanji => "ImeKanji",
            ImeHenkan => "ImeHenkan",
            ImeMuhenkan => "ImeMuhenkan",
            ImeKatakanaHiragana => "ImeKatakanaHiragana",
            Yen => "Yen",
        }
    }
}

/// Sentinel `keychar` value meaning "no typed character".
pub const CHAR_UNDEFINED: u16 = 0xFFFF;

/// A 16-bit process-wide modifier/button bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierMask(pub u16);

impl ModifierMask {
    pub const SHIFT_L: u16 = 1 << 0;
    pub const SHIFT_R: u16 = 1 << 1;
    pub const CTRL_L: u16 = 1 << 2;
    pub const CTRL_R: u16 = 1 << 3;
    pub const META_L: u16 = 1 << 4;
    pub const META_R: u16 = 1 << 5;
    pub const ALT_L: u16 = 1 << 6;
    pub const ALT_R: u16 = 1 << 7;
    pub const BUTTON1: u16 = 1 << 8;
    pub const BUTTON2: u16 = 1 << 9;
    pub const BUTTON3: u16 = 1 << 10;
    pub const BUTTON4: u16 = 1 << 11;
    pub const BUTTON5: u16 = 1 << 12;
    pub const NUM_LOCK: u16 = 1 << 13;
    pub const CAPS_LOCK: u16 = 1 << 14;
    pub const SCROLL_LOCK: u16 = 1 << 15;

    pub const MASK_SHIFT: u16 = Self::SHIFT_L | Self::SHIFT_R;
    pub const MASK_CTRL: u16 = Self::CTRL_L | Self::CTRL_R;
    pub const MASK_META: u16 = Self::META_L | Self::META_R;
    pub const MASK_ALT: u16 = Self::ALT_L | Self::ALT_R;

    /// Returns the button bit for buttons 1-5, or `None` for any other index.
    pub fn button_bit(button: u8) -> Option<u16> {
        match button {
            1 => Some(Self::BUTTON1),
            2 => Some(Self::BUTTON2),
            3 => Some(Self::BUTTON3),
            4 => Some(Self::BUTTON4),
            5 => Some(Self::BUTTON5),
            _ => None,
        }
    }

    pub fn contains(self, bit: u16) -> bool {
        self.0 & bit != 0
    }

    pub fn any_button_held(self) -> bool {
        self.0 & (Self::BUTTON1 | Self::BUTTON2 | Self::BUTTON3 | Self::BUTTON4 | Self::BUTTON5) != 0
    }
}

/// The kind of a [`VirtualEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    HookEnabled,
    HookDisabled,
    KeyTyped,
    KeyPressed,
    KeyReleased,
    MouseClicked,
    MousePressed,
    MouseReleased,
    MouseMoved,
    MouseDragged,
    MouseWheel,
    /// Injection-only: press without an implicit move-to-coordinates step.
    MousePressedIgnoreCoords,
    /// Injection-only: release without an implicit move-to-coordinates step.
    MouseReleasedIgnoreCoords,
    /// Injection-only: move is relative to the current cursor position.
    MouseMovedRelativeToCursor,
}

/// Vertical or horizontal wheel rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    Vertical,
    Horizontal,
}

/// Line-scroll vs. block-scroll wheel granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelType {
    Line,
    Block,
}

/// The keyboard/mouse/wheel payload carried by a [`VirtualEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventData {
    Keyboard {
        keycode: VirtualCode,
        rawcode: u16,
        keychar: u16,
    },
    Mouse {
        button: u8,
        clicks: u16,
        x: i16,
        y: i16,
    },
    Wheel {
        x: i16,
        y: i16,
        wheel_type: WheelType,
        rotation: i32,
        delta: i32,
        direction: WheelDirection,
    },
    None,
}

/// A single normalized input event, dispatched synchronously to the user's handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualEvent {
    pub event_type: EventType,
    pub time: u64,
    pub mask: ModifierMask,
    pub data: EventData,
}

impl VirtualEvent {
    pub fn keyboard(event_type: EventType, time: u64, mask: ModifierMask, keycode: VirtualCode, rawcode: u16) -> Self {
        Self {
            event_type,
            time,
            mask,
            data: EventData::Keyboard { keycode, rawcode, keychar: CHAR_UNDEFINED },
        }
    }

    pub fn key_typed(time: u64, mask: ModifierMask, keycode: VirtualCode, keychar: u16) -> Self {
        Self {
            event_type: EventType::KeyTyped,
            time,
            mask,
            data: EventData::Keyboard { keycode, rawcode: 0, keychar },
        }
    }

    pub fn mouse(event_type: EventType, time: u64, mask: ModifierMask, button: u8, clicks: u16, x: i16, y: i16) -> Self {
        Self {
            event_type,
            time,
            mask,
            data: EventData::Mouse { button, clicks, x, y },
        }
    }

    pub fn wheel(time: u64, mask: ModifierMask, x: i16, y: i16, wheel_type: WheelType, rotation: i32, delta: i32, direction: WheelDirection) -> Self {
        Self {
            event_type: EventType::MouseWheel,
            time,
            mask,
            data: EventData::Wheel { x, y, wheel_type, rotation, delta, direction },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_from_u16_and_as_u16() {
        let pairs = [
            (0x04u16, VirtualCode::KeyA),
            (0x28, VirtualCode::Enter),
            (0xE0, VirtualCode::ControlLeft),
            (0xE7, VirtualCode::MetaRight),
            (0x0101, VirtualCode::VolumeUp),
            (0x0204, VirtualCode::ImeHenkan),
        ];
        for (raw, expected) in pairs {
            let code = VirtualCode::from_u16(raw);
            assert_eq!(code, expected);
            assert_eq!(code.as_u16(), raw);
        }
    }

    #[test]
    fn test_unknown_values_return_undefined() {
        for raw in [0x00u16, 0x32, 0x64, 0xFF, 0x0300] {
            assert_eq!(VirtualCode::from_u16(raw), VirtualCode::Undefined);
        }
    }

    #[test]
    fn test_modifier_keys_are_identified_correctly() {
        for m in [
            VirtualCode::ControlLeft,
            VirtualCode::ControlRight,
            VirtualCode::ShiftLeft,
            VirtualCode::ShiftRight,
            VirtualCode::AltLeft,
            VirtualCode::AltRight,
            VirtualCode::MetaLeft,
            VirtualCode::MetaRight,
        ] {
            assert!(m.is_modifier());
        }
        assert!(!VirtualCode::KeyA.is_modifier());
        assert!(!VirtualCode::VolumeUp.is_modifier());
    }

    #[test]
    fn test_media_and_ime_bands_do_not_collide_with_hid_modifiers() {
        for code in [
            VirtualCode::VolumeMute,
            VirtualCode::MediaPlayPause,
            VirtualCode::BrowserBack,
            VirtualCode::ImeKana,
            VirtualCode::Yen,
        ] {
            assert!(code.as_u16() >= 0x0100);
        }
        assert!((VirtualCode::ControlLeft.as_u16()..=VirtualCode::MetaRight.as_u16()).all(|v| v < 0x0100));
    }

    #[test]
    fn test_modifier_mask_button_bit() {
        assert_eq!(ModifierMask::button_bit(4), Some(ModifierMask::BUTTON4));
        assert_eq!(ModifierMask::button_bit(5), Some(ModifierMask::BUTTON5));
        assert_eq!(ModifierMask::button_bit(6), None);
    }

    #[test]
    fn test_any_button_held() {
        let mask = ModifierMask(ModifierMask::BUTTON1);
        assert!(mask.any_button_held());
        assert!(!ModifierMask(0).any_button_held());
    }

    #[test]
    fn test_aggregate_masks_are_unions_of_lr_sides() {
        assert_eq!(ModifierMask::MASK_SHIFT, ModifierMask::SHIFT_L | ModifierMask::SHIFT_R);
        assert_eq!(ModifierMask::MASK_CTRL, ModifierMask::CTRL_L | ModifierMask::CTRL_R);
        assert_eq!(ModifierMask::MASK_ALT, ModifierMask::ALT_L | ModifierMask::ALT_R);
        assert_eq!(ModifierMask::MASK_META, ModifierMask::META_L | ModifierMask::META_R);
    }

    #[test]
    fn test_name_returns_dom_style_strings() {
        assert_eq!(VirtualCode::KeyA.name(), "KeyA");
        assert_eq!(VirtualCode::ShiftLeft.name(), "ShiftLeft");
        assert_eq!(VirtualCode::Undefined.name(), "Undefined");
    }
}
