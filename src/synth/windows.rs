//! Windows `SendInput`-based synthesis.

use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP,
    KEYEVENTF_SCANCODE, KEYEVENTF_UNICODE, MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_HWHEEL, MOUSEEVENTF_LEFTDOWN,
    MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_MOVE, MOUSEEVENTF_RIGHTDOWN,
    MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_WHEEL, MOUSEEVENTF_XDOWN, MOUSEEVENTF_XUP, MOUSEINPUT,
};

use crate::error::{HookError, Result};
use crate::event::VirtualCode;
use crate::keymap::windows_vk::{is_extended_vk, vc_to_vk};
use crate::monitor::VirtualScreen;

use super::{SynthKeyEvent, SynthMouseEvent, SynthesisEngine};

const XBUTTON1: u32 = 0x0001;
const XBUTTON2: u32 = 0x0002;

fn send(inputs: &[INPUT]) -> Result<()> {
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize == inputs.len() {
        Ok(())
    } else {
        Err(HookError::Failure)
    }
}

fn key_input(vk: u8, key_up: bool) -> INPUT {
    let mut flags = KEYEVENTF_SCANCODE;
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }
    if is_extended_vk(vk) {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT { wVk: windows::Win32::UI::Input::KeyboardAndMouse::VIRTUAL_KEY(vk as u16), wScan: 0, dwFlags: flags, time: 0, dwExtraInfo: 0 },
        },
    }
}

fn unicode_input(code_unit: u16, key_up: bool) -> INPUT {
    let mut flags = KEYEVENTF_UNICODE;
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT { wVk: windows::Win32::UI::Input::KeyboardAndMouse::VIRTUAL_KEY(0), wScan: code_unit, dwFlags: flags, time: 0, dwExtraInfo: 0 },
        },
    }
}

/// Injects synthetic keyboard/mouse input via `SendInput`.
pub struct WindowsSynthesisEngine {
    screen: VirtualScreen,
}

impl WindowsSynthesisEngine {
    pub fn new() -> Self {
        Self { screen: VirtualScreen::new() }
    }

    pub fn refresh_screen_geometry(&self) {
        self.screen.refresh();
    }
}

impl Default for WindowsSynthesisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthesisEngine for WindowsSynthesisEngine {
    fn post_key(&self, event: SynthKeyEvent) -> Result<()> {
        let (vc, key_up) = match event {
            SynthKeyEvent::Press(vc) => (vc, false),
            SynthKeyEvent::Release(vc) => (vc, true),
        };
        let vk = vc_to_vk(vc).ok_or(HookError::Failure)?;
        send(&[key_input(vk, key_up)])
    }

    fn post_mouse(&self, event: SynthMouseEvent) -> Result<()> {
        match event {
            SynthMouseEvent::MoveAbsolute { x, y } => {
                let (nx, ny) = self.screen.normalize(x, y);
                let input = INPUT {
                    r#type: INPUT_MOUSE,
                    Anonymous: INPUT_0 {
                        mi: MOUSEINPUT { dx: nx, dy: ny, mouseData: 0, dwFlags: MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_MOVE, time: 0, dwExtraInfo: 0 },
                    },
                };
                send(&[input])
            }
            SynthMouseEvent::MoveRelative { dx, dy } => {
                let input = INPUT {
                    r#type: INPUT_MOUSE,
                    Anonymous: INPUT_0 { mi: MOUSEINPUT { dx, dy, mouseData: 0, dwFlags: MOUSEEVENTF_MOVE, time: 0, dwExtraInfo: 0 } },
                };
                send(&[input])
            }
            SynthMouseEvent::ButtonPress { button } | SynthMouseEvent::ButtonRelease { button } => {
                let is_press = matches!(event, SynthMouseEvent::ButtonPress { .. });
                let (flags, data) = match button {
                    1 => (if is_press { MOUSEEVENTF_LEFTDOWN } else { MOUSEEVENTF_LEFTUP }, 0),
                    2 => (if is_press { MOUSEEVENTF_RIGHTDOWN } else { MOUSEEVENTF_RIGHTUP }, 0),
                    3 => (if is_press { MOUSEEVENTF_MIDDLEDOWN } else { MOUSEEVENTF_MIDDLEUP }, 0),
                    4 => (if is_press { MOUSEEVENTF_XDOWN } else { MOUSEEVENTF_XUP }, XBUTTON1),
                    5 => (if is_press { MOUSEEVENTF_XDOWN } else { MOUSEEVENTF_XUP }, XBUTTON2),
                    other => return Err(HookError::UnknownMouseButton(other as u32)),
                };
                let input = INPUT {
                    r#type: INPUT_MOUSE,
                    Anonymous: INPUT_0 { mi: MOUSEINPUT { dx: 0, dy: 0, mouseData: data, dwFlags: flags, time: 0, dwExtraInfo: 0 } },
                };
                send(&[input])
            }
            SynthMouseEvent::Wheel { delta, horizontal } => {
                let flags = if horizontal { MOUSEEVENTF_HWHEEL } else { MOUSEEVENTF_WHEEL };
                let input = INPUT {
                    r#type: INPUT_MOUSE,
                    Anonymous: INPUT_0 { mi: MOUSEINPUT { dx: 0, dy: 0, mouseData: delta as u32, dwFlags: flags, time: 0, dwExtraInfo: 0 } },
                };
                send(&[input])
            }
        }
    }

    fn post_text(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(HookError::NullText);
        }
        let mut inputs = Vec::with_capacity(text.len() * 2);
        for unit in text.encode_utf16() {
            inputs.push(unicode_input(unit, false));
            inputs.push(unicode_input(unit, true));
        }
        send(&inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_key_fails_for_unrepresented_vc() {
        let engine = WindowsSynthesisEngine::new();
        let err = engine.post_key(SynthKeyEvent::Press(VirtualCode::ImeHenkan));
        assert!(err.is_err());
    }

    #[test]
    fn test_post_mouse_rejects_unknown_button() {
        let engine = WindowsSynthesisEngine::new();
        let err = engine.post_mouse(SynthMouseEvent::ButtonPress { button: 9 });
        assert_eq!(err, Err(HookError::UnknownMouseButton(9)));
    }

    #[test]
    fn test_post_text_rejects_empty_string() {
        let engine = WindowsSynthesisEngine::new();
        assert_eq!(engine.post_text(""), Err(HookError::NullText));
    }
}
