//! macOS `CGEventCreateKeyboardEvent`/`CGEventPost`-based synthesis.

use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;

use crate::error::{HookError, Result};
use crate::keymap::macos_vk::vc_to_cgkeycode;

use super::{SynthKeyEvent, SynthMouseEvent, SynthesisEngine};

fn event_source() -> std::result::Result<CGEventSource, HookError> {
    CGEventSource::new(CGEventSourceStateID::HIDSystemState).map_err(|_| HookError::Failure)
}

/// Injects synthetic keyboard/mouse input via a `CGEventTapLocation::HID`-posted event.
pub struct MacosSynthesisEngine;

impl MacosSynthesisEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MacosSynthesisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthesisEngine for MacosSynthesisEngine {
    fn post_key(&self, event: SynthKeyEvent) -> Result<()> {
        let (vc, key_down) = match event {
            SynthKeyEvent::Press(vc) => (vc, true),
            SynthKeyEvent::Release(vc) => (vc, false),
        };
        let keycode = vc_to_cgkeycode(vc).ok_or(HookError::Failure)?;
        let source = event_source()?;
        let cg_event = CGEvent::new_keyboard_event(source, keycode, key_down).map_err(|_| HookError::Failure)?;
        cg_event.post(CGEventTapLocation::HID);
        Ok(())
    }

    fn post_mouse(&self, event: SynthMouseEvent) -> Result<()> {
        let source = event_source()?;
        match event {
            SynthMouseEvent::MoveAbsolute { x, y } | SynthMouseEvent::MoveRelative { dx: x, dy: y } => {
                let point = CGPoint::new(x as f64, y as f64);
                let cg_event = CGEvent::new_mouse_event(source, CGEventType::MouseMoved, point, CGMouseButton::Left).map_err(|_| HookError::Failure)?;
                cg_event.post(CGEventTapLocation::HID);
                Ok(())
            }
            SynthMouseEvent::ButtonPress { button } | SynthMouseEvent::ButtonRelease { button } => {
                let is_press = matches!(event, SynthMouseEvent::ButtonPress { .. });
                let (cg_button, down_type, up_type) = match button {
                    1 => (CGMouseButton::Left, CGEventType::LeftMouseDown, CGEventType::LeftMouseUp),
                    2 => (CGMouseButton::Right, CGEventType::RightMouseDown, CGEventType::RightMouseUp),
                    3 => (CGMouseButton::Center, CGEventType::OtherMouseDown, CGEventType::OtherMouseUp),
                    other => return Err(HookError::UnknownMouseButton(other as u32)),
                };
                let event_type = if is_press { down_type } else { up_type };
                let point = CGPoint::new(0.0, 0.0);
                let cg_event = CGEvent::new_mouse_event(source, event_type, point, cg_button).map_err(|_| HookError::Failure)?;
                cg_event.post(CGEventTapLocation::HID);
                Ok(())
            }
            SynthMouseEvent::Wheel { delta, horizontal } => {
                let (wheel1, wheel2) = if horizontal { (0, delta) } else { (delta, 0) };
                let cg_event = CGEvent::new_scroll_event(source, core_graphics::event::ScrollEventUnit::LINE, 2, wheel1, wheel2, 0).map_err(|_| HookError::Failure)?;
                cg_event.post(CGEventTapLocation::HID);
                Ok(())
            }
        }
    }

    fn post_text(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(HookError::NullText);
        }
        let source = event_source()?;
        let cg_event = CGEvent::new_keyboard_event(source, 0, true).map_err(|_| HookError::Failure)?;
        let utf16: Vec<u16> = text.encode_utf16().collect();
        cg_event.set_string_from_utf16_unchecked(&utf16);
        cg_event.post(CGEventTapLocation::HID);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::VirtualCode;

    #[test]
    fn test_post_key_fails_for_unrepresented_vc() {
        let engine = MacosSynthesisEngine::new();
        assert!(engine.post_key(SynthKeyEvent::Press(VirtualCode::ImeHenkan)).is_err());
    }

    #[test]
    fn test_post_mouse_rejects_unknown_button() {
        let engine = MacosSynthesisEngine::new();
        assert_eq!(engine.post_mouse(SynthMouseEvent::ButtonPress { button: 9 }), Err(HookError::UnknownMouseButton(9)));
    }

    #[test]
    fn test_post_text_rejects_empty_string() {
        let engine = MacosSynthesisEngine::new();
        assert_eq!(engine.post_text(""), Err(HookError::NullText));
    }
}
