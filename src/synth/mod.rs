//! Event synthesis (C7): translating `post_event`/`post_text` calls into
//! native injected input.

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod x11;

pub mod mock;

use crate::error::Result;
use crate::event::VirtualCode;

/// A synthesized key event: press or release of one virtual code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthKeyEvent {
    Press(VirtualCode),
    Release(VirtualCode),
}

/// A synthesized mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthMouseEvent {
    MoveAbsolute { x: i32, y: i32 },
    MoveRelative { dx: i32, dy: i32 },
    ButtonPress { button: u8 },
    ButtonRelease { button: u8 },
    Wheel { delta: i32, horizontal: bool },
}

/// Platform-specific injection of synthetic keyboard and mouse input.
#[cfg_attr(test, mockall::automock)]
pub trait SynthesisEngine: Send {
    fn post_key(&self, event: SynthKeyEvent) -> Result<()>;
    fn post_mouse(&self, event: SynthMouseEvent) -> Result<()>;

    /// Types `text` by injecting one event per Unicode code unit, using
    /// whatever text-injection primitive the platform provides
    /// (`KEYEVENTF_UNICODE` on Windows, `CGEventKeyboardSetUnicodeString` on
    /// macOS, an unused-keycode remap on X11). Every platform reports a
    /// status, so a caller can tell an X11 remap failure apart from success,
    /// matching the other two platforms instead of silently assuming it
    /// always works.
    fn post_text(&self, text: &str) -> Result<()>;
}

#[cfg(test)]
mod mockall_tests {
    use super::*;
    use crate::error::HookError;

    #[test]
    fn test_mock_synthesis_engine_honors_expectations() {
        let mut mock = MockSynthesisEngine::new();
        mock.expect_post_key()
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_post_text()
            .withf(|text: &str| text == "hi")
            .returning(|_| Err(HookError::NullText));

        assert!(mock.post_key(SynthKeyEvent::Press(VirtualCode::KeyA)).is_ok());
        assert_eq!(mock.post_text("hi"), Err(HookError::NullText));
    }
}
