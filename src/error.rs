//! Stable error taxonomy for hook setup, teardown, and event injection.

use std::result;
use thiserror::Error;

/// Specialized `Result` for fallible hookcore operations.
pub type Result<T> = result::Result<T, HookError>;

/// All errors a hookcore session can return.
///
/// Variant-to-numeric-code mapping is stable across releases; see
/// [`HookError::error_code`] for callers that need the legacy numeric form.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookError {
    /// Unspecified failure.
    #[error("operation failed")]
    Failure,

    /// Allocation failed.
    #[error("out of memory")]
    OutOfMemory,

    /// `post_text` was called with a null/empty buffer.
    #[error("text argument was null")]
    NullText,

    /// X11 could not connect to the display server.
    #[error("failed to open X11 display")]
    XOpenDisplay,

    /// The RECORD extension is not present on the X server.
    #[error("X RECORD extension not found")]
    XRecordNotFound,

    /// Allocating a RECORD range failed.
    #[error("failed to allocate X RECORD range")]
    XRecordAllocRange,

    /// Creating the RECORD context failed.
    #[error("failed to create X RECORD context")]
    XRecordCreateContext,

    /// Enabling the RECORD context failed.
    #[error("failed to enable X RECORD context")]
    XRecordEnableContext,

    /// Fetching the RECORD context failed.
    #[error("failed to get X RECORD context")]
    XRecordGetContext,

    /// `SetWindowsHookExW` failed.
    #[error("SetWindowsHookEx failed")]
    WindowsHookInstall,

    /// Could not resolve the process module handle.
    #[error("GetModuleHandle failed")]
    WindowsModuleHandle,

    /// Could not create the hidden message-only window.
    #[error("failed to create invisible window")]
    WindowsInvisibleWindow,

    /// Accessibility permission has not been granted to the process.
    #[error("accessibility access disabled")]
    MacAxDisabled,

    /// `CGEventTapCreate` returned null.
    #[error("failed to create event tap")]
    MacEventTap,

    /// Failed to wrap the tap's run-loop source.
    #[error("failed to create run loop source")]
    MacRunLoopSource,

    /// Failed to obtain the target run loop.
    #[error("failed to get run loop")]
    MacGetRunLoop,

    /// Failed to create the run-loop observer used by the main-thread marshal fallback.
    #[error("failed to create run loop observer")]
    MacCreateObserver,

    /// A session is already running; only one is permitted at a time.
    #[error("a hook session is already running")]
    AlreadyRunning,

    /// `stop` was called with no active session.
    #[error("no hook session is running")]
    NotRunning,

    /// An operation requires `run`/`run_keyboard`/`run_mouse` to have been called first.
    #[error("hook session is not initialized")]
    NotInitialized,

    /// A raw platform button code had no corresponding [`crate::event::MouseButton`].
    #[error("unknown mouse button: {0}")]
    UnknownMouseButton(u32),

    /// An unmapped failure, carrying the raw platform status code.
    #[error("unknown error: {0}")]
    Unknown(u32),
}

impl HookError {
    /// Returns the stable numeric error code for this variant.
    pub fn error_code(self) -> u32 {
        match self {
            HookError::Failure => 0x01,
            HookError::OutOfMemory => 0x02,
            HookError::NullText => 0x03,
            HookError::XOpenDisplay => 0x20,
            HookError::XRecordNotFound => 0x21,
            HookError::XRecordAllocRange => 0x22,
            HookError::XRecordCreateContext => 0x23,
            HookError::XRecordEnableContext => 0x24,
            HookError::XRecordGetContext => 0x25,
            HookError::WindowsHookInstall => 0x30,
            HookError::WindowsModuleHandle => 0x31,
            HookError::WindowsInvisibleWindow => 0x32,
            HookError::MacAxDisabled => 0x40,
            HookError::MacEventTap => 0x41,
            HookError::MacRunLoopSource => 0x42,
            HookError::MacGetRunLoop => 0x43,
            HookError::MacCreateObserver => 0x44,
            HookError::AlreadyRunning | HookError::NotRunning | HookError::NotInitialized => 0x01,
            HookError::UnknownMouseButton(_) | HookError::Unknown(_) => 0x01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_match_spec_taxonomy() {
        assert_eq!(HookError::OutOfMemory.error_code(), 0x02);
        assert_eq!(HookError::XOpenDisplay.error_code(), 0x20);
        assert_eq!(HookError::XRecordGetContext.error_code(), 0x25);
        assert_eq!(HookError::WindowsHookInstall.error_code(), 0x30);
        assert_eq!(HookError::WindowsInvisibleWindow.error_code(), 0x32);
        assert_eq!(HookError::MacAxDisabled.error_code(), 0x40);
        assert_eq!(HookError::MacCreateObserver.error_code(), 0x44);
    }

    #[test]
    fn test_display_messages_are_human_readable() {
        assert_eq!(HookError::XOpenDisplay.to_string(), "failed to open X11 display");
        assert_eq!(HookError::Unknown(7).to_string(), "unknown error: 7");
    }

    #[test]
    fn test_unknown_mouse_button_carries_raw_code() {
        let err = HookError::UnknownMouseButton(9);
        assert!(matches!(err, HookError::UnknownMouseButton(9)));
    }
}
