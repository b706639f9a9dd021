//! Platform input capture (C4): the `CaptureBackend` trait and the raw event
//! type it produces, plus a mock backend for testing the dispatcher without
//! a live OS hook.

use thiserror::Error;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod x11;

pub mod mock;

use crate::event::VirtualCode;

/// A raw, platform-decoded input event, not yet normalized into a
/// [`crate::event::VirtualEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInputEvent {
    KeyDown { vc: VirtualCode, rawcode: u16, time: u64, injected: bool },
    KeyUp { vc: VirtualCode, rawcode: u16, time: u64, injected: bool },
    MouseMove { x: i16, y: i16, time: u64, injected: bool },
    MouseButtonDown { button: u8, x: i16, y: i16, time: u64, injected: bool },
    MouseButtonUp { button: u8, x: i16, y: i16, time: u64, injected: bool },
    MouseWheel { delta: i32, horizontal: bool, x: i16, y: i16, time: u64, injected: bool },
}

/// Errors that can occur while installing or tearing down a capture backend.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    #[error("keyboard hook install failed")]
    KeyboardHookInstallFailed,
    #[error("mouse hook install failed")]
    MouseHookInstallFailed,
    #[error("capture backend already stopped")]
    AlreadyStopped,
    #[error("capture backend already running")]
    AlreadyRunning,
}

/// A callback invoked by the capture backend for every decoded raw event.
///
/// Returning `true` means "consume this event" (suppress it from reaching
/// the rest of the system); only meaningful on platforms where the hook can
/// actually swallow the native event (Windows low-level hooks, macOS event
/// taps). Returning `false` lets the event pass through untouched.
pub type RawEventHandler = Box<dyn FnMut(RawInputEvent) -> bool + Send>;

/// Platform-specific installation and teardown of the low-level input hook.
///
/// Implementors run their own dedicated thread (owning the native message
/// loop / run loop / RECORD wire-decode loop) once [`CaptureBackend::start`]
/// is called, and must guarantee no further callbacks fire after
/// [`CaptureBackend::stop`] returns.
pub trait CaptureBackend: Send {
    /// Installs the hook and begins delivering events to `handler` on a
    /// dedicated thread owned by this backend.
    fn start(&mut self, handler: RawEventHandler) -> Result<(), CaptureError>;

    /// Uninstalls the hook and joins the backend's thread.
    fn stop(&mut self) -> Result<(), CaptureError>;
}
