//! Cross-platform userland keyboard and mouse hooking, normalization, and
//! synthesis.
//!
//! This crate provides one process-wide hook session (see
//! [`lifecycle::HookSession`]) that captures low-level keyboard and mouse
//! input on Windows, macOS, and X11, normalizes it into a single
//! [`event::VirtualEvent`] stream, and can synthesize input back onto the
//! same three platforms.

pub mod capture;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod keymap;
pub mod lifecycle;
pub mod logger;
pub mod mainthread;
pub mod modifiers;
pub mod monitor;
pub mod synth;
pub mod unicode;

pub use error::{HookError, Result};
pub use event::{EventData, EventType, ModifierMask, VirtualCode, VirtualEvent};
pub use lifecycle::{HookSession, SessionScope};
