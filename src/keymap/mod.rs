//! Virtual-code ↔ native-keycode translation tables (C1).
//!
//! Each platform gets its own module providing a `native_to_vc`/`vc_to_native`
//! pair. Windows and macOS tables are compile-time constants; the X11 table
//! is populated at runtime since Xkb keycodes are not stable across servers
//! or layouts.

#[cfg(target_os = "windows")]
pub mod windows_vk;

#[cfg(target_os = "macos")]
pub mod macos_vk;

#[cfg(target_os = "linux")]
pub mod x11_xkb;

use crate::event::VirtualCode;

/// Looks up the stable diagnostic DOM-style name for a virtual code.
///
/// Thin wrapper kept for call-site symmetry with the native-side lookup
/// functions; delegates to [`VirtualCode::name`].
pub fn vc_name(vc: VirtualCode) -> &'static str {
    vc.name()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vc_name_delegates_to_virtual_code() {
        assert_eq!(vc_name(VirtualCode::KeyA), "KeyA");
    }
}
