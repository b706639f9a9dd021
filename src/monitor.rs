//! Windows multi-monitor coordinate normalization (C3).
//!
//! `SendInput` absolute moves expect coordinates normalized to `[0, 65535]`
//! across the full virtual screen, with `(0, 0)` at the virtual screen's
//! origin rather than the primary monitor's origin. The origin can be
//! negative (a monitor placed above/left of the primary), so a cached
//! snapshot of `GetSystemMetrics(SM_XVIRTUALSCREEN/SM_YVIRTUALSCREEN/
//! SM_CXVIRTUALSCREEN/SM_CYVIRTUALSCREEN)` is kept and refreshed whenever the
//! capture backend observes `WM_DISPLAYCHANGE`.

#[cfg(target_os = "windows")]
mod imp {
    use std::sync::atomic::{AtomicI32, Ordering};

    use windows::Win32::UI::WindowsAndMessaging::{
        GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN,
    };

    /// Cached virtual-screen geometry, refreshed on layout change.
    pub struct VirtualScreen {
        origin_x: AtomicI32,
        origin_y: AtomicI32,
        width: AtomicI32,
        height: AtomicI32,
    }

    impl VirtualScreen {
        pub fn new() -> Self {
            let screen = Self {
                origin_x: AtomicI32::new(0),
                origin_y: AtomicI32::new(0),
                width: AtomicI32::new(1),
                height: AtomicI32::new(1),
            };
            screen.refresh();
            screen
        }

        /// Re-reads the virtual screen geometry from the system. Call this
        /// when the capture backend observes `WM_DISPLAYCHANGE`.
        pub fn refresh(&self) {
            // SAFETY: GetSystemMetrics takes no pointers and cannot fail in a
            // way that is observable beyond its documented int return.
            unsafe {
                self.origin_x.store(GetSystemMetrics(SM_XVIRTUALSCREEN), Ordering::SeqCst);
                self.origin_y.store(GetSystemMetrics(SM_YVIRTUALSCREEN), Ordering::SeqCst);
                self.width.store(GetSystemMetrics(SM_CXVIRTUALSCREEN).max(1), Ordering::SeqCst);
                self.height.store(GetSystemMetrics(SM_CYVIRTUALSCREEN).max(1), Ordering::SeqCst);
            }
        }

        /// Normalizes an absolute screen coordinate to the `[0, 65535]` range
        /// `SendInput` expects, relative to the cached virtual screen origin.
        ///
        /// The virtual screen's `width`/`height` count pixels, so the last
        /// addressable column/row sits at `width - 1`/`height - 1`; dividing
        /// by that instead of the raw width is what makes the rightmost and
        /// bottommost pixel map to exactly `65535` rather than falling just
        /// short of it.
        pub fn normalize(&self, x: i32, y: i32) -> (i32, i32) {
            let ox = self.origin_x.load(Ordering::SeqCst);
            let oy = self.origin_y.load(Ordering::SeqCst);
            let w = (self.width.load(Ordering::SeqCst) - 1).max(1);
            let h = (self.height.load(Ordering::SeqCst) - 1).max(1);
            let nx = ((x - ox) * 65535 / w).clamp(0, 65535);
            let ny = ((y - oy) * 65535 / h).clamp(0, 65535);
            (nx, ny)
        }
    }

    impl Default for VirtualScreen {
        fn default() -> Self {
            Self::new()
        }
    }

}

#[cfg(target_os = "windows")]
pub use imp::VirtualScreen;
