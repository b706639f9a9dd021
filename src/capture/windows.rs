//! Windows low-level hook capture backend.
//!
//! Installs `WH_KEYBOARD_LL` and `WH_MOUSE_LL` from a dedicated thread that
//! also owns the message loop the hooks require (`SetWindowsHookExW`'s
//! low-level hooks only fire while their installing thread is pumping
//! messages). `LLKHF_INJECTED`/`LLMHF_INJECTED` are decoded and carried on
//! every dispatched event instead of being filtered here: a `SendInput` call
//! does loop back through this hook, and it is up to whatever sits on the
//! other end of [`RawEventHandler`] to decide whether a loopback echo should
//! be ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};
use std::thread::JoinHandle;

use windows::Win32::Foundation::{HMODULE, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW, TranslateMessage,
    UnhookWindowsHookEx, HHOOK, KBDLLHOOKSTRUCT, LLKHF_EXTENDED, LLKHF_INJECTED, MSG, MSLLHOOKSTRUCT,
    WH_KEYBOARD_LL, WH_MOUSE_LL, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN,
    WM_MBUTTONUP, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_MOUSEHWHEEL, WM_QUIT, WM_RBUTTONDOWN, WM_RBUTTONUP,
    WM_SYSKEYDOWN, WM_SYSKEYUP, WM_XBUTTONDOWN, WM_XBUTTONUP,
};

use crate::keymap::windows_vk::vk_to_vc;

use super::{CaptureBackend, CaptureError, RawEventHandler, RawInputEvent};

const XBUTTON1: u16 = 0x0001;
const XBUTTON2: u16 = 0x0002;

static HANDLER: OnceLock<Mutex<RawEventHandler>> = OnceLock::new();
static SUPPRESS_KEYBOARD: AtomicBool = AtomicBool::new(false);
static SUPPRESS_MOUSE: AtomicBool = AtomicBool::new(false);
static LOOP_THREAD_ID: OnceLock<u32> = OnceLock::new();

fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

fn dispatch(event: RawInputEvent) -> bool {
    match HANDLER.get() {
        Some(handler) => (handler.lock().unwrap())(event),
        None => false,
    }
}

unsafe extern "system" fn keyboard_hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code < 0 {
        return CallNextHookEx(HHOOK::default(), code, wparam, lparam);
    }

    let kbd = *(lparam.0 as *const KBDLLHOOKSTRUCT);
    let injected = kbd.flags & LLKHF_INJECTED != 0;

    let mut vc = vk_to_vc(kbd.vkCode as u8);
    if vc == crate::event::VirtualCode::Enter && kbd.flags & LLKHF_EXTENDED != 0 {
        vc = crate::event::VirtualCode::NumpadEnter;
    }

    let is_down = wparam.0 as u32 == WM_KEYDOWN || wparam.0 as u32 == WM_SYSKEYDOWN;
    let is_up = wparam.0 as u32 == WM_KEYUP || wparam.0 as u32 == WM_SYSKEYUP;

    let consumed = if is_down {
        dispatch(RawInputEvent::KeyDown { vc, rawcode: kbd.vkCode as u16, time: now_ms(), injected })
    } else if is_up {
        dispatch(RawInputEvent::KeyUp { vc, rawcode: kbd.vkCode as u16, time: now_ms(), injected })
    } else {
        false
    };

    if consumed && SUPPRESS_KEYBOARD.load(Ordering::SeqCst) {
        LRESULT(1)
    } else {
        CallNextHookEx(HHOOK::default(), code, wparam, lparam)
    }
}

unsafe extern "system" fn mouse_hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code < 0 {
        return CallNextHookEx(HHOOK::default(), code, wparam, lparam);
    }

    let mhs = *(lparam.0 as *const MSLLHOOKSTRUCT);
    let injected = mhs.flags & 0x1 != 0; // LLMHF_INJECTED

    let x = mhs.pt.x as i16;
    let y = mhs.pt.y as i16;
    let time = now_ms();
    let msg = wparam.0 as u32;

    // The high word of mouseData distinguishes XBUTTON1 from XBUTTON2 on both
    // WM_XBUTTONDOWN and WM_XBUTTONUP; the button index must never be
    // hardcoded to a single extra button here.
    let xbutton_hiword = (mhs.mouseData >> 16) as u16;

    let consumed = match msg {
        WM_MOUSEMOVE => dispatch(RawInputEvent::MouseMove { x, y, time, injected }),
        WM_LBUTTONDOWN => dispatch(RawInputEvent::MouseButtonDown { button: 1, x, y, time, injected }),
        WM_LBUTTONUP => dispatch(RawInputEvent::MouseButtonUp { button: 1, x, y, time, injected }),
        WM_RBUTTONDOWN => dispatch(RawInputEvent::MouseButtonDown { button: 2, x, y, time, injected }),
        WM_RBUTTONUP => dispatch(RawInputEvent::MouseButtonUp { button: 2, x, y, time, injected }),
        WM_MBUTTONDOWN => dispatch(RawInputEvent::MouseButtonDown { button: 3, x, y, time, injected }),
        WM_MBUTTONUP => dispatch(RawInputEvent::MouseButtonUp { button: 3, x, y, time, injected }),
        WM_XBUTTONDOWN => {
            let button = if xbutton_hiword == XBUTTON1 { 4 } else if xbutton_hiword == XBUTTON2 { 5 } else { 0 };
            dispatch(RawInputEvent::MouseButtonDown { button, x, y, time, injected })
        }
        WM_XBUTTONUP => {
            let button = if xbutton_hiword == XBUTTON1 { 4 } else if xbutton_hiword == XBUTTON2 { 5 } else { 0 };
            dispatch(RawInputEvent::MouseButtonUp { button, x, y, time, injected })
        }
        WM_MOUSEWHEEL => {
            let delta = (mhs.mouseData >> 16) as i16 as i32;
            dispatch(RawInputEvent::MouseWheel { delta, horizontal: false, x, y, time, injected })
        }
        WM_MOUSEHWHEEL => {
            let delta = (mhs.mouseData >> 16) as i16 as i32;
            dispatch(RawInputEvent::MouseWheel { delta, horizontal: true, x, y, time, injected })
        }
        _ => false,
    };

    if consumed && SUPPRESS_MOUSE.load(Ordering::SeqCst) {
        LRESULT(1)
    } else {
        CallNextHookEx(HHOOK::default(), code, wparam, lparam)
    }
}

/// Runs the installing thread: installs both hooks, pumps `GetMessageW`
/// until `WM_QUIT`, then unhooks.
fn run_hook_message_loop() -> Result<(), CaptureError> {
    unsafe {
        let hinstance: HMODULE = GetModuleHandleW(None).map_err(|_| CaptureError::KeyboardHookInstallFailed)?;

        let kbd_hook = SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), hinstance, 0)
            .map_err(|_| CaptureError::KeyboardHookInstallFailed)?;
        let mouse_hook = SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), hinstance, 0)
            .map_err(|_| CaptureError::MouseHookInstallFailed)?;
        crate::logger::log(crate::logger::LogLevel::Info, "windows low-level keyboard/mouse hooks installed");

        let mut msg = MSG::default();
        loop {
            let ret = GetMessageW(&mut msg, None, 0, 0);
            if ret.0 <= 0 {
                break;
            }
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }

        let _ = UnhookWindowsHookEx(kbd_hook);
        let _ = UnhookWindowsHookEx(mouse_hook);
        crate::logger::log(crate::logger::LogLevel::Info, "windows low-level keyboard/mouse hooks removed");
    }
    Ok(())
}

/// Installs the low-level keyboard and mouse hooks and runs their message
/// loop on a dedicated thread.
pub struct WindowsCaptureBackend {
    thread: Option<JoinHandle<Result<(), CaptureError>>>,
}

impl WindowsCaptureBackend {
    pub fn new() -> Self {
        Self { thread: None }
    }

    /// When `true`, consumed keyboard/mouse events are actually suppressed
    /// from reaching the rest of the system (`LRESULT(1)`); otherwise the
    /// handler's verdict is observed but every event still passes through.
    pub fn set_suppression_enabled(&self, keyboard: bool, mouse: bool) {
        SUPPRESS_KEYBOARD.store(keyboard, Ordering::SeqCst);
        SUPPRESS_MOUSE.store(mouse, Ordering::SeqCst);
    }
}

impl Default for WindowsCaptureBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for WindowsCaptureBackend {
    fn start(&mut self, handler: RawEventHandler) -> Result<(), CaptureError> {
        if self.thread.is_some() {
            return Err(CaptureError::AlreadyRunning);
        }
        if HANDLER.set(Mutex::new(handler)).is_err() {
            return Err(CaptureError::AlreadyRunning);
        }

        let thread = std::thread::Builder::new()
            .name("hookcore-windows-capture".into())
            .spawn(run_hook_message_loop)
            .map_err(|_| CaptureError::KeyboardHookInstallFailed)?;

        // SAFETY: GetCurrentThreadId has no preconditions.
        let tid = unsafe { windows::Win32::System::Threading::GetCurrentThreadId() };
        let _ = LOOP_THREAD_ID.set(tid);

        self.thread = Some(thread);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        let thread = self.thread.take().ok_or(CaptureError::AlreadyStopped)?;
        if let Some(&tid) = LOOP_THREAD_ID.get() {
            unsafe {
                let _ = PostThreadMessageW(tid, WM_QUIT, WPARAM(0), LPARAM(0));
            }
        }
        let _ = thread.join();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xbutton_hiword_distinguishes_button4_and_5() {
        let data_button1: u32 = (XBUTTON1 as u32) << 16;
        let data_button2: u32 = (XBUTTON2 as u32) << 16;
        assert_eq!((data_button1 >> 16) as u16, XBUTTON1);
        assert_eq!((data_button2 >> 16) as u16, XBUTTON2);
    }

    #[test]
    fn test_new_backend_has_no_thread() {
        let backend = WindowsCaptureBackend::new();
        assert!(backend.thread.is_none());
    }
}
