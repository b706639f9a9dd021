//! X11 `RECORD` extension capture backend.
//!
//! Opens a dedicated "data" display connection (RECORD requires a second
//! connection distinct from the one used for synthesis/queries), allocates a
//! range covering `KeyPress..MotionNotify` and `DeviceValuator`, creates a
//! context, and enables it synchronously so the wire-decode callback fires
//! on the calling thread. `XkbSetDetectableAutoRepeat` is requested so
//! autorepeated key-down events can be told apart from a held key later if a
//! caller needs to.

use std::ffi::c_void;
use std::os::raw::c_int;
use std::sync::{Mutex, OnceLock};
use std::thread::JoinHandle;

use x11::xlib;
use x11::xrecord;

use crate::keymap::x11_xkb::XkbKeycodeTable;

use super::{CaptureBackend, CaptureError, RawEventHandler, RawInputEvent};

static HANDLER: OnceLock<Mutex<RawEventHandler>> = OnceLock::new();
static KEYCODE_TABLE: OnceLock<Mutex<XkbKeycodeTable>> = OnceLock::new();
/// The control-display connection and context, stashed so `stop()` can issue
/// `XRecordDisableContext` from outside the capture thread to unblock its
/// `XRecordEnableContext` call. The display pointer is carried as `usize`
/// since raw pointers aren't `Send`; X11's `Display*` is safe to share this
/// way as long as only one thread calls into it at a time, which holds here
/// since `stop()` only ever issues the one disable call.
static CONTROL_CTX: OnceLock<Mutex<Option<(usize, xrecord::XRecordContext)>>> = OnceLock::new();

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

/// Walks `min_keycode..=max_keycode` on `display`, resolving each position's
/// Xkb symbolic name, and builds a fresh [`XkbKeycodeTable`].
///
/// Called once at start and again whenever the caller observes
/// `XkbNewKeyboardNotify` (layout change).
fn build_keycode_table(display: *mut xlib::Display) -> XkbKeycodeTable {
    unsafe {
        let mut min_keycode: c_int = 0;
        let mut max_keycode: c_int = 0;
        xlib::XDisplayKeycodes(display, &mut min_keycode, &mut max_keycode);

        let desc = x11::xkb::XkbGetMap(display, x11::xkb::XkbAllClientInfoMask, x11::xkb::XkbUseCoreKbd);
        if desc.is_null() {
            return XkbKeycodeTable::default();
        }
        let got_names = x11::xkb::XkbGetNames(display, x11::xkb::XkbKeyNamesMask, desc);
        if got_names != 0 {
            x11::xkb::XkbFreeKeyboard(desc, 0, 1);
            return XkbKeycodeTable::default();
        }

        let mut entries = Vec::new();
        let names = (*desc).names;
        if !names.is_null() {
            let key_names = (*names).keys;
            if !key_names.is_null() {
                for kc in min_keycode..=max_keycode {
                    let entry = &*key_names.add(kc as usize);
                    let raw = &entry.name;
                    let bytes: Vec<u8> = raw.iter().take_while(|&&b| b != 0).map(|&b| b as u8).collect();
                    if let Ok(name) = std::str::from_utf8(&bytes) {
                        entries.push((kc as u8, name.to_string()));
                    }
                }
            }
        }

        x11::xkb::XkbFreeKeyboard(desc, 0, 1);

        XkbKeycodeTable::build(entries.iter().map(|(kc, name)| (*kc, name.as_str())))
    }
}

fn table_native_to_vc(keycode: u8) -> crate::event::VirtualCode {
    KEYCODE_TABLE
        .get()
        .map(|t| t.lock().unwrap().native_to_vc(keycode))
        .unwrap_or(crate::event::VirtualCode::Undefined)
}

/// RECORD wire-decode callback: receives raw protocol bytes for each event
/// in the enabled range and must decode them into synthetic X events before
/// they can be interpreted.
unsafe extern "C" fn record_callback(_closure: *mut c_void, data: *mut xrecord::XRecordInterceptData) {
    if data.is_null() {
        return;
    }
    let record = &*data;
    if record.category != xrecord::XRecordFromServer {
        xrecord::XRecordFreeData(data);
        return;
    }

    let event_type = *(record.data as *const u8) as i32;
    let time = now_ms();

    match event_type {
        2 | 3 => {
            // KeyPress / KeyRelease: byte 1 holds the keycode per the core
            // X11 wire protocol event layout.
            let keycode = *(record.data.add(1));
            let vc = table_native_to_vc(keycode);
            if event_type == 2 {
                dispatch(RawInputEvent::KeyDown { vc, rawcode: keycode as u16, time, injected: false });
            } else {
                dispatch(RawInputEvent::KeyUp { vc, rawcode: keycode as u16, time, injected: false });
            }
        }
        4 | 5 => {
            // ButtonPress / ButtonRelease
            let button = *(record.data.add(1));
            let x = *(record.data.add(24) as *const i16);
            let y = *(record.data.add(26) as *const i16);
            if button == 4 || button == 5 {
                let delta = if button == 4 { 1 } else { -1 };
                dispatch(RawInputEvent::MouseWheel { delta, horizontal: false, x, y, time, injected: false });
            } else if event_type == 4 {
                dispatch(RawInputEvent::MouseButtonDown { button, x, y, time, injected: false });
            } else {
                dispatch(RawInputEvent::MouseButtonUp { button, x, y, time, injected: false });
            }
        }
        6 => {
            // MotionNotify
            let x = *(record.data.add(24) as *const i16);
            let y = *(record.data.add(26) as *const i16);
            dispatch(RawInputEvent::MouseMove { x, y, time, injected: false });
        }
        _ => {}
    }

    xrecord::XRecordFreeData(data);
}

fn run_record_loop() -> Result<(), CaptureError> {
    unsafe {
        let control_display = xlib::XOpenDisplay(std::ptr::null());
        if control_display.is_null() {
            return Err(CaptureError::KeyboardHookInstallFailed);
        }
        let data_display = xlib::XOpenDisplay(std::ptr::null());
        if data_display.is_null() {
            xlib::XCloseDisplay(control_display);
            return Err(CaptureError::KeyboardHookInstallFailed);
        }

        let table = build_keycode_table(control_display);
        let _ = KEYCODE_TABLE.set(Mutex::new(table));

        x11::xkb::XkbSetDetectableAutoRepeat(control_display, 1, std::ptr::null_mut());

        let range = xrecord::XRecordAllocRange();
        if range.is_null() {
            xlib::XCloseDisplay(control_display);
            xlib::XCloseDisplay(data_display);
            return Err(CaptureError::KeyboardHookInstallFailed);
        }
        (*range).device_events.first = 2; // KeyPress
        (*range).device_events.last = 6; // MotionNotify

        let mut clients = [xrecord::XRecordAllClients];
        let context = xrecord::XRecordCreateContext(
            control_display,
            0,
            clients.as_mut_ptr(),
            1,
            &mut (range as *mut xrecord::XRecordRange),
            1,
        );
        xlib::XFree(range as *mut c_void);

        if context == 0 {
            xlib::XCloseDisplay(control_display);
            xlib::XCloseDisplay(data_display);
            return Err(CaptureError::KeyboardHookInstallFailed);
        }

        xlib::XSync(control_display, xlib::False);

        let _ = CONTROL_CTX.set(Mutex::new(Some((control_display as usize, context))));
        crate::logger::log(crate::logger::LogLevel::Info, "x11 RECORD context installed");

        // Blocks for the lifetime of the session: `record_callback` fires on
        // this thread for every event in the enabled range until a second
        // connection (`stop()`'s `control_display`) issues
        // `XRecordDisableContext`, at which point this call returns.
        xrecord::XRecordEnableContext(data_display, context, Some(record_callback), std::ptr::null_mut());

        *CONTROL_CTX.get_or_init(|| Mutex::new(None)).lock().unwrap() = None;
        xrecord::XRecordFreeContext(control_display, context);
        xlib::XCloseDisplay(data_display);
        xlib::XCloseDisplay(control_display);
        crate::logger::log(crate::logger::LogLevel::Info, "x11 RECORD context torn down");
    }
    Ok(())
}

/// Installs an X11 RECORD-extension capture on a dedicated thread.
pub struct X11CaptureBackend {
    thread: Option<JoinHandle<Result<(), CaptureError>>>,
}

impl X11CaptureBackend {
    pub fn new() -> Self {
        Self { thread: None }
    }
}

impl Default for X11CaptureBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for X11CaptureBackend {
    fn start(&mut self, handler: RawEventHandler) -> Result<(), CaptureError> {
        if self.thread.is_some() {
            return Err(CaptureError::AlreadyRunning);
        }
        if HANDLER.set(Mutex::new(handler)).is_err() {
            return Err(CaptureError::AlreadyRunning);
        }

        let thread = std::thread::Builder::new()
            .name("hookcore-x11-capture".into())
            .spawn(run_record_loop)
            .map_err(|_| CaptureError::KeyboardHookInstallFailed)?;

        self.thread = Some(thread);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        let thread = self.thread.take().ok_or(CaptureError::AlreadyStopped)?;

        // `run_record_loop`'s `XRecordEnableContext` call blocks the capture
        // thread until a *different* display connection disables the
        // context; issue that disable here so the join below can complete.
        if let Some(lock) = CONTROL_CTX.get() {
            if let Some((control_display_raw, context)) = lock.lock().unwrap().take() {
                unsafe {
                    let control_display = control_display_raw as *mut xlib::Display;
                    xrecord::XRecordDisableContext(control_display, context);
                    xlib::XFlush(control_display);
                }
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
    fn test_new_backend_has_no_thread() {
        let backend = X11CaptureBackend::new();
        assert!(backend.thread.is_none());
    }
}
