//! macOS `CGEventTap` capture backend.
//!
//! A session-level event tap is created on a dedicated thread that also owns
//! the `CFRunLoop` the tap's source must be attached to; the tap callback
//! marshals decoded events to the registered handler and returns either the
//! original `CGEventRef` (pass through) or `None` (consume), matching
//! `CGEventTapCallBack`'s contract.

use std::ffi::c_void;
use std::os::raw::c_char;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};
use std::thread::JoinHandle;

use core_foundation::base::TCFType;
use core_foundation::runloop::{kCFRunLoopCommonModes, CFRunLoop};
use core_graphics::event::{
    CGEvent, CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement, CGEventType, CGKeyCode,
};

use crate::event::VirtualCode;
use crate::keymap::macos_vk::cgkeycode_to_vc;

use super::{CaptureBackend, CaptureError, RawEventHandler, RawInputEvent};

static HANDLER: OnceLock<Mutex<RawEventHandler>> = OnceLock::new();
static SUPPRESSION_ENABLED: AtomicBool = AtomicBool::new(false);
static STOP_FLAG: OnceLock<std::sync::Arc<AtomicBool>> = OnceLock::new();

/// `kCGEventFlagMaskCommand`/`Control`/`Alternate`/`Shift` left/right bits, as
/// set in `CGEventGetFlags` for a `FlagsChanged` event. `CGEventFlags` is not
/// exposed as named constants by the `core-graphics` crate's safe wrapper, so
/// these mirror `CGEventTypes.h` directly.
const NX_DEVICELSHIFTKEYMASK: u64 = 0x00000002;
const NX_DEVICERSHIFTKEYMASK: u64 = 0x00000004;
const NX_DEVICELCTLKEYMASK: u64 = 0x00000001;
const NX_DEVICERCTLKEYMASK: u64 = 0x00002000;
const NX_DEVICELALTKEYMASK: u64 = 0x00000020;
const NX_DEVICERALTKEYMASK: u64 = 0x00000040;
const NX_DEVICELCMDKEYMASK: u64 = 0x00000008;
const NX_DEVICERCMDKEYMASK: u64 = 0x00000010;

/// `NX_SYSDEFINED`'s raw `CGEventType` value (14). Media keys arrive as this
/// type rather than `KeyDown`/`KeyUp`; the crate has no named variant for it
/// since it is a private API, so the tap mask and match arm both reconstruct
/// it from the raw integer.
fn system_defined_event_type() -> CGEventType {
    // SAFETY: CGEventType is a C-style `#[repr(u32)]` enum; the tap callback
    // itself receives event types outside the named variant set (this one
    // included) by doing the same conversion from the OS's raw event type.
    unsafe { std::mem::transmute(14u32) }
}

fn libobjc_symbol(name: &[u8]) -> Option<usize> {
    unsafe {
        let handle = libc::dlopen(std::ptr::null(), libc::RTLD_NOW);
        if handle.is_null() {
            return None;
        }
        let sym = libc::dlsym(handle, name.as_ptr() as *const c_char);
        if sym.is_null() {
            None
        } else {
            Some(sym as usize)
        }
    }
}

fn objc_class(name: &[u8]) -> Option<*mut c_void> {
    static SYM: OnceLock<Option<usize>> = OnceLock::new();
    let addr = (*SYM.get_or_init(|| libobjc_symbol(b"objc_getClass\0")))?;
    let f: unsafe extern "C" fn(*const c_char) -> *mut c_void = unsafe { std::mem::transmute(addr) };
    let cls = unsafe { f(name.as_ptr() as *const c_char) };
    if cls.is_null() {
        None
    } else {
        Some(cls)
    }
}

fn objc_selector(name: &[u8]) -> Option<*mut c_void> {
    static SYM: OnceLock<Option<usize>> = OnceLock::new();
    let addr = (*SYM.get_or_init(|| libobjc_symbol(b"sel_registerName\0")))?;
    let f: unsafe extern "C" fn(*const c_char) -> *mut c_void = unsafe { std::mem::transmute(addr) };
    Some(unsafe { f(name.as_ptr() as *const c_char) })
}

/// Decodes an `NSSystemDefined` event's media-key payload into `(NX_KEYTYPE_*, is_down)`.
///
/// Bridges the raw `CGEventRef` to `NSEvent` via `objc_msgSend` (resolved
/// with the same `dlsym` approach [`crate::mainthread`] uses for
/// `dispatch_sync_f`) since `subtype`/`data1` are Cocoa-level accessors that
/// `CGEventField` has no constant for.
fn decode_media_key(cg_event: *mut c_void) -> Option<(i64, bool)> {
    let addr = libobjc_symbol(b"objc_msgSend\0")?;
    unsafe {
        let cls = objc_class(b"NSEvent\0")?;
        let with_cgevent = objc_selector(b"eventWithCGEvent:\0")?;
        let send_id: unsafe extern "C" fn(*mut c_void, *mut c_void, *mut c_void) -> *mut c_void = std::mem::transmute(addr);
        let ns_event = send_id(cls, with_cgevent, cg_event);
        if ns_event.is_null() {
            return None;
        }

        let subtype_sel = objc_selector(b"subtype\0")?;
        let send_short: unsafe extern "C" fn(*mut c_void, *mut c_void) -> i16 = std::mem::transmute(addr);
        const NX_SUBTYPE_AUX_CONTROL_BUTTONS: i16 = 8;
        if send_short(ns_event, subtype_sel) != NX_SUBTYPE_AUX_CONTROL_BUTTONS {
            return None;
        }

        let data1_sel = objc_selector(b"data1\0")?;
        let send_long: unsafe extern "C" fn(*mut c_void, *mut c_void) -> i64 = std::mem::transmute(addr);
        let data1 = send_long(ns_event, data1_sel);

        let key_code = (data1 & 0xFFFF0000) >> 16;
        let key_state = (data1 & 0x0000FF00) >> 8;
        Some((key_code, key_state == 0x0A))
    }
}

/// Maps an `NX_KEYTYPE_*` media-key code to a [`VirtualCode`], per
/// `IOKit/hidsystem/ev_keymap.h`.
fn nx_keytype_to_vc(code: i64) -> VirtualCode {
    match code {
        0 => VirtualCode::VolumeUp,
        1 => VirtualCode::VolumeDown,
        7 => VirtualCode::VolumeMute,
        16 => VirtualCode::MediaPlayPause,
        17 => VirtualCode::MediaNextTrack,
        18 => VirtualCode::MediaPrevTrack,
        _ => VirtualCode::Undefined,
    }
}

/// Returns the `FlagsChanged` device-mask bit that corresponds to a modifier
/// [`VirtualCode`], so the transition can be read directly off the event's
/// flags bitfield instead of needing a keycode-based down/up signal.
fn modifier_bit_for(vc: VirtualCode) -> Option<u64> {
    match vc {
        VirtualCode::ShiftLeft => Some(NX_DEVICELSHIFTKEYMASK),
        VirtualCode::ShiftRight => Some(NX_DEVICERSHIFTKEYMASK),
        VirtualCode::ControlLeft => Some(NX_DEVICELCTLKEYMASK),
        VirtualCode::ControlRight => Some(NX_DEVICERCTLKEYMASK),
        VirtualCode::AltLeft => Some(NX_DEVICELALTKEYMASK),
        VirtualCode::AltRight => Some(NX_DEVICERALTKEYMASK),
        VirtualCode::MetaLeft => Some(NX_DEVICELCMDKEYMASK),
        VirtualCode::MetaRight => Some(NX_DEVICERCMDKEYMASK),
        _ => None,
    }
}

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

/// Decodes a raw `CGEvent` into a [`RawInputEvent`], returning the handler's
/// consume verdict for the tap callback to act on.
fn handle_cg_event(event_type: CGEventType, event: &CGEvent) -> bool {
    let location = event.location();
    let x = location.x as i16;
    let y = location.y as i16;
    let time = now_ms();
    // CGEventTap reports injected synthetic events via a source-state marker
    // rather than a boolean flag; distinguishing a hookcore-originated event
    // from one injected by anything else is not attempted here, so
    // `injected` is always reported false for this backend.
    match event_type {
        CGEventType::KeyDown | CGEventType::KeyUp => {
            let keycode = event.get_integer_value_field(core_graphics::event::EventField::KEYBOARD_EVENT_KEYCODE) as CGKeyCode;
            let vc = cgkeycode_to_vc(keycode);
            if event_type == CGEventType::KeyDown {
                dispatch(RawInputEvent::KeyDown { vc, rawcode: keycode, time, injected: false })
            } else {
                dispatch(RawInputEvent::KeyUp { vc, rawcode: keycode, time, injected: false })
            }
        }
        CGEventType::FlagsChanged => {
            // Shift/Control/Option/Command transitions never arrive as
            // KeyDown/KeyUp; the tap only ever sees them here, decoded from
            // the event's own flags bitfield rather than a keycode payload.
            let keycode = event.get_integer_value_field(core_graphics::event::EventField::KEYBOARD_EVENT_KEYCODE) as CGKeyCode;
            let vc = cgkeycode_to_vc(keycode);
            let flags = event.get_flags().bits();
            let is_down = modifier_bit_for(vc).map(|bit| flags & bit != 0).unwrap_or(false);
            if is_down {
                dispatch(RawInputEvent::KeyDown { vc, rawcode: keycode, time, injected: false })
            } else {
                dispatch(RawInputEvent::KeyUp { vc, rawcode: keycode, time, injected: false })
            }
        }
        other if other == system_defined_event_type() => {
            // Media keys (volume/play-pause/next-track) arrive as
            // NX_SYSDEFINED events carrying an NX_KEYTYPE_* code, not as
            // ordinary key events.
            let raw = event.as_concrete_TypeRef() as *mut c_void;
            match decode_media_key(raw) {
                Some((nx_code, is_down)) => {
                    let vc = nx_keytype_to_vc(nx_code);
                    if is_down {
                        dispatch(RawInputEvent::KeyDown { vc, rawcode: nx_code as u16, time, injected: false })
                    } else {
                        dispatch(RawInputEvent::KeyUp { vc, rawcode: nx_code as u16, time, injected: false })
                    }
                }
                None => false,
            }
        }
        CGEventType::MouseMoved | CGEventType::LeftMouseDragged | CGEventType::RightMouseDragged | CGEventType::OtherMouseDragged => {
            dispatch(RawInputEvent::MouseMove { x, y, time, injected: false })
        }
        CGEventType::LeftMouseDown => dispatch(RawInputEvent::MouseButtonDown { button: 1, x, y, time, injected: false }),
        CGEventType::LeftMouseUp => dispatch(RawInputEvent::MouseButtonUp { button: 1, x, y, time, injected: false }),
        CGEventType::RightMouseDown => dispatch(RawInputEvent::MouseButtonDown { button: 2, x, y, time, injected: false }),
        CGEventType::RightMouseUp => dispatch(RawInputEvent::MouseButtonUp { button: 2, x, y, time, injected: false }),
        CGEventType::OtherMouseDown => dispatch(RawInputEvent::MouseButtonDown { button: 3, x, y, time, injected: false }),
        CGEventType::OtherMouseUp => dispatch(RawInputEvent::MouseButtonUp { button: 3, x, y, time, injected: false }),
        CGEventType::ScrollWheel => {
            let delta = event.get_integer_value_field(core_graphics::event::EventField::SCROLL_WHEEL_EVENT_DELTA_AXIS_1) as i32;
            let hdelta = event.get_integer_value_field(core_graphics::event::EventField::SCROLL_WHEEL_EVENT_DELTA_AXIS_2) as i32;
            if hdelta != 0 {
                dispatch(RawInputEvent::MouseWheel { delta: hdelta, horizontal: true, x, y, time, injected: false })
            } else {
                dispatch(RawInputEvent::MouseWheel { delta, horizontal: false, x, y, time, injected: false })
            }
        }
        _ => false,
    }
}

/// Installs a session-level event tap and runs the owning thread's run loop
/// until `stop_flag` is observed.
fn run_tap_loop(stop_flag: std::sync::Arc<AtomicBool>) -> Result<(), CaptureError> {
    let events_of_interest = vec![
        CGEventType::KeyDown,
        CGEventType::KeyUp,
        CGEventType::FlagsChanged,
        system_defined_event_type(),
        CGEventType::MouseMoved,
        CGEventType::LeftMouseDown,
        CGEventType::LeftMouseUp,
        CGEventType::LeftMouseDragged,
        CGEventType::RightMouseDown,
        CGEventType::RightMouseUp,
        CGEventType::RightMouseDragged,
        CGEventType::OtherMouseDown,
        CGEventType::OtherMouseUp,
        CGEventType::OtherMouseDragged,
        CGEventType::ScrollWheel,
    ];

    let tap = CGEventTap::new(
        CGEventTapLocation::HID,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::Default,
        events_of_interest,
        |_proxy, event_type, event| {
            let consume = handle_cg_event(event_type, &event);
            if consume && SUPPRESSION_ENABLED.load(Ordering::SeqCst) {
                None
            } else {
                Some(event.clone())
            }
        },
    )
    .map_err(|_| CaptureError::KeyboardHookInstallFailed)?;

    let current = CFRunLoop::get_current();
    let source = tap.mach_port.create_runloop_source(0).map_err(|_| CaptureError::KeyboardHookInstallFailed)?;
    unsafe {
        current.add_source(&source, kCFRunLoopCommonModes);
    }
    tap.enable();
    crate::logger::log(crate::logger::LogLevel::Info, "macos event tap installed");

    while !stop_flag.load(Ordering::SeqCst) {
        CFRunLoop::run_in_mode(unsafe { core_foundation::runloop::kCFRunLoopDefaultMode }, std::time::Duration::from_millis(50), false);
    }

    crate::logger::log(crate::logger::LogLevel::Info, "macos event tap torn down");
    Ok(())
}

/// Installs a macOS session-level event tap on a dedicated thread.
///
/// Requires Accessibility (or Input Monitoring) permission to have already
/// been granted to the process; callers should surface
/// [`crate::error::HookError::MacAxDisabled`] if the tap fails to create.
pub struct MacosCaptureBackend {
    thread: Option<JoinHandle<Result<(), CaptureError>>>,
    stop_flag: std::sync::Arc<AtomicBool>,
}

impl MacosCaptureBackend {
    pub fn new() -> Self {
        Self { thread: None, stop_flag: std::sync::Arc::new(AtomicBool::new(false)) }
    }

    pub fn set_suppression_enabled(&self, enabled: bool) {
        SUPPRESSION_ENABLED.store(enabled, Ordering::SeqCst);
    }
}

impl Default for MacosCaptureBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for MacosCaptureBackend {
    fn start(&mut self, handler: RawEventHandler) -> Result<(), CaptureError> {
        if self.thread.is_some() {
            return Err(CaptureError::AlreadyRunning);
        }
        if HANDLER.set(Mutex::new(handler)).is_err() {
            return Err(CaptureError::AlreadyRunning);
        }
        let _ = STOP_FLAG.set(std::sync::Arc::clone(&self.stop_flag));

        let stop_flag = std::sync::Arc::clone(&self.stop_flag);
        let thread = std::thread::Builder::new()
            .name("hookcore-macos-capture".into())
            .spawn(move || run_tap_loop(stop_flag))
            .map_err(|_| CaptureError::KeyboardHookInstallFailed)?;

        self.thread = Some(thread);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        let thread = self.thread.take().ok_or(CaptureError::AlreadyStopped)?;
        self.stop_flag.store(true, Ordering::SeqCst);
        let _ = thread.join();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_backend_has_no_thread() {
        let backend = MacosCaptureBackend::new();
        assert!(backend.thread.is_none());
    }

    #[test]
    fn test_nx_keytype_maps_known_media_keys() {
        assert_eq!(nx_keytype_to_vc(0), VirtualCode::VolumeUp);
        assert_eq!(nx_keytype_to_vc(7), VirtualCode::VolumeMute);
        assert_eq!(nx_keytype_to_vc(16), VirtualCode::MediaPlayPause);
        assert_eq!(nx_keytype_to_vc(99), VirtualCode::Undefined);
    }

    #[test]
    fn test_modifier_bit_for_distinguishes_left_and_right() {
        let left = modifier_bit_for(VirtualCode::ShiftLeft).unwrap();
        let right = modifier_bit_for(VirtualCode::ShiftRight).unwrap();
        assert_ne!(left, right);
        assert!(modifier_bit_for(VirtualCode::KeyA).is_none());
    }

    #[test]
    fn test_system_defined_event_type_is_distinct_from_named_variants() {
        assert_ne!(system_defined_event_type(), CGEventType::KeyDown);
        assert_ne!(system_defined_event_type(), CGEventType::FlagsChanged);
    }
}
