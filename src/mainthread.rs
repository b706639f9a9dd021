//! macOS main-thread marshaling (§4.6).
//!
//! Text Input Source APIs (`TISCopyCurrentKeyboardInputSource`,
//! `UCKeyTranslate`) are only safe to call from the main thread, but the
//! capture backend's event tap callback runs on whatever thread owns the
//! tap's run loop. [`run_on_main`] marshals a closure onto the main thread
//! and blocks the caller until it completes.
//!
//! The preferred path is `dispatch_sync_f` (libdispatch), resolved via
//! `dlsym` since this crate does not otherwise depend on a libdispatch
//! binding crate. When libdispatch is unavailable, a `CFRunLoopSource`
//! signaled on the main run loop plus a condition variable is used instead;
//! a `kCFRunLoopExit` observer guards against blocking forever if the main
//! run loop is torn down mid-call.

#[cfg(target_os = "macos")]
mod imp {
    use std::ffi::c_void;
    use std::os::raw::c_char;
    use std::sync::{Condvar, Mutex, OnceLock};

    use core_foundation::base::TCFType;
    use core_foundation::runloop::{CFRunLoop, CFRunLoopSource, CFRunLoopSourceContext};

    type DispatchSyncF = unsafe extern "C" fn(*mut c_void, *mut c_void, unsafe extern "C" fn(*mut c_void));

    fn dispatch_sync_f_symbol() -> Option<DispatchSyncF> {
        static SYMBOL: OnceLock<Option<usize>> = OnceLock::new();
        let addr = *SYMBOL.get_or_init(|| unsafe {
            let name = b"dispatch_sync_f\0";
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
        });
        addr.map(|a| unsafe { std::mem::transmute::<usize, DispatchSyncF>(a) })
    }

    fn main_queue() -> *mut c_void {
        unsafe extern "C" {
            static _dispatch_main_q: c_void;
        }
        unsafe { &_dispatch_main_q as *const c_void as *mut c_void }
    }

    unsafe extern "C" fn trampoline<F: FnMut()>(ctx: *mut c_void) {
        let closure = &mut *(ctx as *mut F);
        closure();
    }

    /// Runs `f` on the main thread and blocks until it returns.
    ///
    /// Must not be called from the main thread itself (it would deadlock
    /// against its own run loop in the fallback path); callers are
    /// responsible for only invoking this from the capture backend's worker
    /// thread.
    pub fn run_on_main<F: FnMut()>(mut f: F) {
        if let Some(dispatch_sync_f) = dispatch_sync_f_symbol() {
            unsafe {
                dispatch_sync_f(main_queue(), &mut f as *mut F as *mut c_void, trampoline::<F>);
            }
            return;
        }
        run_on_main_via_runloop_source(f);
    }

    struct FallbackState {
        done: Mutex<bool>,
        condvar: Condvar,
    }

    fn run_on_main_via_runloop_source<F: FnMut()>(mut f: F) {
        let state = std::sync::Arc::new(FallbackState { done: Mutex::new(false), condvar: Condvar::new() });

        struct Payload<'a, F: FnMut()> {
            f: &'a mut F,
            state: std::sync::Arc<FallbackState>,
        }

        extern "C" fn perform<F: FnMut()>(info: *mut c_void) {
            unsafe {
                let payload = &mut *(info as *mut Payload<F>);
                (payload.f)();
                let mut done = payload.state.done.lock().unwrap();
                *done = true;
                payload.state.condvar.notify_all();
            }
        }

        let mut payload = Payload { f: &mut f, state: std::sync::Arc::clone(&state) };

        let mut context = CFRunLoopSourceContext {
            version: 0,
            info: &mut payload as *mut Payload<F> as *mut c_void,
            retain: None,
            release: None,
            copyDescription: None,
            equal: None,
            hash: None,
            schedule: None,
            cancel: None,
            perform: perform::<F>,
        };

        unsafe {
            let source = CFRunLoopSource::wrap_under_create_rule(core_foundation::runloop::CFRunLoopSourceCreate(
                std::ptr::null(),
                0,
                &mut context,
            ));
            let main = CFRunLoop::get_main();
            main.add_source(&source, core_foundation::runloop::kCFRunLoopCommonModes);
            core_foundation::runloop::CFRunLoopSourceSignal(source.as_concrete_TypeRef());
            main.wakeup();
        }

        let mut done = state.done.lock().unwrap();
        while !*done {
            let (guard, _timeout) = state.condvar.wait_timeout(done, std::time::Duration::from_millis(50)).unwrap();
            done = guard;
        }
    }
}

#[cfg(target_os = "macos")]
pub use imp::run_on_main;
