//! Singleton session controller (C8): `run`/`run_keyboard`/`run_mouse`/`stop`.
//!
//! Only one hook session may be active per process. The controller owns the
//! platform [`CaptureBackend`], a [`Dispatcher`], and the handler the caller
//! registered, and runs the capture backend's dedicated thread for the
//! session's lifetime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::capture::{CaptureBackend, RawInputEvent};
use crate::config::HookConfig;
use crate::dispatch::{Dispatcher, EventHandler};
use crate::error::{HookError, Result};
use crate::unicode::UnicodeResolver;

static RUNNING: AtomicBool = AtomicBool::new(false);

/// Which half of the capture surface a session listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionScope {
    Both,
    KeyboardOnly,
    MouseOnly,
}

/// Owns one hook session: the capture backend thread, the dispatcher, and
/// the consume-verdict wiring between them.
pub struct HookSession<B: CaptureBackend + 'static> {
    backend: Mutex<Option<B>>,
}

impl<B: CaptureBackend + 'static> HookSession<B> {
    pub fn new(backend: B) -> Self {
        Self { backend: Mutex::new(Some(backend)) }
    }

    /// Starts the session with [`HookConfig::default`]. See [`Self::run_with_config`].
    pub fn run<H>(&self, scope: SessionScope, handler: H, resolver: Box<dyn UnicodeResolver>) -> Result<()>
    where
        H: EventHandler + 'static,
    {
        self.run_with_config(scope, handler, resolver, HookConfig::default())
    }

    /// Starts the session: installs the capture backend and wires its raw
    /// events through a [`Dispatcher`] into `handler`, tuned by `config`.
    /// Only one session may run per process; calling this while another is
    /// active returns [`HookError::AlreadyRunning`].
    pub fn run_with_config<H>(&self, scope: SessionScope, handler: H, resolver: Box<dyn UnicodeResolver>, config: HookConfig) -> Result<()>
    where
        H: EventHandler + 'static,
    {
        if RUNNING.swap(true, Ordering::SeqCst) {
            return Err(HookError::AlreadyRunning);
        }

        let dispatcher = Mutex::new(Dispatcher::new(handler, resolver, config));
        let scope_filter = scope;

        let mut guard = self.backend.lock().unwrap();
        let backend = guard.as_mut().ok_or(HookError::NotInitialized)?;

        let start_result = backend.start(Box::new(move |raw: RawInputEvent| {
            if !scope_matches(scope_filter, &raw) {
                return false;
            }
            dispatcher.lock().unwrap().handle_raw(raw)
        }));

        match &start_result {
            Ok(()) => crate::logger::log(crate::logger::LogLevel::Info, "hook session started"),
            Err(_) => {
                RUNNING.store(false, Ordering::SeqCst);
                crate::logger::log(crate::logger::LogLevel::Error, "hook session failed to start");
            }
        }
        start_result.map_err(|_| HookError::Failure)
    }

    /// Stops the session. Returns [`HookError::NotRunning`] if no session is
    /// active.
    pub fn stop(&self) -> Result<()> {
        if !RUNNING.swap(false, Ordering::SeqCst) {
            return Err(HookError::NotRunning);
        }
        let mut guard = self.backend.lock().unwrap();
        let backend = guard.as_mut().ok_or(HookError::NotInitialized)?;
        let result = backend.stop().map_err(|_| HookError::Failure);
        crate::logger::log(crate::logger::LogLevel::Info, "hook session stopped");
        result
    }

    pub fn is_running(&self) -> bool {
        RUNNING.load(Ordering::SeqCst)
    }
}

fn scope_matches(scope: SessionScope, raw: &RawInputEvent) -> bool {
    let is_keyboard = matches!(raw, RawInputEvent::KeyDown { .. } | RawInputEvent::KeyUp { .. });
    match scope {
        SessionScope::Both => true,
        SessionScope::KeyboardOnly => is_keyboard,
        SessionScope::MouseOnly => !is_keyboard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::mock::MockCaptureBackend;
    use crate::event::{EventType, VirtualCode, VirtualEvent};
    use crate::unicode::mock::MockResolver;
    use std::sync::Arc;

    struct TestHandler {
        seen: Arc<Mutex<Vec<VirtualEvent>>>,
    }

    impl EventHandler for TestHandler {
        fn handle(&mut self, event: VirtualEvent) -> bool {
            self.seen.lock().unwrap().push(event);
            false
        }
    }

    #[test]
    fn test_run_then_stop_toggles_running_flag() {
        RUNNING.store(false, Ordering::SeqCst); // isolate from other tests in this binary
        let session = HookSession::new(MockCaptureBackend::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        session.run(SessionScope::Both, TestHandler { seen: Arc::clone(&seen) }, Box::new(MockResolver::ascii_lowercase())).unwrap();
        assert!(session.is_running());

        session.stop().unwrap();
        assert!(!session.is_running());
    }

    #[test]
    fn test_double_run_fails_with_already_running() {
        RUNNING.store(false, Ordering::SeqCst);
        let session_a = HookSession::new(MockCaptureBackend::new());
        let session_b = HookSession::new(MockCaptureBackend::new());
        session_a.run(SessionScope::Both, |_: VirtualEvent| false, Box::new(MockResolver::ascii_lowercase())).unwrap();

        let result = session_b.run(SessionScope::Both, |_: VirtualEvent| false, Box::new(MockResolver::ascii_lowercase()));
        assert_eq!(result, Err(HookError::AlreadyRunning));

        session_a.stop().unwrap();
    }

    #[test]
    fn test_stop_without_run_fails_with_not_running() {
        RUNNING.store(false, Ordering::SeqCst);
        let session = HookSession::new(MockCaptureBackend::new());
        assert_eq!(session.stop(), Err(HookError::NotRunning));
    }

    #[test]
    fn test_keyboard_only_scope_filters_mouse_events() {
        RUNNING.store(false, Ordering::SeqCst);
        let session = HookSession::new(MockCaptureBackend::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        session.run(SessionScope::KeyboardOnly, TestHandler { seen: Arc::clone(&seen) }, Box::new(MockResolver::ascii_lowercase())).unwrap();

        {
            let guard = session.backend.lock().unwrap();
            let backend = guard.as_ref().unwrap();
            backend.inject(RawInputEvent::MouseMove { x: 0, y: 0, time: 1, injected: false });
            backend.inject(RawInputEvent::KeyDown { vc: VirtualCode::KeyA, rawcode: 0x41, time: 2, injected: false });
        }

        let events = seen.lock().unwrap();
        assert!(events.iter().any(|e| e.event_type == EventType::KeyPressed));
        assert!(!events.iter().any(|e| e.event_type == EventType::MouseMoved));

        session.stop().unwrap();
    }
}
