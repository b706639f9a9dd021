//! A [`CaptureBackend`] that replays a scripted sequence of events instead of
//! installing a live OS hook, so the dispatcher, modifier state machine, and
//! `KEY_TYPED` derivation can be exercised deterministically.

use std::sync::{Arc, Mutex};

use super::{CaptureBackend, CaptureError, RawEventHandler, RawInputEvent};

/// A capture backend driven entirely by test code via [`MockCaptureBackend::inject`].
pub struct MockCaptureBackend {
    handler: Arc<Mutex<Option<RawEventHandler>>>,
    running: bool,
}

impl MockCaptureBackend {
    pub fn new() -> Self {
        Self { handler: Arc::new(Mutex::new(None)), running: false }
    }

    /// Feeds `event` directly to the registered handler, returning whatever
    /// consume verdict the handler produced. Panics if `start` has not been
    /// called (mirrors a programmer error in a test, not a runtime fault).
    pub fn inject(&self, event: RawInputEvent) -> bool {
        let mut guard = self.handler.lock().unwrap();
        let handler = guard.as_mut().expect("MockCaptureBackend::inject called before start");
        handler(event)
    }
}

impl Default for MockCaptureBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for MockCaptureBackend {
    fn start(&mut self, handler: RawEventHandler) -> Result<(), CaptureError> {
        if self.running {
            return Err(CaptureError::AlreadyRunning);
        }
        *self.handler.lock().unwrap() = Some(handler);
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        if !self.running {
            return Err(CaptureError::AlreadyStopped);
        }
        *self.handler.lock().unwrap() = None;
        self.running = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::VirtualCode;

    #[test]
    fn test_start_then_inject_reaches_handler() {
        let mut backend = MockCaptureBackend::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        backend
            .start(Box::new(move |ev| {
                seen_clone.lock().unwrap().push(ev);
                false
            }))
            .unwrap();

        backend.inject(RawInputEvent::KeyDown { vc: VirtualCode::KeyA, rawcode: 0x41, time: 1, injected: false });

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_double_start_fails() {
        let mut backend = MockCaptureBackend::new();
        backend.start(Box::new(|_| false)).unwrap();
        assert_eq!(backend.start(Box::new(|_| false)), Err(CaptureError::AlreadyRunning));
    }

    #[test]
    fn test_stop_without_start_fails() {
        let mut backend = MockCaptureBackend::new();
        assert_eq!(backend.stop(), Err(CaptureError::AlreadyStopped));
    }

    #[test]
    fn test_inject_returns_handler_consume_verdict() {
        let mut backend = MockCaptureBackend::new();
        backend.start(Box::new(|ev| matches!(ev, RawInputEvent::KeyDown { vc: VirtualCode::F12, .. }))).unwrap();

        let consumed = backend.inject(RawInputEvent::KeyDown { vc: VirtualCode::F12, rawcode: 0x7B, time: 1, injected: false });
        assert!(consumed);

        let consumed = backend.inject(RawInputEvent::KeyDown { vc: VirtualCode::KeyA, rawcode: 0x41, time: 2, injected: false });
        assert!(!consumed);
    }
}
