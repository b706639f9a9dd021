//! A [`SynthesisEngine`] that records calls instead of injecting real input.

use std::sync::Mutex;

use crate::error::Result;

use super::{SynthKeyEvent, SynthMouseEvent, SynthesisEngine};

#[derive(Debug, Default)]
pub struct RecordingSynthesis {
    pub keys: Mutex<Vec<SynthKeyEvent>>,
    pub mouse: Mutex<Vec<SynthMouseEvent>>,
    pub texts: Mutex<Vec<String>>,
    pub should_fail: std::sync::atomic::AtomicBool,
}

impl RecordingSynthesis {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SynthesisEngine for RecordingSynthesis {
    fn post_key(&self, event: SynthKeyEvent) -> Result<()> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(crate::error::HookError::Failure);
        }
        self.keys.lock().unwrap().push(event);
        Ok(())
    }

    fn post_mouse(&self, event: SynthMouseEvent) -> Result<()> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(crate::error::HookError::Failure);
        }
        self.mouse.lock().unwrap().push(event);
        Ok(())
    }

    fn post_text(&self, text: &str) -> Result<()> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(crate::error::HookError::NullText);
        }
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::VirtualCode;

    #[test]
    fn test_records_key_events() {
        let synth = RecordingSynthesis::new();
        synth.post_key(SynthKeyEvent::Press(VirtualCode::KeyA)).unwrap();
        assert_eq!(synth.keys.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_should_fail_returns_error() {
        let synth = RecordingSynthesis::new();
        synth.should_fail.store(true, std::sync::atomic::Ordering::SeqCst);
        assert!(synth.post_text("hi").is_err());
    }
}
