//! Process-wide modifier/button state (C2).
//!
//! A single `AtomicU16` holds the current modifier and mouse-button bitmask.
//! The capture backend is the sole writer (one OS hook thread per platform);
//! the dispatcher and synthesis engine are readers from whatever thread calls
//! into them. `Ordering::SeqCst` is used throughout since updates are rare
//! relative to reads and the simplicity is worth the (negligible) cost here.

use std::sync::atomic::{AtomicU16, Ordering};

use crate::event::ModifierMask;

/// Tracks the live modifier/button mask for one hook session.
#[derive(Debug, Default)]
pub struct ModifierState {
    bits: AtomicU16,
}

impl ModifierState {
    pub fn new() -> Self {
        Self { bits: AtomicU16::new(0) }
    }

    /// Returns the current mask.
    pub fn get(&self) -> ModifierMask {
        ModifierMask(self.bits.load(Ordering::SeqCst))
    }

    /// Sets the given bits without clearing any others.
    pub fn set(&self, bits: u16) {
        self.bits.fetch_or(bits, Ordering::SeqCst);
    }

    /// Clears the given bits without affecting any others.
    pub fn unset(&self, bits: u16) {
        self.bits.fetch_and(!bits, Ordering::SeqCst);
    }

    /// Resets all bits to zero. Used when a session stops, so a stale mask
    /// can never leak into the next session.
    pub fn reset(&self) {
        self.bits.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_starts_empty() {
        let state = ModifierState::new();
        assert_eq!(state.get().0, 0);
    }

    #[test]
    fn test_set_and_unset_do_not_disturb_other_bits() {
        let state = ModifierState::new();
        state.set(ModifierMask::SHIFT_L);
        state.set(ModifierMask::CTRL_L);
        assert!(state.get().contains(ModifierMask::SHIFT_L));
        assert!(state.get().contains(ModifierMask::CTRL_L));

        state.unset(ModifierMask::SHIFT_L);
        assert!(!state.get().contains(ModifierMask::SHIFT_L));
        assert!(state.get().contains(ModifierMask::CTRL_L));
    }

    #[test]
    fn test_reset_clears_everything() {
        let state = ModifierState::new();
        state.set(ModifierMask::MASK_SHIFT | ModifierMask::BUTTON1);
        state.reset();
        assert_eq!(state.get().0, 0);
    }

    #[test]
    fn test_button_bits_track_independently_of_modifier_bits() {
        let state = ModifierState::new();
        state.set(ModifierMask::BUTTON4);
        assert!(state.get().any_button_held());
        state.unset(ModifierMask::BUTTON4);
        assert!(!state.get().any_button_held());
    }
}
