//! A fixed ASCII-only [`UnicodeResolver`] for dispatcher tests, so `KEY_TYPED`
//! derivation can be exercised without depending on a live OS layout.

use crate::event::{ModifierMask, VirtualCode};

use super::UnicodeResolver;

/// Resolves `KeyA`..`KeyZ` to lowercase ASCII (or uppercase under Shift) and
/// nothing else.
pub struct MockResolver {
    shift_uppercases: bool,
}

impl MockResolver {
    pub fn ascii_lowercase() -> Self {
        Self { shift_uppercases: true }
    }
}

impl UnicodeResolver for MockResolver {
    fn resolve(&mut self, vc: VirtualCode, mask: ModifierMask) -> Option<u16> {
        let base = match vc {
            VirtualCode::KeyA => b'a',
            VirtualCode::KeyB => b'b',
            VirtualCode::KeyC => b'c',
            VirtualCode::Space => b' ',
            _ => return None,
        };
        let shifted = self.shift_uppercases && mask.contains(ModifierMask::MASK_SHIFT);
        let ch = if shifted { base.to_ascii_uppercase() } else { base };
        Some(ch as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_letters_to_ascii() {
        let mut resolver = MockResolver::ascii_lowercase();
        assert_eq!(resolver.resolve(VirtualCode::KeyA, ModifierMask(0)), Some(b'a' as u16));
    }

    #[test]
    fn test_shift_uppercases() {
        let mut resolver = MockResolver::ascii_lowercase();
        let mask = ModifierMask(ModifierMask::SHIFT_L);
        assert_eq!(resolver.resolve(VirtualCode::KeyA, mask), Some(b'A' as u16));
    }

    #[test]
    fn test_unmapped_key_returns_none() {
        let mut resolver = MockResolver::ascii_lowercase();
        assert_eq!(resolver.resolve(VirtualCode::F1, ModifierMask(0)), None);
    }
}
