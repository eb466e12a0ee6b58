//! Per-adapter filter state: which keys are held and which modifiers were
//! set in the last aggregate mask.
//!
//! Both types are written from the OS callback and reset from whichever
//! thread calls `stop()`, so they are built on atomics instead of locks.

use crate::keycode::KeyCode;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Size of the native key identifier domain.
pub const KEY_TABLE_SIZE: usize = 256;

/// "Currently held" flag per native key identifier.
pub struct PressStateTable {
    held: [AtomicBool; KEY_TABLE_SIZE],
}

impl PressStateTable {
    pub const fn new() -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const RELEASED: AtomicBool = AtomicBool::new(false);
        Self {
            held: [RELEASED; KEY_TABLE_SIZE],
        }
    }

    /// Mark `code` held. Returns `true` only when it was not held before,
    /// i.e. when this is a physical press rather than auto-repeat.
    ///
    /// Codes outside the table cannot be tracked and always report a press.
    pub fn press(&self, code: u32) -> bool {
        match self.held.get(code as usize) {
            Some(flag) => !flag.swap(true, Ordering::AcqRel),
            None => true,
        }
    }

    /// Mark `code` released.
    pub fn release(&self, code: u32) {
        if let Some(flag) = self.held.get(code as usize) {
            flag.store(false, Ordering::Release);
        }
    }

    pub fn is_held(&self, code: u32) -> bool {
        self.held
            .get(code as usize)
            .map_or(false, |flag| flag.load(Ordering::Acquire))
    }

    pub fn held_count(&self) -> usize {
        self.held
            .iter()
            .filter(|flag| flag.load(Ordering::Acquire))
            .count()
    }

    pub fn clear(&self) {
        for flag in &self.held {
            flag.store(false, Ordering::Release);
        }
    }
}

impl Default for PressStateTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PressStateTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PressStateTable")
            .field("held_count", &self.held_count())
            .finish()
    }
}

/// A modifier bit in an aggregate mask and the key it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedModifier {
    pub mask: u64,
    pub code: KeyCode,
}

/// Modifiers that get synthetic key events, in emission order.
///
/// The masks are the device-independent bits of `CGEventFlags` /
/// `NSEvent.ModifierFlags`. Only the left-hand variants are reported since
/// the aggregate mask does not tell the sides apart.
pub const TRACKED_MODIFIERS: [TrackedModifier; 5] = [
    TrackedModifier {
        mask: 0x0002_0000,
        code: KeyCode::LEFT_SHIFT,
    },
    TrackedModifier {
        mask: 0x0004_0000,
        code: KeyCode::LEFT_CONTROL,
    },
    TrackedModifier {
        mask: 0x0008_0000,
        code: KeyCode::LEFT_ALT,
    },
    TrackedModifier {
        mask: 0x0010_0000,
        code: KeyCode::LEFT_COMMAND,
    },
    TrackedModifier {
        mask: 0x0001_0000,
        code: KeyCode::CAPS_LOCK,
    },
];

/// A synthesized press or release of a modifier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierEdge {
    pub code: KeyCode,
    pub pressed: bool,
}

/// Last observed modifier mask, used to turn mask changes into key edges.
#[derive(Debug, Default)]
pub struct ModifierTracker {
    last: AtomicU64,
}

impl ModifierTracker {
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Record `new_mask` as the latest state and return the edges relative
    /// to the previous one. Bits outside [`TRACKED_MODIFIERS`] are ignored.
    pub fn edges(&self, new_mask: u64) -> ModifierEdges {
        let old_mask = self.last.swap(new_mask, Ordering::AcqRel);
        ModifierEdges {
            old_mask,
            new_mask,
            next: 0,
        }
    }

    pub fn last_mask(&self) -> u64 {
        self.last.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.last.store(0, Ordering::Release);
    }
}

/// Iterator over the modifier transitions between two masks.
#[derive(Debug, Clone)]
pub struct ModifierEdges {
    old_mask: u64,
    new_mask: u64,
    next: usize,
}

impl Iterator for ModifierEdges {
    type Item = ModifierEdge;

    fn next(&mut self) -> Option<ModifierEdge> {
        while let Some(modifier) = TRACKED_MODIFIERS.get(self.next) {
            self.next += 1;
            let was = self.old_mask & modifier.mask != 0;
            let is = self.new_mask & modifier.mask != 0;
            if was != is {
                return Some(ModifierEdge {
                    code: modifier.code,
                    pressed: is,
                });
            }
        }
        None
    }
}
