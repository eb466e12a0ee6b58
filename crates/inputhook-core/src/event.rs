//! Normalized input events shared by every platform adapter.

use crate::keycode::KeyCode;
use serde::{Deserialize, Serialize};

/// Kind of a normalized event.
///
/// The discriminants pack category bits so the raw value alone tells
/// keyboard from mouse and down from up:
///
/// | bit | meaning            |
/// |-----|--------------------|
/// | 0   | keyboard           |
/// | 1   | key down           |
/// | 2   | key up             |
/// | 4   | mouse              |
/// | 5   | mouse button down  |
/// | 6   | mouse button up    |
/// | 7   | mouse wheel        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum EventKind {
    KeyDown = 0b0000_0011,
    KeyUp = 0b0000_0101,
    MouseDown = 0b0011_0000,
    MouseUp = 0b0101_0000,
    MouseWheel = 0b1001_0000,
}

const KEYBOARD_BIT: i32 = 0x01;
const KEY_DOWN_BIT: i32 = 0x02;
const KEY_UP_BIT: i32 = 0x04;
const MOUSE_BIT: i32 = 0x10;
const MOUSE_DOWN_BIT: i32 = 0x20;
const MOUSE_UP_BIT: i32 = 0x40;
const WHEEL_BIT: i32 = 0x80;

impl EventKind {
    /// Raw tag value.
    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Parse a raw tag value. `0` ("none") and unknown values yield `None`.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            3 => Some(Self::KeyDown),
            5 => Some(Self::KeyUp),
            48 => Some(Self::MouseDown),
            80 => Some(Self::MouseUp),
            144 => Some(Self::MouseWheel),
            _ => None,
        }
    }

    pub fn is_keyboard(self) -> bool {
        self.as_raw() & KEYBOARD_BIT != 0
    }

    pub fn is_mouse(self) -> bool {
        self.as_raw() & MOUSE_BIT != 0
    }

    /// Key down or mouse button down.
    pub fn is_down(self) -> bool {
        self.as_raw() & (KEY_DOWN_BIT | MOUSE_DOWN_BIT) != 0
    }

    /// Key up or mouse button up.
    pub fn is_up(self) -> bool {
        self.as_raw() & (KEY_UP_BIT | MOUSE_UP_BIT) != 0
    }

    pub fn is_wheel(self) -> bool {
        self.as_raw() & WHEEL_BIT != 0
    }
}

/// The unit of output of the engine.
///
/// Payload depends on `kind`:
/// - keyboard: `code` is the unified key code, `param1` the scan code and
///   `param2` the raw modifier/flag mask reported by the OS;
/// - mouse button: `code` is the native button index, `param1`/`param2` the
///   absolute pointer position;
/// - wheel: `code` is the button index (normally 0), `param1` the horizontal
///   and `param2` the vertical delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedInputEvent {
    pub kind: EventKind,
    pub code: i32,
    pub param1: i32,
    pub param2: i32,
}

impl NormalizedInputEvent {
    pub fn new(kind: EventKind, code: i32, param1: i32, param2: i32) -> Self {
        Self {
            kind,
            code,
            param1,
            param2,
        }
    }

    pub fn key_down(code: KeyCode, scan_code: i32, modifiers: i32) -> Self {
        Self::new(EventKind::KeyDown, code.raw(), scan_code, modifiers)
    }

    pub fn key_up(code: KeyCode, scan_code: i32, modifiers: i32) -> Self {
        Self::new(EventKind::KeyUp, code.raw(), scan_code, modifiers)
    }

    pub fn mouse_down(button: i32, x: i32, y: i32) -> Self {
        Self::new(EventKind::MouseDown, button, x, y)
    }

    pub fn mouse_up(button: i32, x: i32, y: i32) -> Self {
        Self::new(EventKind::MouseUp, button, x, y)
    }

    pub fn wheel(button: i32, delta_x: i32, delta_y: i32) -> Self {
        Self::new(EventKind::MouseWheel, button, delta_x, delta_y)
    }

    /// A keyboard event whose key has no unified counterpart.
    /// Consumers discard these.
    pub fn is_sentinel(&self) -> bool {
        self.kind.is_keyboard() && self.code <= 0
    }

    /// Unified key for keyboard events; `None` for mouse events and sentinels.
    pub fn unified_key(&self) -> Option<KeyCode> {
        if self.kind.is_keyboard() && !self.is_sentinel() {
            Some(KeyCode::from_raw(self.code))
        } else {
            None
        }
    }
}

impl std::fmt::Display for NormalizedInputEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            EventKind::KeyDown | EventKind::KeyUp => {
                let dir = if self.kind.is_up() { "Up" } else { "Down" };
                write!(
                    f,
                    "Key:{}, Mod:{}, Scan:{}, {}",
                    KeyCode::from_raw(self.code),
                    self.param2,
                    self.param1,
                    dir
                )
            }
            EventKind::MouseDown | EventKind::MouseUp => {
                let dir = if self.kind.is_up() { "Up" } else { "Down" };
                write!(
                    f,
                    "Mouse:{} at ({}, {}), {}",
                    self.code, self.param1, self.param2, dir
                )
            }
            EventKind::MouseWheel => write!(f, "Wheel:({}, {})", self.param1, self.param2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_bits() {
        assert!(EventKind::KeyDown.is_keyboard());
        assert!(EventKind::KeyDown.is_down());
        assert!(!EventKind::KeyDown.is_up());
        assert!(EventKind::KeyUp.is_up());
        assert!(!EventKind::KeyUp.is_mouse());

        assert!(EventKind::MouseDown.is_mouse());
        assert!(EventKind::MouseDown.is_down());
        assert!(EventKind::MouseUp.is_up());
        assert!(!EventKind::MouseUp.is_keyboard());

        let wheel = EventKind::MouseWheel;
        assert!(wheel.is_mouse());
        assert!(wheel.is_wheel());
        assert!(!wheel.is_down());
        assert!(!wheel.is_up());
    }

    #[test]
    fn test_kind_raw_values() {
        assert_eq!(EventKind::KeyDown.as_raw(), 3);
        assert_eq!(EventKind::KeyUp.as_raw(), 5);
        assert_eq!(EventKind::MouseDown.as_raw(), 48);
        assert_eq!(EventKind::MouseUp.as_raw(), 80);
        assert_eq!(EventKind::MouseWheel.as_raw(), 144);
        assert_eq!(EventKind::from_raw(0), None);
        assert_eq!(EventKind::from_raw(7), None);
        assert_eq!(EventKind::from_raw(80), Some(EventKind::MouseUp));
    }

    #[test]
    fn test_sentinel_and_unified_key() {
        let unmapped = NormalizedInputEvent::key_down(KeyCode::NONE, 0x1e, 0);
        assert!(unmapped.is_sentinel());
        assert_eq!(unmapped.unified_key(), None);

        let a = NormalizedInputEvent::key_up(KeyCode::A, 0x1e, 0);
        assert!(!a.is_sentinel());
        assert_eq!(a.unified_key(), Some(KeyCode::A));

        // Mouse button 0 is a real button, not a sentinel.
        let click = NormalizedInputEvent::mouse_down(0, 10, 20);
        assert!(!click.is_sentinel());
        assert_eq!(click.unified_key(), None);
    }

    #[test]
    fn test_display() {
        let e = NormalizedInputEvent::key_down(KeyCode::A, 30, 0);
        assert_eq!(e.to_string(), "Key:A, Mod:0, Scan:30, Down");
        let w = NormalizedInputEvent::wheel(0, -1, 3);
        assert_eq!(w.to_string(), "Wheel:(-1, 3)");
    }

    #[test]
    fn test_serde_shape() {
        let e = NormalizedInputEvent::mouse_up(1, 640, 360);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"MouseUp","code":1,"param1":640,"param2":360}"#
        );
    }
}
