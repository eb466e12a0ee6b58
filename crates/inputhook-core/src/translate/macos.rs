//! Translation rules for macOS global key, modifier and mouse monitors.

use crate::event::NormalizedInputEvent;
use crate::keycode::{normalize_mac_char, KeyCode};
use crate::state::ModifierTracker;

/// A key down/up event as seen by the monitor.
#[derive(Debug, Clone, Copy)]
pub struct KeyRecord<'a> {
    pub pressed: bool,
    /// The OS flagged this as auto-repeat.
    pub is_repeat: bool,
    /// UTF-16 text the key produced. One physical key can yield several
    /// characters (dead keys, input methods).
    pub characters: &'a [u16],
    /// Hardware key code, passed through as the scan code.
    pub key_code: u16,
    pub modifier_flags: u64,
}

/// Translate a key event, calling `emit` once per produced character.
/// Repeats and empty character strings produce nothing.
pub fn translate_key<F>(record: &KeyRecord<'_>, mut emit: F)
where
    F: FnMut(NormalizedInputEvent),
{
    if record.is_repeat {
        return;
    }
    let scan_code = record.key_code as i32;
    let flags = record.modifier_flags as i32;
    for unit in char::decode_utf16(record.characters.iter().copied()) {
        let code = match unit {
            Ok(c) => normalize_mac_char(c as u32),
            Err(_) => KeyCode::NONE,
        };
        let event = if record.pressed {
            NormalizedInputEvent::key_down(code, scan_code, flags)
        } else {
            NormalizedInputEvent::key_up(code, scan_code, flags)
        };
        emit(event);
    }
}

/// Translate a modifier-mask change into synthetic key events.
pub fn translate_flags_changed<F>(
    tracker: &ModifierTracker,
    key_code: u16,
    modifier_flags: u64,
    mut emit: F,
) where
    F: FnMut(NormalizedInputEvent),
{
    let scan_code = key_code as i32;
    let flags = modifier_flags as i32;
    for edge in tracker.edges(modifier_flags) {
        let event = if edge.pressed {
            NormalizedInputEvent::key_down(edge.code, scan_code, flags)
        } else {
            NormalizedInputEvent::key_up(edge.code, scan_code, flags)
        };
        emit(event);
    }
}

/// Mouse button press or release at a global position.
pub fn translate_mouse_button(pressed: bool, button: i64, x: f64, y: f64) -> NormalizedInputEvent {
    let (button, x, y) = (button as i32, x.round() as i32, y.round() as i32);
    if pressed {
        NormalizedInputEvent::mouse_down(button, x, y)
    } else {
        NormalizedInputEvent::mouse_up(button, x, y)
    }
}

/// Scroll wheel deltas (line units).
pub fn translate_wheel(delta_x: i64, delta_y: i64) -> NormalizedInputEvent {
    NormalizedInputEvent::wheel(0, delta_x as i32, delta_y as i32)
}
