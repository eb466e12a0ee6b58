//! Translation rules for Windows low-level keyboard and mouse hooks.

use crate::event::NormalizedInputEvent;
use crate::keycode::normalize_windows_vk;
use crate::state::PressStateTable;
use std::sync::atomic::{AtomicI32, Ordering};

pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;
pub const WM_SYSKEYDOWN: u32 = 0x0104;
pub const WM_SYSKEYUP: u32 = 0x0105;

pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_RBUTTONDOWN: u32 = 0x0204;
pub const WM_RBUTTONUP: u32 = 0x0205;
pub const WM_MBUTTONDOWN: u32 = 0x0207;
pub const WM_MBUTTONUP: u32 = 0x0208;
pub const WM_MOUSEWHEEL: u32 = 0x020A;
pub const WM_XBUTTONDOWN: u32 = 0x020B;
pub const WM_XBUTTONUP: u32 = 0x020C;
pub const WM_MOUSEHWHEEL: u32 = 0x020E;

/// One wheel notch.
pub const WHEEL_DELTA: i32 = 120;

const BUTTON_LEFT: i32 = 0;
const BUTTON_RIGHT: i32 = 1;
const BUTTON_MIDDLE: i32 = 2;
/// XBUTTON1 -> 3, XBUTTON2 -> 4.
const BUTTON_X_BASE: i32 = 2;

/// The fields of a `KBDLLHOOKSTRUCT` plus the message it came with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardRecord {
    pub message: u32,
    pub vk_code: u32,
    pub scan_code: u32,
    pub flags: u32,
}

impl KeyboardRecord {
    pub fn is_down(&self) -> bool {
        matches!(self.message, WM_KEYDOWN | WM_SYSKEYDOWN)
    }

    pub fn is_up(&self) -> bool {
        matches!(self.message, WM_KEYUP | WM_SYSKEYUP)
    }
}

/// Translate one keyboard hook record.
///
/// A down record produces `KeyDown` only if the key was not already held,
/// which drops the OS auto-repeat. An up record always produces `KeyUp`.
pub fn translate_keyboard(
    table: &PressStateTable,
    record: &KeyboardRecord,
) -> Option<NormalizedInputEvent> {
    let code = normalize_windows_vk(record.vk_code);
    let scan_code = record.scan_code as i32;
    let flags = record.flags as i32;

    if record.is_up() {
        table.release(record.vk_code);
        Some(NormalizedInputEvent::key_up(code, scan_code, flags))
    } else if record.is_down() {
        if table.press(record.vk_code) {
            Some(NormalizedInputEvent::key_down(code, scan_code, flags))
        } else {
            None
        }
    } else {
        None
    }
}

/// The fields of an `MSLLHOOKSTRUCT` plus the message it came with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseRecord {
    pub message: u32,
    pub x: i32,
    pub y: i32,
    pub mouse_data: u32,
}

impl MouseRecord {
    fn high_word(&self) -> i32 {
        ((self.mouse_data >> 16) as i16) as i32
    }
}

/// Sub-notch wheel remainders per axis.
///
/// High-resolution wheels and touchpads report fractions of [`WHEEL_DELTA`]
/// per message. The remainder is carried over so only whole notches are
/// reported and the total matches what the device scrolled.
#[derive(Debug, Default)]
pub struct WheelAccumulator {
    vertical: AtomicI32,
    horizontal: AtomicI32,
}

impl WheelAccumulator {
    pub const fn new() -> Self {
        Self {
            vertical: AtomicI32::new(0),
            horizontal: AtomicI32::new(0),
        }
    }

    /// Add a raw delta; returns the whole notches completed by it.
    fn add(axis: &AtomicI32, delta: i32) -> i32 {
        let previous = axis
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |rest| {
                Some(rest.saturating_add(delta) % WHEEL_DELTA)
            })
            .unwrap_or_default();
        previous.saturating_add(delta) / WHEEL_DELTA
    }

    pub fn add_vertical(&self, delta: i32) -> i32 {
        Self::add(&self.vertical, delta)
    }

    pub fn add_horizontal(&self, delta: i32) -> i32 {
        Self::add(&self.horizontal, delta)
    }

    pub fn reset(&self) {
        self.vertical.store(0, Ordering::Release);
        self.horizontal.store(0, Ordering::Release);
    }
}

/// Translate one mouse hook record. Moves, unknown messages and wheel
/// messages that do not complete a notch produce nothing.
pub fn translate_mouse(
    record: &MouseRecord,
    wheel: &WheelAccumulator,
) -> Option<NormalizedInputEvent> {
    let (x, y) = (record.x, record.y);
    match record.message {
        WM_LBUTTONDOWN => Some(NormalizedInputEvent::mouse_down(BUTTON_LEFT, x, y)),
        WM_LBUTTONUP => Some(NormalizedInputEvent::mouse_up(BUTTON_LEFT, x, y)),
        WM_RBUTTONDOWN => Some(NormalizedInputEvent::mouse_down(BUTTON_RIGHT, x, y)),
        WM_RBUTTONUP => Some(NormalizedInputEvent::mouse_up(BUTTON_RIGHT, x, y)),
        WM_MBUTTONDOWN => Some(NormalizedInputEvent::mouse_down(BUTTON_MIDDLE, x, y)),
        WM_MBUTTONUP => Some(NormalizedInputEvent::mouse_up(BUTTON_MIDDLE, x, y)),
        WM_XBUTTONDOWN => Some(NormalizedInputEvent::mouse_down(
            BUTTON_X_BASE + record.high_word(),
            x,
            y,
        )),
        WM_XBUTTONUP => Some(NormalizedInputEvent::mouse_up(
            BUTTON_X_BASE + record.high_word(),
            x,
            y,
        )),
        WM_MOUSEWHEEL => match wheel.add_vertical(record.high_word()) {
            0 => None,
            notches => Some(NormalizedInputEvent::wheel(0, 0, notches)),
        },
        WM_MOUSEHWHEEL => match wheel.add_horizontal(record.high_word()) {
            0 => None,
            notches => Some(NormalizedInputEvent::wheel(0, notches, 0)),
        },
        _ => None,
    }
}
