//! macOS adapter: listen-only Core Graphics event taps.
//!
//! One tap per event category, all added to the run loop of the thread that
//! calls `start`. Tap callbacks fire while that run loop runs, either in the
//! host's own loop or through `pump`.

use super::{guarded, CallbackState, HookSession, InstalledHook};
use crate::error::{PlatformError, PlatformResult};
use core_foundation::base::{CFRelease, TCFType};
use core_foundation::runloop::{
    kCFRunLoopCommonModes, kCFRunLoopDefaultMode, CFRunLoop, CFRunLoopSource,
};
use core_graphics::event::{CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement, CGEventType};
use inputhook_core::translate::macos::{
    translate_flags_changed, translate_key, translate_mouse_button, translate_wheel, KeyRecord,
};
use inputhook_core::{
    EventSink, HookAdapter, HookCategory, HookConfig, HookResult, InstallReport, PrivilegeState,
};
use std::ffi::c_void;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

type CFMachPortRef = *mut c_void;
type CFRunLoopSourceRef = *mut c_void;
type CFAllocatorRef = *const c_void;
type CFIndex = i64;
type CGEventRef = *mut c_void;
type CGEventFlags = u64;
type UniCharCount = std::os::raw::c_ulong;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct CGPoint {
    x: f64,
    y: f64,
}

// CGEventField values
const MOUSE_EVENT_BUTTON_NUMBER: u32 = 3;
const KEYBOARD_EVENT_AUTOREPEAT: u32 = 8;
const KEYBOARD_EVENT_KEYCODE: u32 = 9;
const SCROLL_WHEEL_EVENT_DELTA_AXIS_1: u32 = 11;
const SCROLL_WHEEL_EVENT_DELTA_AXIS_2: u32 = 12;

/// UTF-16 units read per key event.
const MAX_KEY_CHARS: usize = 16;

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventTapCreate(
        tap: u32,
        place: u32,
        options: u32,
        events_of_interest: u64,
        callback: CGEventTapCallback,
        user_info: *mut c_void,
    ) -> CFMachPortRef;

    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);

    fn CGEventGetLocation(event: CGEventRef) -> CGPoint;
    fn CGEventGetIntegerValueField(event: CGEventRef, field: u32) -> i64;
    fn CGEventGetFlags(event: CGEventRef) -> CGEventFlags;
    fn CGEventKeyboardGetUnicodeString(
        event: CGEventRef,
        max_len: UniCharCount,
        actual_len: *mut UniCharCount,
        buffer: *mut u16,
    );
}

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFMachPortCreateRunLoopSource(
        allocator: CFAllocatorRef,
        port: CFMachPortRef,
        order: CFIndex,
    ) -> CFRunLoopSourceRef;
    fn CFMachPortInvalidate(port: CFMachPortRef);
}

type CGEventTapCallback = extern "C" fn(
    proxy: *mut c_void,
    event_type: u32,
    cg_event: CGEventRef,
    user_info: *mut c_void,
) -> CGEventRef;

/// The notifications the system sends through a tap it has switched off.
const TAP_DISABLED_BY_TIMEOUT: u32 = CGEventType::TapDisabledByTimeout as u32;
const TAP_DISABLED_BY_USER_INPUT: u32 = CGEventType::TapDisabledByUserInput as u32;

/// What the tap callbacks share with the owning adapter.
static CALLBACK: CallbackState = CallbackState::new();

/// Tap-disabled notifications seen by the callback.
static TAPS_DISABLED: AtomicUsize = AtomicUsize::new(0);

extern "C" fn event_tap_callback(
    _proxy: *mut c_void,
    event_type: u32,
    cg_event: CGEventRef,
    _user_info: *mut c_void,
) -> CGEventRef {
    if event_type == TAP_DISABLED_BY_TIMEOUT || event_type == TAP_DISABLED_BY_USER_INPUT {
        TAPS_DISABLED.fetch_add(1, Ordering::Relaxed);
        return cg_event;
    }
    if !cg_event.is_null() {
        guarded(&CALLBACK.panics, || handle_event(event_type, cg_event));
    }
    cg_event
}

fn handle_event(event_type: u32, event: CGEventRef) {
    const KEY_DOWN: u32 = CGEventType::KeyDown as u32;
    const KEY_UP: u32 = CGEventType::KeyUp as u32;
    const FLAGS_CHANGED: u32 = CGEventType::FlagsChanged as u32;
    const LEFT_DOWN: u32 = CGEventType::LeftMouseDown as u32;
    const RIGHT_DOWN: u32 = CGEventType::RightMouseDown as u32;
    const OTHER_DOWN: u32 = CGEventType::OtherMouseDown as u32;
    const LEFT_UP: u32 = CGEventType::LeftMouseUp as u32;
    const RIGHT_UP: u32 = CGEventType::RightMouseUp as u32;
    const OTHER_UP: u32 = CGEventType::OtherMouseUp as u32;
    const SCROLL: u32 = CGEventType::ScrollWheel as u32;

    match event_type {
        KEY_DOWN | KEY_UP => {
            let mut buffer = [0u16; MAX_KEY_CHARS];
            let mut len: UniCharCount = 0;
            let (is_repeat, key_code, flags) = unsafe {
                CGEventKeyboardGetUnicodeString(
                    event,
                    MAX_KEY_CHARS as UniCharCount,
                    &mut len,
                    buffer.as_mut_ptr(),
                );
                (
                    CGEventGetIntegerValueField(event, KEYBOARD_EVENT_AUTOREPEAT) != 0,
                    CGEventGetIntegerValueField(event, KEYBOARD_EVENT_KEYCODE) as u16,
                    CGEventGetFlags(event),
                )
            };
            let len = (len as usize).min(MAX_KEY_CHARS);
            let record = KeyRecord {
                pressed: event_type == KEY_DOWN,
                is_repeat,
                characters: &buffer[..len],
                key_code,
                modifier_flags: flags,
            };
            translate_key(&record, |e| CALLBACK.deliver(e));
        }
        FLAGS_CHANGED => {
            let (key_code, flags) = unsafe {
                (
                    CGEventGetIntegerValueField(event, KEYBOARD_EVENT_KEYCODE) as u16,
                    CGEventGetFlags(event),
                )
            };
            translate_flags_changed(&CALLBACK.modifiers, key_code, flags, |e| {
                CALLBACK.deliver(e)
            });
        }
        LEFT_DOWN | RIGHT_DOWN | OTHER_DOWN | LEFT_UP | RIGHT_UP | OTHER_UP => {
            let pressed = matches!(event_type, LEFT_DOWN | RIGHT_DOWN | OTHER_DOWN);
            let (button, location) = unsafe {
                (
                    CGEventGetIntegerValueField(event, MOUSE_EVENT_BUTTON_NUMBER),
                    CGEventGetLocation(event),
                )
            };
            CALLBACK.deliver(translate_mouse_button(pressed, button, location.x, location.y));
        }
        SCROLL => {
            let (dy, dx) = unsafe {
                (
                    CGEventGetIntegerValueField(event, SCROLL_WHEEL_EVENT_DELTA_AXIS_1),
                    CGEventGetIntegerValueField(event, SCROLL_WHEEL_EVENT_DELTA_AXIS_2),
                )
            };
            CALLBACK.deliver(translate_wheel(dx, dy));
        }
        _ => {}
    }
}

fn bit(event_type: CGEventType) -> u64 {
    1u64 << (event_type as u64)
}

fn category_mask(category: HookCategory) -> u64 {
    match category {
        HookCategory::KeyDown => bit(CGEventType::KeyDown),
        HookCategory::KeyUp => bit(CGEventType::KeyUp),
        HookCategory::FlagsChanged => bit(CGEventType::FlagsChanged),
        HookCategory::MouseDown => {
            bit(CGEventType::LeftMouseDown)
                | bit(CGEventType::RightMouseDown)
                | bit(CGEventType::OtherMouseDown)
        }
        HookCategory::MouseUp => {
            bit(CGEventType::LeftMouseUp)
                | bit(CGEventType::RightMouseUp)
                | bit(CGEventType::OtherMouseUp)
        }
        HookCategory::MouseWheel => bit(CGEventType::ScrollWheel),
        HookCategory::Keyboard => {
            category_mask(HookCategory::KeyDown)
                | category_mask(HookCategory::KeyUp)
                | category_mask(HookCategory::FlagsChanged)
        }
        HookCategory::Mouse => {
            category_mask(HookCategory::MouseDown)
                | category_mask(HookCategory::MouseUp)
                | category_mask(HookCategory::MouseWheel)
        }
    }
}

/// An installed tap and the run loop it was added to.
struct EventTap {
    category: HookCategory,
    port: CFMachPortRef,
    source: CFRunLoopSource,
    run_loop: CFRunLoop,
}

// Removal only touches the run loop through thread-safe CF calls.
unsafe impl Send for EventTap {}

impl EventTap {
    fn install(category: HookCategory) -> PlatformResult<Self> {
        let port = unsafe {
            CGEventTapCreate(
                CGEventTapLocation::HID as u32,
                CGEventTapPlacement::HeadInsertEventTap as u32,
                CGEventTapOptions::ListenOnly as u32,
                category_mask(category),
                event_tap_callback,
                ptr::null_mut(),
            )
        };
        if port.is_null() {
            return Err(PlatformError::EventTapCreate);
        }

        let raw_source = unsafe { CFMachPortCreateRunLoopSource(ptr::null(), port, 0) };
        if raw_source.is_null() {
            unsafe {
                CFMachPortInvalidate(port);
                CFRelease(port as *const c_void);
            }
            return Err(PlatformError::RunLoopSource);
        }
        let source = unsafe { CFRunLoopSource::wrap_under_create_rule(raw_source as *mut _) };

        let run_loop = CFRunLoop::get_current();
        run_loop.add_source(&source, unsafe { kCFRunLoopCommonModes });
        unsafe { CGEventTapEnable(port, true) };

        Ok(Self {
            category,
            port,
            source,
            run_loop,
        })
    }

    fn enable(&self) {
        unsafe { CGEventTapEnable(self.port, true) };
    }
}

impl InstalledHook for EventTap {
    fn category(&self) -> HookCategory {
        self.category
    }

    fn remove(self) {
        unsafe { CGEventTapEnable(self.port, false) };
        self.run_loop
            .remove_source(&self.source, unsafe { kCFRunLoopCommonModes });
        unsafe {
            CFMachPortInvalidate(self.port);
            CFRelease(self.port as *const c_void);
        }
        debug!(category = ?self.category, "Event tap removed");
    }
}

/// Listen-only event tap adapter.
///
/// Only one adapter per process can hold the taps; a second `start` fails
/// with `AlreadyActive` until the first one stops.
pub struct MacHookAdapter {
    config: HookConfig,
    session: HookSession<EventTap>,
    disabled_seen: usize,
}

impl MacHookAdapter {
    pub fn new(config: HookConfig) -> Self {
        Self {
            config,
            session: HookSession::new(&CALLBACK),
            disabled_seen: 0,
        }
    }

    fn categories(&self) -> Vec<HookCategory> {
        let mut categories = Vec::new();
        if self.config.capture_keyboard {
            categories.extend([
                HookCategory::KeyDown,
                HookCategory::KeyUp,
                HookCategory::FlagsChanged,
            ]);
        }
        if self.config.capture_mouse {
            categories.extend([
                HookCategory::MouseDown,
                HookCategory::MouseUp,
                HookCategory::MouseWheel,
            ]);
        }
        categories
    }
}

impl HookAdapter for MacHookAdapter {
    fn platform(&self) -> &'static str {
        "macos"
    }

    fn probe_privilege(&mut self) -> PrivilegeState {
        crate::privilege::probe_privilege()
    }

    fn start(&mut self, sink: EventSink) -> HookResult<InstallReport> {
        self.config.validate()?;
        let categories = self.categories();
        let report = self.session.start(&categories, sink, EventTap::install)?;
        self.disabled_seen = TAPS_DISABLED.load(Ordering::Relaxed);
        Ok(report)
    }

    fn stop(&mut self) {
        if self.session.stop() > 0 {
            info!("Event taps removed");
        }
    }

    fn pump(&mut self) {
        if self.config.pump_os_events && self.session.is_active() {
            CFRunLoop::run_in_mode(unsafe { kCFRunLoopDefaultMode }, Duration::ZERO, false);
        }

        let disabled = TAPS_DISABLED.load(Ordering::Relaxed);
        if disabled != self.disabled_seen {
            warn!(total = disabled, "Event tap disabled by the system; re-enabling");
            for tap in self.session.hooks() {
                tap.enable();
            }
            self.disabled_seen = disabled;
        }

        if let Some(total) = self.session.new_panics() {
            warn!(total, "Event tap callback panicked; event dropped");
        }
    }

    fn is_active(&self) -> bool {
        self.session.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_masks_do_not_overlap() {
        let singles = [
            HookCategory::KeyDown,
            HookCategory::KeyUp,
            HookCategory::FlagsChanged,
            HookCategory::MouseDown,
            HookCategory::MouseUp,
            HookCategory::MouseWheel,
        ];
        let mut seen = 0u64;
        for category in singles {
            let m = category_mask(category);
            assert_ne!(m, 0);
            assert_eq!(seen & m, 0, "{category:?} overlaps");
            seen |= m;
        }
        assert_eq!(
            category_mask(HookCategory::Keyboard) | category_mask(HookCategory::Mouse),
            seen
        );
    }

    #[test]
    fn test_key_down_mask_bit() {
        assert_eq!(category_mask(HookCategory::KeyDown), 1 << 10);
        assert_eq!(category_mask(HookCategory::MouseWheel), 1 << 22);
    }
}
