//! Windows adapter: `WH_KEYBOARD_LL` and `WH_MOUSE_LL` hooks.
//!
//! Low-level hooks are called on the thread that installed them, and only
//! while that thread retrieves messages. `pump` does that retrieval when the
//! host does not run its own message loop.

use super::{guarded, CallbackState, HookSession, InstalledHook};
use crate::error::{PlatformError, PlatformResult};
use inputhook_core::translate::windows::{
    translate_keyboard, translate_mouse, KeyboardRecord, MouseRecord,
};
use inputhook_core::{EventSink, HookAdapter, HookCategory, HookConfig, HookResult, InstallReport};
use std::ptr;
use tracing::{debug, info, warn};
use windows_sys::Win32::Foundation::{GetLastError, LPARAM, LRESULT, WPARAM};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, PeekMessageW, PostQuitMessage, SetWindowsHookExW,
    TranslateMessage, UnhookWindowsHookEx, HC_ACTION, HHOOK, KBDLLHOOKSTRUCT, MSG,
    MSLLHOOKSTRUCT, PM_REMOVE, WH_KEYBOARD_LL, WH_MOUSE_LL, WM_QUIT,
};

type HookProc = unsafe extern "system" fn(i32, WPARAM, LPARAM) -> LRESULT;

/// What the hook procedures share with the owning adapter.
static CALLBACK: CallbackState = CallbackState::new();

unsafe extern "system" fn keyboard_hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code == HC_ACTION as i32 && lparam != 0 {
        let info = &*(lparam as *const KBDLLHOOKSTRUCT);
        let record = KeyboardRecord {
            message: wparam as u32,
            vk_code: info.vkCode,
            scan_code: info.scanCode,
            flags: info.flags,
        };
        guarded(&CALLBACK.panics, || {
            if let Some(event) = translate_keyboard(&CALLBACK.table, &record) {
                CALLBACK.deliver(event);
            }
        });
    }
    CallNextHookEx(ptr::null_mut(), code, wparam, lparam)
}

unsafe extern "system" fn mouse_hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code == HC_ACTION as i32 && lparam != 0 {
        let info = &*(lparam as *const MSLLHOOKSTRUCT);
        let record = MouseRecord {
            message: wparam as u32,
            x: info.pt.x,
            y: info.pt.y,
            mouse_data: info.mouseData,
        };
        guarded(&CALLBACK.panics, || {
            if let Some(event) = translate_mouse(&record, &CALLBACK.wheel) {
                CALLBACK.deliver(event);
            }
        });
    }
    CallNextHookEx(ptr::null_mut(), code, wparam, lparam)
}

/// An installed hook.
struct HookHandle {
    category: HookCategory,
    hook: HHOOK,
}

// The handle is only an identifier; unhooking from another thread is allowed.
unsafe impl Send for HookHandle {}

impl HookHandle {
    fn install(category: HookCategory) -> PlatformResult<Self> {
        let (id, proc_) = match category {
            HookCategory::Keyboard => (WH_KEYBOARD_LL, keyboard_hook_proc as HookProc),
            HookCategory::Mouse => (WH_MOUSE_LL, mouse_hook_proc as HookProc),
            other => return Err(PlatformError::UnsupportedCategory(other)),
        };
        let hook = unsafe {
            let module = GetModuleHandleW(ptr::null());
            SetWindowsHookExW(id, Some(proc_), module, 0)
        };
        if hook.is_null() {
            return Err(PlatformError::HookInstall(unsafe { GetLastError() }));
        }
        Ok(Self { category, hook })
    }
}

impl InstalledHook for HookHandle {
    fn category(&self) -> HookCategory {
        self.category
    }

    fn remove(self) {
        if unsafe { UnhookWindowsHookEx(self.hook) } == 0 {
            debug!(
                category = ?self.category,
                error = unsafe { GetLastError() },
                "UnhookWindowsHookEx failed"
            );
        }
    }
}

/// Low-level keyboard/mouse hook adapter.
///
/// Only one adapter per process can hold the hooks; a second `start` fails
/// with `AlreadyActive` until the first one stops.
pub struct WindowsHookAdapter {
    config: HookConfig,
    session: HookSession<HookHandle>,
}

impl WindowsHookAdapter {
    pub fn new(config: HookConfig) -> Self {
        Self {
            config,
            session: HookSession::new(&CALLBACK),
        }
    }

    fn categories(&self) -> Vec<HookCategory> {
        let mut categories = Vec::new();
        if self.config.capture_keyboard {
            categories.push(HookCategory::Keyboard);
        }
        if self.config.capture_mouse {
            categories.push(HookCategory::Mouse);
        }
        categories
    }
}

impl HookAdapter for WindowsHookAdapter {
    fn platform(&self) -> &'static str {
        "windows"
    }

    fn start(&mut self, sink: EventSink) -> HookResult<InstallReport> {
        self.config.validate()?;
        let categories = self.categories();
        self.session.start(&categories, sink, HookHandle::install)
    }

    fn stop(&mut self) {
        if self.session.stop() > 0 {
            info!("Windows hooks removed");
        }
    }

    fn pump(&mut self) {
        if self.config.pump_os_events && self.session.is_active() {
            let mut msg: MSG = unsafe { std::mem::zeroed() };
            unsafe {
                while PeekMessageW(&mut msg, ptr::null_mut(), 0, 0, PM_REMOVE) != 0 {
                    if msg.message == WM_QUIT {
                        // Leave the quit request for the host's own loop.
                        PostQuitMessage(msg.wParam as i32);
                        break;
                    }
                    TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
        }

        if let Some(total) = self.session.new_panics() {
            warn!(total, "Hook callback panicked; event dropped");
        }
    }

    fn is_active(&self) -> bool {
        self.session.is_active()
    }
}
