//! Global input hook adapters.
//!
//! Platform implementations:
//! - Windows: low-level keyboard and mouse hooks (`windows.rs`)
//! - macOS: listen-only Core Graphics event taps (`macos.rs`)
//! - Everything else: an adapter that refuses to start (`unsupported.rs`)
//!
//! Each adapter keeps the state its OS callbacks need in a static, since the
//! callbacks carry no user pointer we could hand a closure through. The
//! `session` module guards that static so only one adapter owns it at a time.

use inputhook_core::{HookAdapter, HookConfig};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

mod session;
#[cfg_attr(not(any(target_os = "windows", target_os = "macos")), allow(unused_imports))]
pub(crate) use session::{CallbackState, HookSession, InstalledHook};

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
pub use windows::WindowsHookAdapter;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
pub use macos::MacHookAdapter;

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
mod unsupported;
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub use unsupported::UnsupportedAdapter;

/// Build the adapter for the current platform.
pub fn create_adapter(config: HookConfig) -> Box<dyn HookAdapter> {
    #[cfg(target_os = "windows")]
    {
        Box::new(WindowsHookAdapter::new(config))
    }

    #[cfg(target_os = "macos")]
    {
        Box::new(MacHookAdapter::new(config))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        Box::new(UnsupportedAdapter::new(config))
    }
}

/// Run `f` so that a panic never unwinds into the OS. A caught panic is
/// counted and the callback carries on as if nothing was captured.
#[cfg_attr(not(any(target_os = "windows", target_os = "macos")), allow(dead_code))]
pub(crate) fn guarded<F: FnOnce()>(panics: &AtomicUsize, f: F) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        panics.fetch_add(1, Ordering::Relaxed);
    }
}
