//! inputhook-platform: OS boundary for inputhook.
//!
//! This crate provides:
//! - Windows low-level keyboard/mouse hooks (`SetWindowsHookExW`)
//! - macOS listen-only event taps, one per event category
//! - The accessibility permission probe on macOS
//! - A process-wide engine instance built on the platform adapter
//!
//! ## Module Structure
//!
//! - `error` - native call failures
//! - `privilege` - permission probe
//! - `input_hook` - platform adapters and adapter selection
//! - `global` - the process-wide engine

mod error;
mod global;
mod input_hook;
mod privilege;

pub use error::{PlatformError, PlatformResult};

pub use input_hook::create_adapter;

#[cfg(target_os = "windows")]
pub use input_hook::WindowsHookAdapter;

#[cfg(target_os = "macos")]
pub use input_hook::MacHookAdapter;

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub use input_hook::UnsupportedAdapter;

pub use privilege::probe_privilege as probe_platform_privilege;

pub use global::{
    dispose, drain_all, init, is_initialized, is_running, poll_once, probe_privilege,
    set_consumer, start, stop,
};

// The engine-facing types, so callers only need this crate.
pub use inputhook_core::{
    EventConsumer, EventKind, HookConfig, HookError, HookResult, InputDispatcher,
    InputHookEngine, InstallReport, KeyCode, NormalizedInputEvent, PrivilegeState,
};
