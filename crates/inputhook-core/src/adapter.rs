//! The seam between the engine and a platform hook implementation.
//!
//! `inputhook-platform` implements [`HookAdapter`] once per OS; the engine
//! only ever talks to this trait.

use crate::error::HookResult;
use crate::queue::EventSink;
use serde::{Deserialize, Serialize};

/// Outcome of a permission probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum PrivilegeState {
    /// Observation is permitted; hooks may be installed.
    Normal = 0,
    /// Permission was missing and the OS opened its consent prompt. The
    /// caller must not start until the user grants access (usually followed
    /// by a process restart).
    PromptShown = 1,
    /// Permission was granted synchronously by the probe itself. The OS
    /// settings change lands asynchronously, so this is not expected in
    /// practice.
    GrantedImmediately = 2,
}

impl PrivilegeState {
    pub fn is_normal(self) -> bool {
        self == Self::Normal
    }

    pub fn prompt_shown(self) -> bool {
        self == Self::PromptShown
    }
}

/// One kind of OS observation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookCategory {
    /// Key presses only (per-category monitors).
    KeyDown,
    /// Key releases only (per-category monitors).
    KeyUp,
    /// Presses and releases through a single hook.
    Keyboard,
    /// Aggregate modifier mask changes.
    FlagsChanged,
    MouseDown,
    MouseUp,
    MouseWheel,
    /// Buttons and wheel through a single hook.
    Mouse,
}

/// A hook that could not be installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallFailure {
    pub category: HookCategory,
    pub reason: String,
}

/// What `start()` managed to install.
///
/// A partial install is not rolled back; the caller decides whether the
/// subset is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub installed: Vec<HookCategory>,
    pub failed: Vec<InstallFailure>,
}

impl InstallReport {
    pub fn record_installed(&mut self, category: HookCategory) {
        self.installed.push(category);
    }

    pub fn record_failed(&mut self, category: HookCategory, reason: impl Into<String>) {
        self.failed.push(InstallFailure {
            category,
            reason: reason.into(),
        });
    }

    /// Nothing failed (and something was requested).
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && !self.installed.is_empty()
    }

    /// Nothing got installed.
    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }
}

/// A platform input hook.
///
/// Implementations own every OS handle they create and the callback state
/// those handles point at. That state must outlive the handle: `stop()`
/// removes the OS hook first and only then detaches the sink.
pub trait HookAdapter: Send {
    /// Short platform name for logs.
    fn platform(&self) -> &'static str;

    /// Check (and if needed request) permission to observe input.
    fn probe_privilege(&mut self) -> PrivilegeState {
        PrivilegeState::Normal
    }

    /// Install the hooks, delivering events into `sink`.
    ///
    /// Must behave as if `stop()` was called first. An `Err` means nothing is
    /// installed.
    fn start(&mut self, sink: EventSink) -> HookResult<InstallReport>;

    /// Remove every installed hook and reset filter state. Idempotent; fine
    /// to call before any `start()`.
    fn stop(&mut self);

    /// Service the OS event source without blocking (message queue, run
    /// loop). Called once per consumer poll.
    ///
    /// On Windows low-level hooks only run while this is called; a gap longer
    /// than the system `LowLevelHooksTimeout` (a few hundred ms by default)
    /// stalls input system-wide and the OS may silently remove the hooks.
    /// Poll at least every 50 ms.
    fn pump(&mut self) {}

    /// Whether at least one hook is installed.
    fn is_active(&self) -> bool;
}
