//! Hook configuration.

use crate::error::{HookError, HookResult};
use serde::{Deserialize, Serialize};

/// Which event categories an adapter installs hooks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Install keyboard hooks (and the modifier-mask monitor where needed).
    pub capture_keyboard: bool,
    /// Install mouse button and wheel hooks.
    pub capture_mouse: bool,
    /// Let the adapter service the OS event source (thread message queue,
    /// run loop) on every poll. Turn off when the host already runs its own
    /// loop on the thread that started the hooks. When on, the host must poll
    /// often (every 50 ms or less): Windows drops low-level hooks whose
    /// thread stops pumping for longer than `LowLevelHooksTimeout`.
    pub pump_os_events: bool,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            capture_keyboard: true,
            capture_mouse: true,
            pump_os_events: true,
        }
    }
}

impl HookConfig {
    /// Keyboard only, the way most hotkey-style consumers want it.
    pub fn keyboard_only() -> Self {
        Self {
            capture_mouse: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> HookResult<()> {
        if !self.capture_keyboard && !self.capture_mouse {
            return Err(HookError::Config(
                "at least one of capture_keyboard / capture_mouse must be enabled".into(),
            ));
        }
        Ok(())
    }
}
