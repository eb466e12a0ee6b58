//! Adapter for platforms without a global hook implementation.

use inputhook_core::{EventSink, HookAdapter, HookConfig, HookError, HookResult, InstallReport};
use tracing::warn;

/// Never installs anything; `start` reports the platform as unsupported.
#[derive(Debug, Default)]
pub struct UnsupportedAdapter {
    _config: HookConfig,
}

impl UnsupportedAdapter {
    pub fn new(config: HookConfig) -> Self {
        Self { _config: config }
    }
}

impl HookAdapter for UnsupportedAdapter {
    fn platform(&self) -> &'static str {
        std::env::consts::OS
    }

    fn start(&mut self, _sink: EventSink) -> HookResult<InstallReport> {
        warn!(platform = std::env::consts::OS, "Global input hooks are not available");
        Err(HookError::Unsupported(std::env::consts::OS))
    }

    fn stop(&mut self) {}

    fn is_active(&self) -> bool {
        false
    }
}
