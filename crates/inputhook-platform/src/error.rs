//! Errors raised at the OS boundary.

use inputhook_core::HookCategory;
use thiserror::Error;

/// Native call failures while installing hooks.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// `SetWindowsHookExW` returned a null handle.
    #[error("SetWindowsHookExW failed (error {0})")]
    HookInstall(u32),
    /// `CGEventTapCreate` returned null, usually a missing accessibility grant.
    #[error("CGEventTapCreate failed; accessibility permission may not be granted")]
    EventTapCreate,
    #[error("CFMachPortCreateRunLoopSource failed")]
    RunLoopSource,
    /// The platform has no native hook for this category.
    #[error("no native hook for {0:?} on this platform")]
    UnsupportedCategory(HookCategory),
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
