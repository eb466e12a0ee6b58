//! Error types for the hook engine.

use crate::adapter::PrivilegeState;
use thiserror::Error;

/// Engine and adapter errors.
#[derive(Debug, Error)]
pub enum HookError {
    /// The OS did not grant input observation; nothing was installed.
    #[error("input monitoring not permitted (privilege state: {0:?})")]
    PermissionDenied(PrivilegeState),
    /// `start` was called before any privilege probe.
    #[error("input monitoring privilege has not been checked")]
    PrivilegeNotChecked,
    /// Every hook installation failed.
    #[error("no input hook could be installed")]
    NothingInstalled,
    /// Another adapter in this process already owns the native hooks.
    #[error("input hooks are already active in this process")]
    AlreadyActive,
    #[error("input hooks are not supported on {0}")]
    Unsupported(&'static str),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for hook operations.
pub type HookResult<T> = Result<T, HookError>;
